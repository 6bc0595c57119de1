//! Boot-time configuration records.
//!
//! Each driver and responder takes one of these by value when it is created
//! and never mutates it afterwards. The `Default` impls carry the robot's
//! reference wiring:
//!
//! | Function            | Pin     | Notes                           |
//! |---------------------|---------|---------------------------------|
//! | Touch pad           | GPIO4   | capacitive channel T0           |
//! | Limit switch        | GPIO27  | falling edge, internal pull-up  |
//! | Light sensor (LDR)  | GPIO34  | ADC1 channel 6, 12-bit          |
//! | Speaker             | GPIO25  | DAC channel 1, 8-bit            |
//! | Matrix CLK          | GPIO18  | MAX7219 over SPI                |
//! | Matrix DIN          | GPIO23  |                                 |
//! | Matrix DOUT         | GPIO19  | unused by a single module       |
//! | Matrix CS           | GPIO5   |                                 |

use embassy_time::Duration;
use platform::{InterruptMode, PinId, Pull, MATRIX_SIZE, MAX_INTENSITY};

use crate::error::InteractError;

/// Capacitive touch pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchConfig {
    /// Touch channel pin.
    pub pin: PinId,
    /// Raw capacitance reading below which the pad counts as touched.
    pub threshold: u16,
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self {
            pin: PinId::new(4),
            threshold: 40,
        }
    }
}

/// Mechanical limit switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitSwitchConfig {
    /// Switch input pin.
    pub pin: PinId,
    /// Edge that trips the switch. Only single edges are supported.
    pub trigger: InterruptMode,
}

impl LimitSwitchConfig {
    /// Input bias implied by the trigger edge.
    ///
    /// A rising-edge switch idles low and needs a pull-down; a falling-edge
    /// switch idles high and needs a pull-up.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` for any other trigger mode.
    pub fn pull(&self) -> Result<Pull, InteractError> {
        match self.trigger {
            InterruptMode::RisingEdge => Ok(Pull::Down),
            InterruptMode::FallingEdge => Ok(Pull::Up),
            InterruptMode::BothEdges => Err(InteractError::InvalidConfiguration),
        }
    }

    /// Check the record before anything is touched on the hardware.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` when the trigger is unsupported.
    pub fn validate(&self) -> Result<(), InteractError> {
        self.pull().map(|_| ())
    }
}

impl Default for LimitSwitchConfig {
    fn default() -> Self {
        Self {
            pin: PinId::new(27),
            trigger: InterruptMode::FallingEdge,
        }
    }
}

/// Light-dependent resistor poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightSensorConfig {
    /// ADC pin the divider is wired to.
    pub pin: PinId,
    /// Readings strictly below this raise `LIGHT`.
    pub threshold: u16,
    /// Sampling period.
    pub period: Duration,
}

impl LightSensorConfig {
    /// # Errors
    ///
    /// `InvalidConfiguration` for a zero sampling period.
    pub fn validate(&self) -> Result<(), InteractError> {
        if self.period == Duration::from_ticks(0) {
            return Err(InteractError::InvalidConfiguration);
        }
        Ok(())
    }
}

impl Default for LightSensorConfig {
    fn default() -> Self {
        Self {
            pin: PinId::new(34),
            threshold: 1_000,
            period: Duration::from_millis(100),
        }
    }
}

/// Speaker output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioResponderConfig {
    /// DAC output pin.
    pub pin: PinId,
}

impl Default for AudioResponderConfig {
    fn default() -> Self {
        Self { pin: PinId::new(25) }
    }
}

/// Physical interface of the LED matrix module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixPins {
    /// SPI clock.
    pub clock: PinId,
    /// Data into the module (host MOSI).
    pub data_in: PinId,
    /// Data out of the module (host MISO, daisy-chain only).
    pub data_out: PinId,
    /// Chip select / LOAD.
    pub select: PinId,
}

impl Default for MatrixPins {
    fn default() -> Self {
        Self {
            clock: PinId::new(18),
            data_in: PinId::new(23),
            data_out: PinId::new(19),
            select: PinId::new(5),
        }
    }
}

/// Heart glyph shown at boot and on every limit-switch trip, column-major.
pub const HEART_GLYPH: [u8; MATRIX_SIZE] = [
    0b0000_1100,
    0b0001_1110,
    0b0011_1110,
    0b0111_1100,
    0b0111_1100,
    0b0011_1110,
    0b0001_1110,
    0b0000_1100,
];

/// Message scrolled when the touch pad is pressed.
pub const GREETING: &str = "Robot_Dog";

/// LED matrix responder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayResponderConfig {
    /// SPI wiring of the MAX7219.
    pub pins: MatrixPins,
    /// Text scrolled on `TOUCH`.
    pub message: &'static str,
    /// Static pattern drawn at startup and on `LIMIT`.
    pub glyph: [u8; MATRIX_SIZE],
    /// Brightness, `0..=15`.
    pub intensity: u8,
    /// Time between scroll steps.
    pub scroll_period: Duration,
    /// How long the glyph is held on `LIMIT`.
    pub hold: Duration,
}

impl DisplayResponderConfig {
    /// # Errors
    ///
    /// `InvalidConfiguration` when the scroll period is zero or the
    /// intensity is above the controller's range.
    pub fn validate(&self) -> Result<(), InteractError> {
        if self.scroll_period == Duration::from_ticks(0) || self.intensity > MAX_INTENSITY {
            return Err(InteractError::InvalidConfiguration);
        }
        Ok(())
    }
}

impl Default for DisplayResponderConfig {
    fn default() -> Self {
        Self {
            pins: MatrixPins::default(),
            message: GREETING,
            glyph: HEART_GLYPH,
            intensity: MAX_INTENSITY,
            scroll_period: Duration::from_millis(100),
            hold: Duration::from_millis(500),
        }
    }
}
