//! Capacitive touch pad driver.

use platform::{InterruptHandler, TouchController};

use crate::config::TouchConfig;
use crate::error::InteractError;
use crate::fmt::dbg_fmt;
use crate::signals::{Flag, SignalRegister};

/// Raises `TOUCH` from the touch peripheral's interrupt.
pub struct TouchSensor {
    register: &'static SignalRegister,
    config: TouchConfig,
}

impl TouchSensor {
    /// Bind a handler to `register`; nothing is attached until [`install`](Self::install).
    pub const fn new(register: &'static SignalRegister, config: TouchConfig) -> Self {
        Self { register, config }
    }

    /// Pad and threshold this sensor was built with.
    pub fn config(&self) -> &TouchConfig {
        &self.config
    }

    /// Make sure the register is live, then attach this handler to the
    /// configured touch channel.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if the register cannot be created.
    /// - `ResourceExhausted` if the controller has no room for the handler.
    pub fn install<T: TouchController>(&'static self, controller: &mut T) -> Result<(), InteractError> {
        self.register
            .create()
            .map_err(|_| InteractError::InvalidState)?;
        controller
            .attach_touch(self.config.pin, self.config.threshold, self)
            .map_err(|e| {
                error!("touch attach failed: {:?}", dbg_fmt(&e));
                InteractError::ResourceExhausted
            })?;
        info!(
            "touch sensor on GPIO{} (threshold {})",
            self.config.pin.number(),
            self.config.threshold
        );
        Ok(())
    }
}

impl InterruptHandler for TouchSensor {
    fn on_interrupt(&self) {
        super::raise_from_isr(self.register, Flag::Touch);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use platform::mocks::MockTouchController;

    #[test]
    fn test_install_creates_register_and_attaches() {
        static REGISTER: SignalRegister = SignalRegister::new();
        static SENSOR: TouchSensor = TouchSensor::new(&REGISTER, TouchConfig {
            pin: platform::PinId::new(4),
            threshold: 40,
        });
        let mut controller = MockTouchController::new();

        SENSOR.install(&mut controller).unwrap();

        assert!(REGISTER.is_live());
        assert_eq!(controller.threshold_of(SENSOR.config().pin), Some(40));
    }

    #[test]
    fn test_interrupt_only_sets_touch() {
        static REGISTER: SignalRegister = SignalRegister::new();
        static SENSOR: TouchSensor = TouchSensor::new(&REGISTER, TouchConfig {
            pin: platform::PinId::new(4),
            threshold: 40,
        });
        let mut controller = MockTouchController::new();
        SENSOR.install(&mut controller).unwrap();

        controller.touch(SENSOR.config().pin, 55);
        assert!(REGISTER.pending().is_empty());
        controller.touch(SENSOR.config().pin, 10);
        assert_eq!(REGISTER.pending(), Flag::Touch.into());
    }

    #[test]
    fn test_interrupt_after_destroy_is_dropped() {
        static REGISTER: SignalRegister = SignalRegister::new();
        static SENSOR: TouchSensor = TouchSensor::new(&REGISTER, TouchConfig {
            pin: platform::PinId::new(4),
            threshold: 40,
        });
        let mut controller = MockTouchController::new();
        SENSOR.install(&mut controller).unwrap();
        REGISTER.destroy();

        controller.touch(SENSOR.config().pin, 0);
        assert!(REGISTER.pending().is_empty());
    }
}
