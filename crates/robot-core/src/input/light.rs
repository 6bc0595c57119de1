//! Ambient light poller.
//!
//! Not interrupt driven: the ADC is sampled once per period on a drift-free
//! [`Cadence`], and a reading strictly below the threshold raises `LIGHT`.
//! The schedule is anchored on the first [`LightSensor::tick`], not at
//! construction, so a sensor created long before it runs does not burst
//! through missed periods.

use platform::AnalogInput;

use crate::cadence::Cadence;
use crate::config::LightSensorConfig;
use crate::fmt::dbg_fmt;
use crate::signals::{Flag, SetOutcome, SignalRegister};

/// Periodic light-level sampler.
pub struct LightSensor<A> {
    register: &'static SignalRegister,
    config: LightSensorConfig,
    adc: A,
    cadence: Option<Cadence>,
}

impl<A: AnalogInput> LightSensor<A> {
    /// Take ownership of the ADC channel and the sampling parameters.
    pub fn new(register: &'static SignalRegister, config: LightSensorConfig, adc: A) -> Self {
        Self {
            register,
            config,
            adc,
            cadence: None,
        }
    }

    /// Sampling parameters.
    pub fn config(&self) -> &LightSensorConfig {
        &self.config
    }

    /// Take one reading and raise `LIGHT` if it is below the threshold.
    ///
    /// Returns the reading, or `None` when the conversion failed (the sample
    /// is skipped).
    pub fn sample(&mut self) -> Option<u16> {
        let reading = match self.adc.read() {
            Ok(r) => r,
            Err(e) => {
                warn!("light sensor read failed: {:?}", dbg_fmt(&e));
                return None;
            }
        };
        if reading < self.config.threshold {
            match self.register.set(Flag::Light) {
                Ok(SetOutcome::Raised) => debug!("light {} < {}", reading, self.config.threshold),
                Ok(SetOutcome::AlreadySet) => {}
                Err(e) => warn!("LIGHT not raised: {}", e),
            }
        }
        Some(reading)
    }

    /// Sample once, then sleep until the next period boundary.
    pub async fn tick(&mut self) -> Option<u16> {
        let mut cadence = self
            .cadence
            .unwrap_or_else(|| Cadence::starting_now(self.config.period));
        let reading = self.sample();
        cadence.wait().await;
        self.cadence = Some(cadence);
        reading
    }

    /// Poll forever.
    pub async fn run(mut self) -> ! {
        info!(
            "light sensor on GPIO{}: threshold {}, every {} ms",
            self.config.pin.number(),
            self.config.threshold,
            self.config.period.as_millis()
        );
        loop {
            self.tick().await;
        }
    }
}
