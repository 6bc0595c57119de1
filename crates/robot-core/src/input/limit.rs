//! Limit switch driver.
//!
//! The trigger edge decides the input bias. A rising-edge switch closes to
//! VCC against a pull-down, a falling-edge switch closes to GND against a
//! pull-up. Anything else is refused before the pin is touched.

use platform::{InterruptController, InterruptHandler};

use crate::config::LimitSwitchConfig;
use crate::error::InteractError;
use crate::fmt::dbg_fmt;
use crate::signals::{Flag, SignalRegister};

/// Raises `LIMIT` from an edge interrupt.
pub struct LimitSwitch {
    register: &'static SignalRegister,
    config: LimitSwitchConfig,
}

impl LimitSwitch {
    /// Bind a handler to `register`; nothing is attached until [`install`](Self::install).
    pub const fn new(register: &'static SignalRegister, config: LimitSwitchConfig) -> Self {
        Self { register, config }
    }

    /// Pin and trigger edge.
    pub fn config(&self) -> &LimitSwitchConfig {
        &self.config
    }

    /// Configure the pin bias for the trigger edge and attach the handler.
    ///
    /// # Errors
    ///
    /// - `InvalidConfiguration` for an unsupported trigger. Nothing is
    ///   configured or attached.
    /// - `InvalidState` if the register cannot be created.
    /// - `ResourceExhausted` if the controller refuses the pin or handler.
    pub fn install<C: InterruptController>(&'static self, controller: &mut C) -> Result<(), InteractError> {
        let pull = self.config.pull().map_err(|e| {
            warn!(
                "limit switch on GPIO{}: unsupported trigger",
                self.config.pin.number()
            );
            e
        })?;
        self.register
            .create()
            .map_err(|_| InteractError::InvalidState)?;

        let pin = self.config.pin;
        controller.configure_input(pin, pull).map_err(|e| {
            error!("limit switch pin setup failed: {:?}", dbg_fmt(&e));
            InteractError::ResourceExhausted
        })?;
        controller
            .attach(pin, self.config.trigger, self)
            .map_err(|e| {
                error!("limit switch attach failed: {:?}", dbg_fmt(&e));
                InteractError::ResourceExhausted
            })?;
        info!("limit switch on GPIO{}", pin.number());
        Ok(())
    }
}

impl InterruptHandler for LimitSwitch {
    fn on_interrupt(&self) {
        super::raise_from_isr(self.register, Flag::Limit);
    }
}
