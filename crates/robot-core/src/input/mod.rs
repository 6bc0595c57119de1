//! Flag producers.
//!
//! | Driver          | Context   | Flag    | Trigger                          |
//! |-----------------|-----------|---------|----------------------------------|
//! | [`TouchSensor`] | interrupt | `TOUCH` | capacitance below threshold      |
//! | [`LimitSwitch`] | interrupt | `LIMIT` | configured edge on the input pin |
//! | [`LightSensor`] | task      | `LIGHT` | ADC reading `<` threshold        |
//!
//! The two interrupt drivers implement [`platform::InterruptHandler`] and
//! must be installed from `'static` storage. Their handler body is one
//! [`SignalRegister::set_from_interrupt`] call and nothing else.

pub mod light;
pub mod limit;
pub mod touch;

pub use light::LightSensor;
pub use limit::LimitSwitch;
pub use touch::TouchSensor;

use crate::signals::{Flag, SetOutcome, SignalRegister};

/// Interrupt-context flag assertion. Failures are logged and dropped.
fn raise_from_isr(register: &SignalRegister, flag: Flag) {
    match register.set_from_interrupt(flag) {
        Ok(SetOutcome::Raised) => trace!("{} raised", flag),
        Ok(SetOutcome::AlreadySet) => {}
        Err(e) => warn!("{} dropped in interrupt: {}", flag, e),
    }
}
