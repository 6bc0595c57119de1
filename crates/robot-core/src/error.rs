//! Setup-time error taxonomy.
//!
//! Every variant is detected and returned synchronously by an `init_*` or
//! `install` call. Nothing here ever crosses the interrupt boundary: faults
//! in interrupt context are logged and dropped, and missed audio/animation
//! deadlines are quality effects, not errors.

use thiserror_no_std::Error;

/// Errors returned while wiring drivers and responders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InteractError {
    /// The signal register, a handler slot or a task could not be allocated.
    #[error("resource exhausted")]
    ResourceExhausted,
    /// A driver was given a mode it does not support; nothing was installed.
    #[error("invalid configuration")]
    InvalidConfiguration,
    /// A dependency (the signal register) is not live.
    #[error("invalid state: signal register not created")]
    InvalidState,
}

#[cfg(feature = "hardware")]
impl From<embassy_executor::SpawnError> for InteractError {
    fn from(_: embassy_executor::SpawnError) -> Self {
        Self::ResourceExhausted
    }
}
