//! Reactive core of the robot dog.
//!
//! Three producers raise flags in a shared [`SignalRegister`]; two
//! responder tasks wait on them and act.
//!
//! ```text
//!  touch ISR ───────┐
//!  limit-switch ISR ┼──▶ SignalRegister {TOUCH, LIMIT, LIGHT} ──▶ DisplayResponder (TOUCH > LIMIT)
//!  light poller ────┘                                       └──▶ AudioResponder  (LIGHT)
//! ```
//!
//! Interrupt handlers only ever set a flag. Each flag is cleared by the one
//! responder that owns it, after its response has finished.
//!
//! # Features
//!
//! - `hardware`: embassy executor integration and defmt logging
//! - `defmt`: defmt logging only
//! - `std`: `tracing` logging for host runs

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(unused_must_use)]
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(async_fn_in_trait)]

// Must come first so the logging macros are visible to every module.
mod fmt;

pub mod audio;
pub mod cadence;
pub mod config;
pub mod display;
pub mod error;
pub mod init;
pub mod input;
pub mod signals;

pub use audio::{AudioResponder, SessionOutcome};
pub use cadence::Cadence;
pub use config::{
    AudioResponderConfig, DisplayResponderConfig, LightSensorConfig, LimitSwitchConfig,
    MatrixPins, TouchConfig,
};
pub use display::{AnimationSession, DisplayResponder, Max7219, ScrollAnimation, SERVICE_ORDER};
pub use error::InteractError;
pub use init::{
    create_signal_register, destroy_signal_register, init_audio_responder,
    init_display_responder, init_light_sensor, init_limit_switch, init_touch,
};
pub use input::{LightSensor, LimitSwitch, TouchSensor};
pub use signals::{Flag, FlagSet, SetOutcome, SignalRegister, MAX_WAITERS};
