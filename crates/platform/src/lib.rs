//! Hardware Abstraction Layer (HAL) for the robot dog interaction board
//!
//! This crate provides trait-based abstractions for every peripheral the
//! reactive core touches, enabling development and testing without physical
//! hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Reactive core (robot-core crate)
//!         ↓
//! Feature Layers (playback)
//!         ↓
//! Platform HAL (this crate - trait abstractions)
//!         ↓
//! Hardware Layer (Embassy HAL + PAC)
//! ```
//!
//! # Abstractions
//!
//! - [`InterruptController`] / [`TouchController`] - edge and capacitive
//!   interrupt registration, handlers run in interrupt context
//! - [`AnalogInput`] - ADC sampling for the light sensor
//! - [`DacOutput`] - buffered 8-bit DAC audio channel
//! - [`MatrixDisplay`] - 8×8 LED matrix with [`MatrixFrame`] rendering
//!
//! # Features
//!
//! - `std`: Expose [`mocks`] for host tests
//! - `hardware`: Physical hardware implementations
//! - `defmt`: Enable defmt derives
//!
//! # Example
//!
//! ```no_run
//! use platform::{MatrixDisplay, MatrixFrame};
//!
//! async fn example<D: MatrixDisplay>(display: &mut D) {
//!     let mut frame = MatrixFrame::new();
//!     frame.set_column(0, 0b1111_0000);
//!     display.commit(&frame).await.unwrap();
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::print_stdout)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::must_use_candidate)] // hardware accessors: callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(async_fn_in_trait)] // Embassy no_std: single-threaded, Send bounds not needed

pub mod analog;
pub mod audio;
pub mod display;
pub mod gpio;

#[cfg(any(test, feature = "std"))]
pub mod mocks;

pub use analog::AnalogInput;
pub use audio::DacOutput;
pub use display::{MatrixDisplay, MatrixFrame, MATRIX_SIZE, MAX_INTENSITY};
pub use gpio::{
    InterruptController, InterruptHandler, InterruptMode, PinId, PinState, Pull, TouchController,
};
