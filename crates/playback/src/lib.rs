//! Clip playback for the robot's DAC voice: 8-bit PCM WAV parsing and a
//! single-session refill engine
#![cfg_attr(not(test), no_std)]
#![deny(clippy::unwrap_used)]

pub mod clip;
pub mod engine;

pub use clip::{DecodeError, PcmClip};
pub use engine::{min_refills_per_sec, PlaybackEngine, PlaybackError, PlaybackState};
