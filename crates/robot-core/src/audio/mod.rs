//! Speaker responder: barks when the room goes dark.

pub mod responder;

pub use responder::{AudioResponder, SessionOutcome};
