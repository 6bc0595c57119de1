//! LED matrix: MAX7219 driver, animations and the responder task.
//!
//! ```text
//!   wait_any({TOUCH, LIMIT})
//!        │
//!        ▼
//!   SERVICE_ORDER ──TOUCH──▶ Scroll "Robot_Dog" (71 steps @ 100 ms) ──▶ clear(TOUCH)
//!        │
//!        └──────LIMIT──▶ Flash glyph, hold 500 ms ──▶ clear(LIMIT)
//! ```

pub mod animation;
pub mod driver;
pub mod responder;

pub use animation::{AnimationSession, ScrollAnimation, COLUMNS_PER_CHAR};
pub use driver::{Max7219, MatrixError, Register};
pub use responder::{DisplayResponder, Response, SERVICE_ORDER};
