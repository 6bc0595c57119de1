//! `TOUCH` / `LIMIT` consumer owning the LED matrix.
//!
//! On each wake the pending flags are checked against [`SERVICE_ORDER`] and
//! only the first hit is serviced and cleared. A flag further down the
//! table stays set, so the next `wait_any` returns immediately and it is
//! serviced on the following cycle.

use platform::{MatrixDisplay, MatrixFrame};

use crate::config::DisplayResponderConfig;
use crate::display::animation::{AnimationSession, ScrollAnimation};
use crate::fmt::dbg_fmt;
use crate::signals::{Flag, FlagSet, SignalRegister};

/// Display reaction to a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Response {
    /// Scroll the configured message.
    Scroll,
    /// Show the glyph and hold it.
    Flash,
}

/// Flags this responder serves, highest priority first.
pub const SERVICE_ORDER: [(Flag, Response); 2] =
    [(Flag::Touch, Response::Scroll), (Flag::Limit, Response::Flash)];

/// Wait mask covering every flag in [`SERVICE_ORDER`].
pub fn service_mask() -> FlagSet {
    SERVICE_ORDER.iter().map(|(flag, _)| *flag).collect()
}

/// First flag in `pending` by service priority.
pub fn select(pending: FlagSet) -> Option<(Flag, Response)> {
    SERVICE_ORDER
        .iter()
        .copied()
        .find(|(flag, _)| pending.contains(*flag))
}

/// Drives the matrix in response to `TOUCH` and `LIMIT`.
pub struct DisplayResponder<M> {
    register: &'static SignalRegister,
    config: DisplayResponderConfig,
    matrix: M,
}

impl<M: MatrixDisplay> DisplayResponder<M> {
    /// Take exclusive ownership of the matrix.
    pub fn new(register: &'static SignalRegister, config: DisplayResponderConfig, matrix: M) -> Self {
        Self {
            register,
            config,
            matrix,
        }
    }

    /// Animation parameters.
    pub fn config(&self) -> &DisplayResponderConfig {
        &self.config
    }

    /// The owned matrix device.
    pub fn matrix(&self) -> &M {
        &self.matrix
    }

    /// Wake the controller, set brightness and show the glyph.
    pub async fn start(&mut self) -> Result<(), M::Error> {
        self.matrix.init().await?;
        self.matrix.set_intensity(self.config.intensity).await?;
        self.matrix.commit(&self.glyph()).await
    }

    /// Wait for a served flag, run its animation, clear it.
    ///
    /// Returns the flag that was serviced.
    pub async fn respond_once(&mut self) -> Option<Flag> {
        let pending = self.register.wait_any(service_mask()).await;
        let (flag, response) = select(pending)?;
        debug!("{}: animating", flag);
        let frames = self.session(response).play(&mut self.matrix).await;
        self.register.clear(flag);
        debug!("{} cleared after {} frames", flag, frames);
        Some(flag)
    }

    /// `start`, then serve flags forever.
    pub async fn run(mut self) -> ! {
        if let Err(e) = self.start().await {
            error!("matrix start failed: {:?}", dbg_fmt(&e));
        }
        info!(
            "display responder: CLK GPIO{} DIN GPIO{} CS GPIO{}",
            self.config.pins.clock.number(),
            self.config.pins.data_in.number(),
            self.config.pins.select.number()
        );
        loop {
            self.respond_once().await;
        }
    }

    fn glyph(&self) -> MatrixFrame {
        MatrixFrame::from_columns(self.config.glyph)
    }

    fn session(&self, response: Response) -> AnimationSession {
        match response {
            Response::Scroll => AnimationSession::Scroll {
                animation: ScrollAnimation::new(self.config.message),
                period: self.config.scroll_period,
            },
            Response::Flash => AnimationSession::Flash {
                glyph: self.glyph(),
                hold: self.config.hold,
            },
        }
    }
}
