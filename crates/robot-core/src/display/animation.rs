//! Matrix animations.
//!
//! Text is drawn with embedded-graphics' 5×8 ASCII font padded to an
//! 8-column pitch, so every character occupies exactly one matrix width.
//! A message of `n` characters scrolls through `8n - 1` steps; step `k`
//! shows the text shifted `k` columns to the left.

use core::convert::Infallible;

use embassy_time::{Duration, Timer};
use embedded_graphics::mono_font::ascii::FONT_5X8;
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use platform::{MatrixDisplay, MatrixFrame};

use crate::cadence::Cadence;
use crate::fmt::dbg_fmt;

/// Matrix columns per rendered character.
pub const COLUMNS_PER_CHAR: u32 = 8;

/// 5-pixel glyphs with 3 blank columns, one character per 8 columns.
const MATRIX_FONT: MonoFont<'static> = MonoFont {
    character_spacing: 3,
    ..FONT_5X8
};

/// Left-scrolling text, one column per step.
///
/// Iterating yields the frame for each step in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollAnimation {
    message: &'static str,
    steps: u32,
    step: u32,
}

impl ScrollAnimation {
    /// Scroll `message`, eight columns per character.
    pub fn new(message: &'static str) -> Self {
        let chars = u32::try_from(message.chars().count()).unwrap_or(u32::MAX);
        Self {
            message,
            steps: chars.saturating_mul(COLUMNS_PER_CHAR).saturating_sub(1),
            step: 0,
        }
    }

    /// Total frame steps: `8 × chars − 1`, zero for an empty message.
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Frames not yet yielded.
    pub fn remaining(&self) -> u32 {
        self.steps.saturating_sub(self.step)
    }

    /// Frame with the message shifted `offset` columns left.
    pub fn frame(&self, offset: u32) -> MatrixFrame {
        self.draw(offset).unwrap_or_else(|never| match never {})
    }

    fn draw(&self, offset: u32) -> Result<MatrixFrame, Infallible> {
        let mut frame = MatrixFrame::new();
        let x = 0i32.saturating_sub(i32::try_from(offset).unwrap_or(i32::MAX));
        let style = MonoTextStyle::new(&MATRIX_FONT, BinaryColor::On);
        Text::with_baseline(self.message, Point::new(x, 0), style, Baseline::Top).draw(&mut frame)?;
        Ok(frame)
    }
}

impl Iterator for ScrollAnimation {
    type Item = MatrixFrame;

    fn next(&mut self) -> Option<MatrixFrame> {
        if self.step >= self.steps {
            return None;
        }
        self.step = self.step.saturating_add(1);
        Some(self.frame(self.step))
    }
}

/// Ephemeral state for one display response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationSession {
    /// Scroll text at a fixed period.
    Scroll {
        /// Frames still to show.
        animation: ScrollAnimation,
        /// Time between steps.
        period: Duration,
    },
    /// Show a static pattern and hold it.
    Flash {
        /// Pattern to show.
        glyph: MatrixFrame,
        /// Pause after the pattern is committed.
        hold: Duration,
    },
}

impl AnimationSession {
    /// Run the session to completion on `matrix`.
    ///
    /// Commit failures are logged and the animation carries on at the same
    /// cadence. Returns the number of frames committed successfully.
    pub async fn play<M: MatrixDisplay>(self, matrix: &mut M) -> u32 {
        match self {
            Self::Scroll { animation, period } => {
                let mut shown = 0u32;
                let mut cadence = Cadence::starting_now(period);
                for frame in animation {
                    if commit(matrix, &frame).await {
                        shown = shown.saturating_add(1);
                    }
                    cadence.wait().await;
                }
                shown
            }
            Self::Flash { glyph, hold } => {
                let shown = u32::from(commit(matrix, &glyph).await);
                Timer::after(hold).await;
                shown
            }
        }
    }
}

async fn commit<M: MatrixDisplay>(matrix: &mut M, frame: &MatrixFrame) -> bool {
    match matrix.commit(frame).await {
        Ok(()) => true,
        Err(e) => {
            warn!("matrix commit failed: {:?}", dbg_fmt(&e));
            false
        }
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    #[test]
    fn test_step_count_is_eight_per_char_minus_one() {
        assert_eq!(ScrollAnimation::new("Robot_Dog").steps(), 71);
        assert_eq!(ScrollAnimation::new("A").steps(), 7);
        assert_eq!(ScrollAnimation::new("").steps(), 0);
    }

    #[test]
    fn test_iterator_yields_every_step() {
        let scroll = ScrollAnimation::new("Hi");
        assert_eq!(scroll.count(), 15);
        assert_eq!(ScrollAnimation::new("").next(), None);
    }

    #[test]
    fn test_frames_shift_one_column_per_step() {
        let scroll = ScrollAnimation::new("II");
        // Each step moves every lit column one to the left.
        for offset in 1..scroll.steps() {
            let before = scroll.frame(offset.saturating_sub(1));
            let after = scroll.frame(offset);
            for x in 1..8 {
                assert_eq!(
                    before.columns()[x],
                    after.columns()[x - 1],
                    "offset {offset}, column {x}"
                );
            }
        }
    }

    #[test]
    fn test_glyph_fits_in_eight_columns() {
        let frame = ScrollAnimation::new("X").frame(0);
        assert!(frame.lit_count() > 0);
        // Padding columns stay dark.
        assert_eq!(&frame.columns()[5..], &[0, 0, 0]);
    }

    #[test]
    fn test_scrolled_out_text_is_blank() {
        let scroll = ScrollAnimation::new("X");
        assert_eq!(scroll.frame(8).lit_count(), 0);
    }
}
