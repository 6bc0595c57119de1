//! LED matrix display abstraction

use core::convert::Infallible;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;

/// Side length of the matrix in LEDs.
pub const MATRIX_SIZE: usize = 8;

/// Highest brightness step the matrix accepts.
pub const MAX_INTENSITY: u8 = 15;

/// Driver trait for an 8×8 LED matrix.
pub trait MatrixDisplay {
    /// Error type for display operations
    type Error: core::fmt::Debug;

    /// Bring the controller out of shutdown and blank it.
    fn init(&mut self) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Set brightness, `0..=MAX_INTENSITY`. Larger values are clamped.
    fn set_intensity(
        &mut self,
        level: u8,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Push a full frame to the controller.
    fn commit(
        &mut self,
        frame: &MatrixFrame,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;
}

/// One 8×8 frame stored column-major.
///
/// Bit `y` of column `x` lights the LED at row `y`, column `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MatrixFrame {
    columns: [u8; MATRIX_SIZE],
}

impl MatrixFrame {
    /// Blank frame.
    pub const fn new() -> Self {
        Self {
            columns: [0; MATRIX_SIZE],
        }
    }

    /// Frame built from raw column bytes.
    pub const fn from_columns(columns: [u8; MATRIX_SIZE]) -> Self {
        Self { columns }
    }

    /// Overwrite one column. Out-of-range columns are ignored.
    pub fn set_column(&mut self, column: usize, bits: u8) {
        if let Some(slot) = self.columns.get_mut(column) {
            *slot = bits;
        }
    }

    /// Raw column bytes, left to right.
    pub fn columns(&self) -> &[u8; MATRIX_SIZE] {
        &self.columns
    }

    /// Turn every LED off.
    pub fn clear(&mut self) {
        self.columns = [0; MATRIX_SIZE];
    }

    /// Whether the LED at (`x`, `y`) is lit.
    #[allow(clippy::arithmetic_side_effects)] // y < 8 checked first
    pub fn is_lit(&self, x: usize, y: usize) -> bool {
        y < MATRIX_SIZE && self.columns.get(x).is_some_and(|col| col & (1u8 << y) != 0)
    }

    /// Number of lit LEDs.
    pub fn lit_count(&self) -> u32 {
        self.columns.iter().map(|col| col.count_ones()).sum()
    }
}

impl OriginDimensions for MatrixFrame {
    fn size(&self) -> Size {
        Size::new(MATRIX_SIZE as u32, MATRIX_SIZE as u32)
    }
}

impl DrawTarget for MatrixFrame {
    type Color = BinaryColor;
    type Error = Infallible;

    #[allow(clippy::arithmetic_side_effects)] // shift amount bounded by MATRIX_SIZE
    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (usize::try_from(point.x), usize::try_from(point.y)) else {
                continue;
            };
            if y >= MATRIX_SIZE {
                continue;
            }
            if let Some(column) = self.columns.get_mut(x) {
                match color {
                    BinaryColor::On => *column |= 1u8 << y,
                    BinaryColor::Off => *column &= !(1u8 << y),
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{Line, PrimitiveStyle};

    #[test]
    fn test_new_frame_is_blank() {
        assert_eq!(MatrixFrame::new().lit_count(), 0);
    }

    #[test]
    fn test_set_column_ignores_out_of_range() {
        let mut frame = MatrixFrame::new();
        frame.set_column(8, 0xFF);
        assert_eq!(frame, MatrixFrame::new());
        frame.set_column(7, 0x81);
        assert!(frame.is_lit(7, 0));
        assert!(frame.is_lit(7, 7));
        assert!(!frame.is_lit(7, 3));
    }

    #[test]
    fn test_draw_clips_outside_pixels() {
        let mut frame = MatrixFrame::new();
        Line::new(Point::new(-4, 2), Point::new(12, 2))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(&mut frame)
            .unwrap();
        assert_eq!(frame.lit_count(), 8);
        assert!((0..8).all(|x| frame.is_lit(x, 2)));
    }

    #[test]
    fn test_draw_off_clears_pixel() {
        let mut frame = MatrixFrame::from_columns([0xFF; MATRIX_SIZE]);
        Pixel(Point::new(3, 4), BinaryColor::Off).draw(&mut frame).unwrap();
        assert!(!frame.is_lit(3, 4));
        assert_eq!(frame.lit_count(), 63);
    }
}
