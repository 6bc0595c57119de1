//! MAX7219 8×8 LED matrix driver.
//!
//! One module, no daisy chain. Every register write is a single 16-bit SPI
//! transaction `[address, data]`; `SpiDevice` drives CS (the MAX7219 LOAD
//! pin) around it, and the rising edge of LOAD latches the word.
//!
//! # Wiring
//!
//! | Signal | Pin (default) | Direction |
//! |--------|---------------|-----------|
//! | CLK    | GPIO18        | Host → Matrix |
//! | DIN    | GPIO23        | Host → Matrix |
//! | DOUT   | GPIO19        | Matrix → next module (unused) |
//! | LOAD   | GPIO5         | Host → Matrix |
//!
//! # Orientation
//!
//! [`MatrixFrame`] column *i* is sent to digit register *i + 1*. Bit *y* of
//! the column lights row *y*.

use embedded_hal_async::spi::SpiDevice;
use platform::{MatrixDisplay, MatrixFrame, MATRIX_SIZE, MAX_INTENSITY};

// ---------------------------------------------------------------------------
// Registers
// ---------------------------------------------------------------------------

/// MAX7219 register addresses.
#[repr(u8)]
#[derive(Debug, Clone, Copy)]
pub enum Register {
    /// No-op, used to shift past modules in a chain.
    NoOp = 0x00,
    /// First column; columns 1-7 follow at consecutive addresses.
    Digit0 = 0x01,
    /// BCD decode per digit. 0 = raw segments.
    DecodeMode = 0x09,
    /// PWM brightness, low nibble.
    Intensity = 0x0A,
    /// Number of scanned digits minus one.
    ScanLimit = 0x0B,
    /// 0 = shutdown, 1 = normal operation.
    Shutdown = 0x0C,
    /// 1 = all LEDs on regardless of RAM.
    DisplayTest = 0x0F,
}

/// Errors from the matrix driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MatrixError {
    /// SPI transfer failed.
    #[error("SPI transfer failed")]
    Communication,
}

/// MAX7219 on an async SPI device.
pub struct Max7219<SPI> {
    spi: SPI,
}

impl<SPI: SpiDevice> Max7219<SPI> {
    /// Wrap an SPI device with chip-select already bound.
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Give back the SPI device.
    pub fn release(self) -> SPI {
        self.spi
    }

    async fn write_register(&mut self, register: u8, data: u8) -> Result<(), MatrixError> {
        self.spi
            .write(&[register, data])
            .await
            .map_err(|_| MatrixError::Communication)
    }

    async fn write_digits(&mut self, columns: &[u8; MATRIX_SIZE]) -> Result<(), MatrixError> {
        for (address, bits) in (Register::Digit0 as u8..).zip(columns.iter()) {
            self.write_register(address, *bits).await?;
        }
        Ok(())
    }
}

impl<SPI: SpiDevice> MatrixDisplay for Max7219<SPI> {
    type Error = MatrixError;

    async fn init(&mut self) -> Result<(), Self::Error> {
        self.write_register(Register::DisplayTest as u8, 0x00).await?;
        self.write_register(Register::ScanLimit as u8, 0x07).await?;
        self.write_register(Register::DecodeMode as u8, 0x00).await?;
        self.write_register(Register::Shutdown as u8, 0x01).await?;
        self.write_digits(&[0; MATRIX_SIZE]).await
    }

    async fn set_intensity(&mut self, level: u8) -> Result<(), Self::Error> {
        self.write_register(Register::Intensity as u8, level.min(MAX_INTENSITY))
            .await
    }

    async fn commit(&mut self, frame: &MatrixFrame) -> Result<(), Self::Error> {
        self.write_digits(frame.columns()).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};

    /// One `SpiDevice::write` is TransactionStart + Write + TransactionEnd.
    fn reg_write(register: u8, data: u8) -> [SpiTransaction<u8>; 3] {
        [
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(vec![register, data]),
            SpiTransaction::transaction_end(),
        ]
    }

    fn expect(writes: &[(u8, u8)]) -> Vec<SpiTransaction<u8>> {
        writes.iter().flat_map(|&(r, d)| reg_write(r, d)).collect()
    }

    #[tokio::test]
    async fn test_init_sequence() {
        let mut writes = vec![(0x0F, 0x00), (0x0B, 0x07), (0x09, 0x00), (0x0C, 0x01)];
        writes.extend((1..=8).map(|digit| (digit, 0x00)));
        let mut spi = SpiMock::new(&expect(&writes));

        let mut matrix = Max7219::new(spi.clone());
        matrix.init().await.unwrap();

        spi.done();
    }

    #[tokio::test]
    async fn test_intensity_is_clamped() {
        let mut spi = SpiMock::new(&expect(&[(0x0A, 0x03), (0x0A, 0x0F)]));

        let mut matrix = Max7219::new(spi.clone());
        matrix.set_intensity(3).await.unwrap();
        matrix.set_intensity(200).await.unwrap();

        spi.done();
    }

    #[tokio::test]
    async fn test_commit_maps_columns_to_digits() {
        let columns = [0x0C, 0x1E, 0x3E, 0x7C, 0x7C, 0x3E, 0x1E, 0x0C];
        let writes: Vec<(u8, u8)> = (1u8..).zip(columns).collect();
        let mut spi = SpiMock::new(&expect(&writes));

        let mut matrix = Max7219::new(spi.clone());
        matrix.commit(&MatrixFrame::from_columns(columns)).await.unwrap();

        spi.done();
    }
}
