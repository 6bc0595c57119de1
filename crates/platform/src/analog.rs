//! Analog input abstraction

/// Single-channel ADC input bound to one pin.
pub trait AnalogInput {
    /// Error type
    type Error: core::fmt::Debug;

    /// Take one raw conversion (12-bit on the ESP32 ADC1, right-aligned).
    fn read(&mut self) -> Result<u16, Self::Error>;
}
