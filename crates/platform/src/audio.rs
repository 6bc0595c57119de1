//! DAC audio output abstraction

/// Buffered DAC output channel.
///
/// The channel owns an internal sample FIFO that a timer interrupt drains
/// at the configured sample rate. Task code keeps it topped up through
/// [`fill`](DacOutput::fill); if the FIFO runs dry the output underruns,
/// which is audible but not an error.
pub trait DacOutput {
    /// Error type
    type Error: core::fmt::Debug;

    /// Start the drain timer at `sample_rate` Hz.
    fn start(&mut self, sample_rate: u32) -> Result<(), Self::Error>;

    /// Capacity of the internal FIFO in samples.
    fn buffer_depth(&self) -> usize;

    /// Queue as many of `samples` as currently fit, without blocking.
    ///
    /// Returns how many samples were accepted (possibly zero).
    fn fill(&mut self, samples: &[u8]) -> Result<usize, Self::Error>;

    /// Samples accepted by `fill` that have not reached the output yet.
    fn queued(&self) -> usize;

    /// Stop the drain timer and discard anything still queued.
    ///
    /// Wait for [`queued`](DacOutput::queued) to reach zero first if the
    /// tail of a clip must be heard.
    fn stop_all(&mut self) -> Result<(), Self::Error>;
}
