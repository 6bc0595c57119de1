//! Mock implementations for testing
//!
//! This module provides mock implementations of all platform traits
//! for use in unit and integration tests.

// Counters in test doubles cannot realistically overflow.
#![allow(clippy::arithmetic_side_effects)]

use core::cell::Cell;
use core::convert::Infallible;

use embassy_time::Instant;

use crate::*;

/// Error injected by mocks configured to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockFault;

const MAX_PINS: usize = 8;

/// Attached handler record
#[derive(Clone, Copy)]
struct Attachment {
    pin: PinId,
    mode: InterruptMode,
    handler: &'static dyn InterruptHandler,
}

/// Mock edge interrupt controller.
///
/// [`drive`](Self::drive) simulates a raw level change on a pin and runs the
/// attached handler inline when the edge matches, the way the hardware
/// would enter the ISR.
pub struct MockInterruptController {
    inputs: heapless::Vec<(PinId, Pull), MAX_PINS>,
    levels: heapless::Vec<(PinId, PinState), MAX_PINS>,
    attachments: heapless::Vec<Attachment, MAX_PINS>,
    dispatched: usize,
}

impl MockInterruptController {
    /// Create a controller with nothing configured.
    pub fn new() -> Self {
        Self {
            inputs: heapless::Vec::new(),
            levels: heapless::Vec::new(),
            attachments: heapless::Vec::new(),
            dispatched: 0,
        }
    }

    /// Bias configured for `pin`, if any.
    pub fn pull_of(&self, pin: PinId) -> Option<Pull> {
        self.inputs.iter().find(|(p, _)| *p == pin).map(|(_, pull)| *pull)
    }

    /// Whether a handler is attached to `pin`.
    pub fn is_attached(&self, pin: PinId) -> bool {
        self.attachments.iter().any(|a| a.pin == pin)
    }

    /// Trigger mode attached to `pin`, if any.
    pub fn mode_of(&self, pin: PinId) -> Option<InterruptMode> {
        self.attachments
            .iter()
            .find(|a| a.pin == pin)
            .map(|a| a.mode)
    }

    /// Number of handler invocations so far.
    pub fn dispatched(&self) -> usize {
        self.dispatched
    }

    /// Current level of `pin` (idle level of its bias when never driven).
    pub fn level(&self, pin: PinId) -> PinState {
        self.levels
            .iter()
            .find(|(p, _)| *p == pin)
            .map(|(_, level)| *level)
            .or_else(|| self.pull_of(pin).map(Pull::idle_level))
            .unwrap_or(PinState::Low)
    }

    /// Drive `pin` to `level`, entering the handler if the edge matches.
    pub fn drive(&mut self, pin: PinId, level: PinState) {
        let previous = self.level(pin);
        if let Some(slot) = self.levels.iter_mut().find(|(p, _)| *p == pin) {
            slot.1 = level;
        } else {
            let _ = self.levels.push((pin, level));
        }
        let hit = self
            .attachments
            .iter()
            .find(|a| a.pin == pin && a.mode.fires_on(previous, level))
            .copied();
        if let Some(attachment) = hit {
            self.dispatched += 1;
            attachment.handler.on_interrupt();
        }
    }

    /// Press-and-release pulse around the pin's idle level.
    pub fn pulse(&mut self, pin: PinId) {
        let idle = self.level(pin);
        let active = match idle {
            PinState::High => PinState::Low,
            PinState::Low => PinState::High,
        };
        self.drive(pin, active);
        self.drive(pin, idle);
    }
}

impl Default for MockInterruptController {
    fn default() -> Self {
        Self::new()
    }
}

impl InterruptController for MockInterruptController {
    type Error = MockFault;

    fn configure_input(&mut self, pin: PinId, pull: Pull) -> Result<(), Self::Error> {
        if let Some(slot) = self.inputs.iter_mut().find(|(p, _)| *p == pin) {
            slot.1 = pull;
            return Ok(());
        }
        self.inputs.push((pin, pull)).map_err(|_| MockFault)
    }

    fn attach(
        &mut self,
        pin: PinId,
        mode: InterruptMode,
        handler: &'static dyn InterruptHandler,
    ) -> Result<(), Self::Error> {
        self.detach(pin)?;
        self.attachments
            .push(Attachment { pin, mode, handler })
            .map_err(|_| MockFault)
    }

    fn detach(&mut self, pin: PinId) -> Result<(), Self::Error> {
        self.attachments.retain(|a| a.pin != pin);
        Ok(())
    }
}

/// Mock capacitive touch controller
pub struct MockTouchController {
    attachments: heapless::Vec<(PinId, u16, &'static dyn InterruptHandler), MAX_PINS>,
}

impl MockTouchController {
    /// Create a controller with no touch pads attached.
    pub fn new() -> Self {
        Self {
            attachments: heapless::Vec::new(),
        }
    }

    /// Threshold attached to `pin`, if any.
    pub fn threshold_of(&self, pin: PinId) -> Option<u16> {
        self.attachments
            .iter()
            .find(|(p, _, _)| *p == pin)
            .map(|(_, threshold, _)| *threshold)
    }

    /// Simulate a touch with measured value `reading` on `pin`.
    ///
    /// The peripheral interrupts when the reading drops below the threshold.
    pub fn touch(&self, pin: PinId, reading: u16) {
        if let Some((_, _, handler)) = self
            .attachments
            .iter()
            .find(|(p, threshold, _)| *p == pin && reading < *threshold)
        {
            handler.on_interrupt();
        }
    }
}

impl Default for MockTouchController {
    fn default() -> Self {
        Self::new()
    }
}

impl TouchController for MockTouchController {
    type Error = MockFault;

    fn attach_touch(
        &mut self,
        pin: PinId,
        threshold: u16,
        handler: &'static dyn InterruptHandler,
    ) -> Result<(), Self::Error> {
        self.attachments.retain(|(p, _, _)| *p != pin);
        self.attachments
            .push((pin, threshold, handler))
            .map_err(|_| MockFault)
    }
}

/// Mock ADC channel replaying a scripted sequence of conversions.
pub struct MockAnalog {
    script: heapless::Deque<Result<u16, MockFault>, 64>,
    fallback: u16,
    reads: usize,
}

impl MockAnalog {
    /// Create a channel that reads `fallback` once the script is exhausted.
    pub fn new(fallback: u16) -> Self {
        Self {
            script: heapless::Deque::new(),
            fallback,
            reads: 0,
        }
    }

    /// Queue one conversion result.
    pub fn push(&mut self, reading: u16) -> Result<(), Result<u16, MockFault>> {
        self.script.push_back(Ok(reading))
    }

    /// Queue one failed conversion.
    pub fn push_fault(&mut self) -> Result<(), Result<u16, MockFault>> {
        self.script.push_back(Err(MockFault))
    }

    /// Number of conversions taken.
    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl AnalogInput for MockAnalog {
    type Error = MockFault;

    fn read(&mut self) -> Result<u16, Self::Error> {
        self.reads += 1;
        self.script.pop_front().unwrap_or(Ok(self.fallback))
    }
}

/// Mock DAC channel.
///
/// Every call to [`fill`](DacOutput::fill) or [`queued`](DacOutput::queued)
/// first drains `drain_per_fill` samples, standing in for the timer ISR
/// that consumes the FIFO between task visits. Drained samples count as
/// played; whatever `stop_all` finds still queued counts as discarded.
pub struct MockDac {
    depth: usize,
    drain_per_fill: usize,
    queued: Cell<usize>,
    played: Cell<usize>,
    discarded: usize,
    running: bool,
    sample_rate: u32,
    accepted: usize,
    fills: usize,
    starts: usize,
    stops: usize,
    fail_after_fills: Option<usize>,
}

impl MockDac {
    /// Create a channel with a FIFO of `depth` samples.
    pub fn new(depth: usize, drain_per_fill: usize) -> Self {
        Self {
            depth,
            drain_per_fill,
            queued: Cell::new(0),
            played: Cell::new(0),
            discarded: 0,
            running: false,
            sample_rate: 0,
            accepted: 0,
            fills: 0,
            starts: 0,
            stops: 0,
            fail_after_fills: None,
        }
    }

    /// Make every fill after the first `fills` return an error.
    pub fn fail_after(mut self, fills: usize) -> Self {
        self.fail_after_fills = Some(fills);
        self
    }

    /// Whether the drain timer is running.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Sample rate passed to the last `start`.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Total samples accepted across all fills.
    pub fn accepted(&self) -> usize {
        self.accepted
    }

    /// Samples that left the FIFO through the drain timer.
    pub fn played(&self) -> usize {
        self.played.get()
    }

    /// Samples thrown away by `stop_all`.
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    fn drain(&self) {
        let n = self.queued.get().min(self.drain_per_fill);
        self.queued.set(self.queued.get() - n);
        self.played.set(self.played.get() + n);
    }

    /// Number of `fill` calls.
    pub fn fills(&self) -> usize {
        self.fills
    }

    /// Number of `start` calls.
    pub fn starts(&self) -> usize {
        self.starts
    }

    /// Number of `stop_all` calls.
    pub fn stops(&self) -> usize {
        self.stops
    }
}

impl DacOutput for MockDac {
    type Error = MockFault;

    fn start(&mut self, sample_rate: u32) -> Result<(), Self::Error> {
        self.running = true;
        self.sample_rate = sample_rate;
        self.starts += 1;
        Ok(())
    }

    fn buffer_depth(&self) -> usize {
        self.depth
    }

    fn fill(&mut self, samples: &[u8]) -> Result<usize, Self::Error> {
        if self.fail_after_fills.is_some_and(|limit| self.fills >= limit) {
            return Err(MockFault);
        }
        self.fills += 1;
        self.drain();
        let taken = samples.len().min(self.depth - self.queued.get());
        self.queued.set(self.queued.get() + taken);
        self.accepted += taken;
        Ok(taken)
    }

    fn queued(&self) -> usize {
        self.drain();
        self.queued.get()
    }

    fn stop_all(&mut self) -> Result<(), Self::Error> {
        self.running = false;
        self.discarded += self.queued.replace(0);
        self.stops += 1;
        Ok(())
    }
}

/// Mock LED matrix recording every committed frame with its timestamp.
pub struct MockMatrix {
    inits: usize,
    intensity: Option<u8>,
    commits: heapless::Vec<(Instant, MatrixFrame), 256>,
    current: MatrixFrame,
}

impl MockMatrix {
    /// Create an uninitialised mock matrix.
    pub fn new() -> Self {
        Self {
            inits: 0,
            intensity: None,
            commits: heapless::Vec::new(),
            current: MatrixFrame::new(),
        }
    }

    /// Number of `init` calls.
    pub fn inits(&self) -> usize {
        self.inits
    }

    /// Last brightness set.
    pub fn intensity(&self) -> Option<u8> {
        self.intensity
    }

    /// Committed frames with the instant they were pushed.
    pub fn commits(&self) -> &[(Instant, MatrixFrame)] {
        &self.commits
    }

    /// Frame currently shown.
    pub fn current(&self) -> &MatrixFrame {
        &self.current
    }

    /// Forget recorded commits (the shown frame is kept).
    pub fn clear_history(&mut self) {
        self.commits.clear();
    }
}

impl Default for MockMatrix {
    fn default() -> Self {
        Self::new()
    }
}

impl MatrixDisplay for MockMatrix {
    type Error = Infallible;

    async fn init(&mut self) -> Result<(), Self::Error> {
        self.inits += 1;
        self.current.clear();
        Ok(())
    }

    async fn set_intensity(&mut self, level: u8) -> Result<(), Self::Error> {
        self.intensity = Some(level.min(MAX_INTENSITY));
        Ok(())
    }

    async fn commit(&mut self, frame: &MatrixFrame) -> Result<(), Self::Error> {
        self.current = *frame;
        // History is bounded; the shown frame is always tracked.
        let _ = self.commits.push((Instant::now(), *frame));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicUsize, Ordering};

    struct Counter(AtomicUsize);

    impl InterruptHandler for Counter {
        fn on_interrupt(&self) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn test_mock_interrupt_dispatches_matching_edge_only() {
        static HITS: Counter = Counter(AtomicUsize::new(0));
        let pin = PinId::new(4);
        let mut irq = MockInterruptController::new();
        irq.configure_input(pin, Pull::Down).unwrap();
        irq.attach(pin, InterruptMode::RisingEdge, &HITS).unwrap();

        irq.drive(pin, PinState::High);
        irq.drive(pin, PinState::Low);
        irq.drive(pin, PinState::Low);

        assert_eq!(HITS.0.load(Ordering::Relaxed), 1);
        assert_eq!(irq.dispatched(), 1);
    }

    #[test]
    fn test_mock_interrupt_detach_silences_pin() {
        static HITS: Counter = Counter(AtomicUsize::new(0));
        let pin = PinId::new(5);
        let mut irq = MockInterruptController::new();
        irq.attach(pin, InterruptMode::BothEdges, &HITS).unwrap();
        irq.detach(pin).unwrap();
        irq.pulse(pin);
        assert_eq!(HITS.0.load(Ordering::Relaxed), 0);
        assert!(!irq.is_attached(pin));
    }

    #[test]
    fn test_mock_touch_respects_threshold() {
        static HITS: Counter = Counter(AtomicUsize::new(0));
        let pin = PinId::new(15);
        let mut touch = MockTouchController::new();
        touch.attach_touch(pin, 40, &HITS).unwrap();
        touch.touch(pin, 55);
        touch.touch(pin, 12);
        assert_eq!(HITS.0.load(Ordering::Relaxed), 1);
        assert_eq!(touch.threshold_of(pin), Some(40));
    }

    #[test]
    fn test_mock_analog_replays_script_then_fallback() {
        let mut adc = MockAnalog::new(3000);
        adc.push(100).unwrap();
        adc.push_fault().unwrap();
        assert_eq!(adc.read(), Ok(100));
        assert_eq!(adc.read(), Err(MockFault));
        assert_eq!(adc.read(), Ok(3000));
        assert_eq!(adc.reads(), 3);
    }

    #[test]
    fn test_mock_dac_bounded_by_depth() {
        let mut dac = MockDac::new(16, 4);
        dac.start(8000).unwrap();
        assert_eq!(dac.fill(&[0x80; 32]).unwrap(), 16);
        assert_eq!(dac.fill(&[0x80; 32]).unwrap(), 4);
        dac.stop_all().unwrap();
        assert!(!dac.is_running());
        assert_eq!(dac.accepted(), 20);
        assert_eq!(dac.played(), 4);
        assert_eq!(dac.discarded(), 16);
    }

    #[test]
    fn test_mock_dac_drains_while_polled() {
        let mut dac = MockDac::new(16, 4);
        dac.start(8000).unwrap();
        dac.fill(&[0x80; 10]).unwrap();
        assert_eq!(dac.queued(), 6);
        assert_eq!(dac.queued(), 2);
        assert_eq!(dac.queued(), 0);
        assert_eq!(dac.played(), 10);
    }

    #[tokio::test]
    async fn test_mock_matrix_records_commits() {
        let mut matrix = MockMatrix::new();
        matrix.init().await.unwrap();
        matrix.set_intensity(40).await.unwrap();
        assert_eq!(matrix.intensity(), Some(MAX_INTENSITY));

        let frame = MatrixFrame::from_columns([1, 2, 3, 4, 5, 6, 7, 8]);
        matrix.commit(&frame).await.unwrap();
        assert_eq!(matrix.commits().len(), 1);
        assert_eq!(matrix.current(), &frame);
    }
}
