//! GPIO, external interrupt and capacitive touch abstractions
//!
//! Interrupt handlers registered through this module run in interrupt
//! context: they must not block, must not allocate and must finish in
//! bounded time. Everything else belongs in a task.

pub use embedded_hal::digital::PinState;

/// Board-level pin identity (GPIO number on the target MCU).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct PinId(u8);

impl PinId {
    /// Wrap a raw GPIO number.
    pub const fn new(number: u8) -> Self {
        Self(number)
    }

    /// Raw GPIO number.
    pub const fn number(self) -> u8 {
        self.0
    }
}

impl core::fmt::Display for PinId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "GPIO{}", self.0)
    }
}

/// External interrupt configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptMode {
    /// Trigger on rising edge
    RisingEdge,
    /// Trigger on falling edge
    FallingEdge,
    /// Trigger on both edges
    BothEdges,
}

impl InterruptMode {
    /// Returns `true` if a transition from `from` to `to` fires this mode.
    pub fn fires_on(self, from: PinState, to: PinState) -> bool {
        match (self, from, to) {
            (Self::RisingEdge | Self::BothEdges, PinState::Low, PinState::High) => true,
            (Self::FallingEdge | Self::BothEdges, PinState::High, PinState::Low) => true,
            _ => false,
        }
    }
}

/// Input bias resistor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pull {
    /// Floating (no pull resistor)
    None,
    /// Internal pull-up
    Up,
    /// Internal pull-down
    Down,
}

impl Pull {
    /// Idle level of an otherwise undriven pin with this bias.
    pub fn idle_level(self) -> PinState {
        match self {
            Self::Up => PinState::High,
            Self::None | Self::Down => PinState::Low,
        }
    }
}

/// Body of an interrupt service routine.
///
/// Called from interrupt context with the interrupt already acknowledged.
/// Implementations are `Sync` because the same handler may be entered from
/// any core the interrupt is routed to.
pub trait InterruptHandler: Sync {
    /// Handle one interrupt. Must be O(1) and never block.
    fn on_interrupt(&self);
}

/// Edge-triggered external interrupt controller (EXTI / GPIO matrix).
pub trait InterruptController {
    /// Error type
    type Error: core::fmt::Debug;

    /// Configure `pin` as an input with the given bias.
    fn configure_input(&mut self, pin: PinId, pull: Pull) -> Result<(), Self::Error>;

    /// Route edges of `pin` matching `mode` to `handler`.
    fn attach(
        &mut self,
        pin: PinId,
        mode: InterruptMode,
        handler: &'static dyn InterruptHandler,
    ) -> Result<(), Self::Error>;

    /// Remove any handler attached to `pin`.
    fn detach(&mut self, pin: PinId) -> Result<(), Self::Error>;
}

/// Capacitive touch peripheral.
///
/// The controller raises an interrupt when the measured capacitance on `pin`
/// crosses `threshold`.
pub trait TouchController {
    /// Error type
    type Error: core::fmt::Debug;

    /// Route touch events on `pin` to `handler`.
    fn attach_touch(
        &mut self,
        pin: PinId,
        threshold: u16,
        handler: &'static dyn InterruptHandler,
    ) -> Result<(), Self::Error>;
}
