//! Shared event-flag register between interrupt and task context.
//!
//! # Model
//!
//! Flags are level state. A producer raises a flag, the one consumer that
//! owns it clears it after the response completes. Raising a flag that is
//! already set changes nothing and wakes nobody; the pending response will
//! still run exactly once.
//!
//! ```text
//!  ISR / poller ──set_from_interrupt(F)──▶ [ bits: AtomicU8 ] ──wait_any(mask)──▶ responder task
//!                                                 ▲                                    │
//!                                                 └───────────── clear(F) ─────────────┘
//! ```
//!
//! # Interrupt safety
//!
//! The set side is one `fetch_or` plus, only on a clear→set transition, a
//! critical section that wakes at most [`MAX_WAITERS`] wakers. Waking is
//! the reschedule request; the executor runs the woken task once the ISR
//! returns. Nothing on the set side can block.
//!
//! # Lifecycle
//!
//! The register is created once at boot and shared by `&'static` reference
//! with every producer and consumer. [`SignalRegister::create`] is
//! idempotent and safe to race; [`SignalRegister::destroy`] must not be
//! called while producers or consumers are active (nothing coordinates
//! with in-flight waiters).

use core::cell::RefCell;
use core::future::poll_fn;
use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use core::task::Poll;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::waitqueue::MultiWakerRegistration;

use crate::error::InteractError;

/// Tasks that may be parked in [`SignalRegister::wait_any`] at once.
///
/// Two responders wait today. If more register, the oldest wakers are woken
/// early and simply re-check their mask.
pub const MAX_WAITERS: usize = 4;

/// Named event flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Flag {
    /// Capacitive touch pad pressed.
    Touch = 0b001,
    /// Limit switch tripped.
    Limit = 0b010,
    /// Ambient light dropped below threshold.
    Light = 0b100,
}

impl Flag {
    /// Every flag, in bit order.
    pub const ALL: [Flag; 3] = [Flag::Touch, Flag::Limit, Flag::Light];

    /// Bit mask of this flag.
    pub const fn bit(self) -> u8 {
        self as u8
    }
}

impl core::fmt::Display for Flag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::Touch => "TOUCH",
            Self::Limit => "LIMIT",
            Self::Light => "LIGHT",
        })
    }
}

/// Set of [`Flag`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct FlagSet(u8);

impl FlagSet {
    const VALID: u8 = Flag::Touch.bit() | Flag::Limit.bit() | Flag::Light.bit();

    /// No flags.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Every flag.
    pub const fn all() -> Self {
        Self(Self::VALID)
    }

    /// Build from a raw bit pattern; unknown bits are dropped.
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & Self::VALID)
    }

    /// Raw bit pattern.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// `self` plus `flag`.
    #[must_use]
    pub const fn with(self, flag: Flag) -> Self {
        Self(self.0 | flag.bit())
    }

    /// Whether `flag` is in the set.
    pub const fn contains(self, flag: Flag) -> bool {
        self.0 & flag.bit() != 0
    }

    /// Flags present in both sets.
    #[must_use]
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Flags present in either set.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// `true` when no flag is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Flags in the set, in bit order.
    pub fn iter(self) -> impl Iterator<Item = Flag> {
        Flag::ALL.into_iter().filter(move |f| self.contains(*f))
    }
}

impl From<Flag> for FlagSet {
    fn from(flag: Flag) -> Self {
        Self(flag.bit())
    }
}

impl FromIterator<Flag> for FlagSet {
    fn from_iter<I: IntoIterator<Item = Flag>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

/// Result of raising a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SetOutcome {
    /// The flag went clear→set and waiters were woken (reschedule requested).
    Raised,
    /// The flag was already set; nothing changed.
    AlreadySet,
}

/// Process-wide flag register.
pub struct SignalRegister {
    live: AtomicBool,
    bits: AtomicU8,
    waiters: Mutex<CriticalSectionRawMutex, RefCell<MultiWakerRegistration<MAX_WAITERS>>>,
}

impl SignalRegister {
    /// A register that has not been created yet. `const` so it can live in
    /// a `static`.
    pub const fn new() -> Self {
        Self {
            live: AtomicBool::new(false),
            bits: AtomicU8::new(0),
            waiters: Mutex::new(RefCell::new(MultiWakerRegistration::new())),
        }
    }

    /// Bring the register live, or return it unchanged if it already is.
    ///
    /// Flags are never written here: a fresh register starts empty and
    /// [`destroy`](Self::destroy) empties it, so a set that lands right after
    /// the live transition is kept.
    ///
    /// # Errors
    ///
    /// Storage is reserved statically, so this cannot currently fail; the
    /// `ResourceExhausted` contract is kept for callers.
    pub fn create(&self) -> Result<&Self, InteractError> {
        if self
            .live
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            info!("signal register created");
        }
        Ok(self)
    }

    /// Tear the register down. Later sets fail with `InvalidState` until the
    /// next [`create`](Self::create).
    ///
    /// Waiters are woken so they re-evaluate, but they will block again on
    /// the now-empty register. Destroying while tasks wait is a caller bug.
    pub fn destroy(&self) {
        if self.live.swap(false, Ordering::AcqRel) {
            self.bits.store(0, Ordering::Release);
            self.wake_all();
            info!("signal register destroyed");
        }
    }

    /// Whether [`create`](Self::create) has run and no `destroy` followed.
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    /// Raise `flag` from interrupt context.
    ///
    /// Bounded, never blocks. Returns [`SetOutcome::Raised`] when waiters
    /// were woken.
    ///
    /// # Errors
    ///
    /// `InvalidState` when the register is not live. Interrupt handlers log
    /// and drop this; there is no error channel out of an ISR.
    pub fn set_from_interrupt(&self, flag: Flag) -> Result<SetOutcome, InteractError> {
        if !self.is_live() {
            return Err(InteractError::InvalidState);
        }
        let previous = self.bits.fetch_or(flag.bit(), Ordering::AcqRel);
        if previous & flag.bit() != 0 {
            return Ok(SetOutcome::AlreadySet);
        }
        self.wake_all();
        Ok(SetOutcome::Raised)
    }

    /// Raise `flag` from task context. Same semantics as
    /// [`set_from_interrupt`](Self::set_from_interrupt).
    ///
    /// # Errors
    ///
    /// `InvalidState` when the register is not live.
    pub fn set(&self, flag: Flag) -> Result<SetOutcome, InteractError> {
        self.set_from_interrupt(flag)
    }

    /// Clear `flag`. Idempotent.
    pub fn clear(&self, flag: Flag) {
        self.bits.fetch_and(!flag.bit(), Ordering::AcqRel);
    }

    /// Snapshot of the flags currently set.
    pub fn pending(&self) -> FlagSet {
        FlagSet::from_bits_truncate(self.bits.load(Ordering::Acquire))
    }

    /// Wait until at least one flag in `mask` is set and return the set
    /// flags within `mask`.
    ///
    /// Never clears anything; clearing is the caller's explicit step. There
    /// is no timeout.
    pub async fn wait_any(&self, mask: FlagSet) -> FlagSet {
        poll_fn(|cx| {
            let hit = self.pending().intersection(mask);
            if !hit.is_empty() {
                return Poll::Ready(hit);
            }
            self.waiters.lock(|w| w.borrow_mut().register(cx.waker()));
            // A set between the first check and registration would otherwise
            // be missed until the next one.
            let hit = self.pending().intersection(mask);
            if hit.is_empty() {
                Poll::Pending
            } else {
                Poll::Ready(hit)
            }
        })
        .await
    }

    fn wake_all(&self) {
        self.waiters.lock(|w| w.borrow_mut().wake());
    }
}

impl Default for SignalRegister {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_flag_bits_are_distinct() {
        let union = Flag::ALL.iter().fold(0u8, |acc, f| {
            assert_eq!(acc & f.bit(), 0);
            acc | f.bit()
        });
        assert_eq!(FlagSet::all().bits(), union);
    }

    #[test]
    fn test_flag_display() {
        assert_eq!(Flag::Touch.to_string(), "TOUCH");
        assert_eq!(Flag::Light.to_string(), "LIGHT");
    }

    #[test]
    fn test_set_requires_live_register() {
        let register = SignalRegister::new();
        assert_eq!(
            register.set_from_interrupt(Flag::Touch),
            Err(InteractError::InvalidState)
        );
        register.create().unwrap();
        assert_eq!(register.set_from_interrupt(Flag::Touch), Ok(SetOutcome::Raised));
    }

    #[test]
    fn test_reassert_is_idempotent() {
        let register = SignalRegister::new();
        register.create().unwrap();
        assert_eq!(register.set(Flag::Limit), Ok(SetOutcome::Raised));
        assert_eq!(register.set(Flag::Limit), Ok(SetOutcome::AlreadySet));
        assert_eq!(register.pending(), FlagSet::from(Flag::Limit));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let register = SignalRegister::new();
        register.create().unwrap();
        register.clear(Flag::Light);
        register.set(Flag::Light).unwrap();
        register.clear(Flag::Light);
        register.clear(Flag::Light);
        assert!(register.pending().is_empty());
    }

    #[test]
    fn test_second_create_keeps_flags() {
        let register = SignalRegister::new();
        let first = register.create().unwrap() as *const SignalRegister;
        register.set(Flag::Touch).unwrap();
        let second = register.create().unwrap() as *const SignalRegister;
        assert_eq!(first, second);
        assert!(register.pending().contains(Flag::Touch));
    }

    #[test]
    fn test_destroy_then_create_starts_clean() {
        let register = SignalRegister::new();
        register.create().unwrap();
        register.set(Flag::Touch).unwrap();
        register.destroy();
        assert!(!register.is_live());
        assert!(register.set(Flag::Touch).is_err());
        register.create().unwrap();
        assert!(register.pending().is_empty());
    }

    proptest! {
        #[test]
        fn prop_flagset_iter_roundtrips(bits in any::<u8>()) {
            let set = FlagSet::from_bits_truncate(bits);
            let rebuilt: FlagSet = set.iter().collect();
            prop_assert_eq!(rebuilt, set);
            prop_assert_eq!(set.bits() & !FlagSet::all().bits(), 0);
        }

        #[test]
        fn prop_pending_tracks_last_write(ops in proptest::collection::vec((0usize..3, any::<bool>()), 0..64)) {
            let register = SignalRegister::new();
            register.create().unwrap();
            let mut model = FlagSet::empty();
            for (index, raise) in ops {
                let flag = Flag::ALL[index];
                if raise {
                    let outcome = register.set(flag).unwrap();
                    let expected = if model.contains(flag) { SetOutcome::AlreadySet } else { SetOutcome::Raised };
                    prop_assert_eq!(outcome, expected);
                    model = model.with(flag);
                } else {
                    register.clear(flag);
                    model = FlagSet::from_bits_truncate(model.bits() & !flag.bit());
                }
                prop_assert_eq!(register.pending(), model);
            }
        }
    }
}
