//! Logging shim.
//!
//! Hardware builds (`defmt`) log over RTT, host builds (`std`) log through
//! `tracing`, and builds with neither compile the log points away. Format
//! strings must stay in the subset both backends accept: `{}` for
//! integers, `&str` and types implementing both `Display` and
//! `defmt::Format`, `{:?}` for values wrapped in [`dbg_fmt`].
#![macro_use]
#![allow(unused_macros)]

macro_rules! trace {
    ($s:literal $(, $x:expr)* $(,)?) => {{
        #[cfg(feature = "defmt")]
        ::defmt::trace!($s $(, $x)*);
        #[cfg(all(feature = "std", not(feature = "defmt")))]
        ::tracing::trace!($s $(, $x)*);
        #[cfg(not(any(feature = "defmt", feature = "std")))]
        let _ = ($( & $x ),*);
    }};
}

macro_rules! debug {
    ($s:literal $(, $x:expr)* $(,)?) => {{
        #[cfg(feature = "defmt")]
        ::defmt::debug!($s $(, $x)*);
        #[cfg(all(feature = "std", not(feature = "defmt")))]
        ::tracing::debug!($s $(, $x)*);
        #[cfg(not(any(feature = "defmt", feature = "std")))]
        let _ = ($( & $x ),*);
    }};
}

macro_rules! info {
    ($s:literal $(, $x:expr)* $(,)?) => {{
        #[cfg(feature = "defmt")]
        ::defmt::info!($s $(, $x)*);
        #[cfg(all(feature = "std", not(feature = "defmt")))]
        ::tracing::info!($s $(, $x)*);
        #[cfg(not(any(feature = "defmt", feature = "std")))]
        let _ = ($( & $x ),*);
    }};
}

macro_rules! warn {
    ($s:literal $(, $x:expr)* $(,)?) => {{
        #[cfg(feature = "defmt")]
        ::defmt::warn!($s $(, $x)*);
        #[cfg(all(feature = "std", not(feature = "defmt")))]
        ::tracing::warn!($s $(, $x)*);
        #[cfg(not(any(feature = "defmt", feature = "std")))]
        let _ = ($( & $x ),*);
    }};
}

macro_rules! error {
    ($s:literal $(, $x:expr)* $(,)?) => {{
        #[cfg(feature = "defmt")]
        ::defmt::error!($s $(, $x)*);
        #[cfg(all(feature = "std", not(feature = "defmt")))]
        ::tracing::error!($s $(, $x)*);
        #[cfg(not(any(feature = "defmt", feature = "std")))]
        let _ = ($( & $x ),*);
    }};
}

/// Wrap a `Debug`-only value (device error types) for logging with `{:?}`.
#[cfg(feature = "defmt")]
pub(crate) fn dbg_fmt<T: core::fmt::Debug + ?Sized>(value: &T) -> defmt::Debug2Format<'_, T> {
    defmt::Debug2Format(value)
}

/// Wrap a `Debug`-only value (device error types) for logging with `{:?}`.
#[cfg(not(feature = "defmt"))]
pub(crate) fn dbg_fmt<T: core::fmt::Debug + ?Sized>(value: &T) -> &T {
    value
}
