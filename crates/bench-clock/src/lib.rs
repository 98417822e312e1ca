//! Monotonic timestamp source with a compile-time-selectable backend.
//!
//! The contract is the same regardless of backend: non-decreasing within a
//! single process, nanosecond-denominated, resolution of at least 1 ns.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClockError {
    #[error("LIBMICRO_HZ must be set when the tsc clock backend is enabled")]
    MissingFrequencyEnv,
    #[error("LIBMICRO_HZ could not be parsed as an integer: {0}")]
    InvalidFrequencyEnv(#[source] std::num::ParseIntError),
}

/// One-time backend setup. A no-op for every backend except `tsc`, which
/// needs `LIBMICRO_HZ` to convert cycles to nanoseconds.
pub fn init() -> Result<(), ClockError> {
    inner::init()
}

/// Current monotonic timestamp in nanoseconds.
pub fn now_ns() -> u64 {
    inner::now_ns()
}

#[cfg(all(feature = "tsc", feature = "coarse"))]
compile_error!("bench-clock: the `tsc` and `coarse` features are mutually exclusive");

#[cfg(feature = "tsc")]
mod inner {
    use super::ClockError;
    use std::sync::OnceLock;

    static HZ: OnceLock<u64> = OnceLock::new();

    pub fn init() -> Result<(), ClockError> {
        let raw = std::env::var("LIBMICRO_HZ").map_err(|_| ClockError::MissingFrequencyEnv)?;
        let hz = raw.parse::<u64>().map_err(ClockError::InvalidFrequencyEnv)?;
        HZ.get_or_init(|| hz);
        Ok(())
    }

    #[cfg(target_arch = "x86_64")]
    fn cycles() -> u64 {
        unsafe { core::arch::x86_64::_rdtsc() }
    }

    #[cfg(not(target_arch = "x86_64"))]
    fn cycles() -> u64 {
        // no cycle counter intrinsic available; fall back to the native clock
        super::coarse_fallback_ns()
    }

    pub fn now_ns() -> u64 {
        let hz = *HZ.get().unwrap_or(&1_000_000_000);
        let c = cycles();
        ((c as u128 * 1_000_000_000u128) / hz as u128) as u64
    }
}

#[cfg(feature = "coarse")]
mod inner {
    use super::ClockError;

    pub fn init() -> Result<(), ClockError> {
        Ok(())
    }

    pub fn now_ns() -> u64 {
        super::coarse_fallback_ns()
    }
}

#[cfg(not(any(feature = "tsc", feature = "coarse")))]
mod inner {
    use super::ClockError;

    pub fn init() -> Result<(), ClockError> {
        Ok(())
    }

    #[cfg(target_os = "macos")]
    pub fn now_ns() -> u64 {
        use std::sync::OnceLock;
        static TIMEBASE: OnceLock<libc::mach_timebase_info> = OnceLock::new();
        let info = TIMEBASE.get_or_init(|| {
            let mut info = libc::mach_timebase_info { numer: 0, denom: 0 };
            unsafe { libc::mach_timebase_info(&mut info) };
            info
        });
        let ticks = unsafe { libc::mach_absolute_time() };
        (ticks as u128 * info.numer as u128 / info.denom as u128) as u64
    }

    #[cfg(not(target_os = "macos"))]
    pub fn now_ns() -> u64 {
        let mut ts = libc::timespec { tv_sec: 0, tv_nsec: 0 };
        unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts) };
        ts.tv_sec as u64 * 1_000_000_000 + ts.tv_nsec as u64
    }
}

#[allow(dead_code)]
fn coarse_fallback_ns() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    now.as_micros() as u64 * 1_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_ns_is_nondecreasing() {
        let a = now_ns();
        let b = now_ns();
        assert!(b >= a);
    }

    #[test]
    fn now_ns_advances_over_a_sleep() {
        let a = now_ns();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let b = now_ns();
        assert!(b > a);
    }
}
