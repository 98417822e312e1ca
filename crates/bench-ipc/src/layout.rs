//! The fixed-size header placed at the front of the shared mapping. The
//! sample ring (one `i64` per slot) follows it immediately in the same
//! mapping, the same layout `lithos-icc`'s ring header uses for its slots.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicI32, AtomicI64, AtomicU64};

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Killed {
    None = 0,
    Long = 1,
    Interrupt = 2,
}

impl Killed {
    pub(crate) fn from_i32(v: i32) -> Self {
        match v {
            1 => Killed::Long,
            2 => Killed::Interrupt,
            _ => Killed::None,
        }
    }
}

#[cfg(not(feature = "sysv-barrier"))]
pub(crate) struct SyncFields {
    pub(crate) lock: UnsafeCell<libc::pthread_mutex_t>,
    pub(crate) cv: UnsafeCell<libc::pthread_cond_t>,
}

#[cfg(feature = "sysv-barrier")]
pub(crate) struct SyncFields {
    pub(crate) semid: AtomicI32,
}

/// Process-shared aggregation record and barrier state. Everything here is
/// either write-once before `fork()` (hwm, datasize, min_samples, overhead,
/// resolution, min_runtime, deadline) or mutated only under the barrier's
/// mutual exclusion (waiters, phase) or via atomics readable without it
/// (batches, count, errors, total_time, quant, killed).
#[repr(C)]
pub(crate) struct Header {
    pub(crate) hwm: u32,
    pub(crate) datasize: u64,
    pub(crate) min_samples: u32,

    pub(crate) overhead: u64,
    pub(crate) resolution: u64,

    pub(crate) min_runtime: i64,
    pub(crate) deadline: i64,
    pub(crate) start_time: i64,
    pub(crate) end_time: AtomicI64,

    pub(crate) waiters: AtomicI32,
    pub(crate) phase: AtomicI64,

    pub(crate) batches: AtomicU64,
    pub(crate) count: AtomicU64,
    pub(crate) errors: AtomicU64,
    pub(crate) total_time: AtomicU64,
    pub(crate) quant: AtomicU64,
    pub(crate) killed: AtomicI32,

    pub(crate) sync: SyncFields,
}

pub(crate) fn header_size() -> usize {
    std::mem::size_of::<Header>()
}
