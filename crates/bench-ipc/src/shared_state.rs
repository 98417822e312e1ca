use crate::error::IpcError;
use crate::layout::{header_size, Header, Killed};
#[cfg(not(feature = "sysv-barrier"))]
use crate::layout::SyncFields;
use crate::mapping::SharedMapping;
use crate::result::BatchResult;
use std::sync::atomic::Ordering;

#[cfg(not(feature = "sysv-barrier"))]
use crate::barrier_condvar as barrier_impl;
#[cfg(feature = "sysv-barrier")]
use crate::barrier_sysv as barrier_impl;

pub const DEF_DATASIZE: u64 = 100_000;
pub const MIN_DATASIZE: u64 = 20_000;

/// Parameters fixed for the lifetime of a run, known before the barrier is
/// created.
#[derive(Debug, Clone, Copy)]
pub struct Setup {
    pub hwm: u32,
    pub min_samples: u32,
    pub overhead: u64,
    pub resolution: u64,
    pub min_runtime: i64,
    pub deadline: i64,
    pub start_time: i64,
}

/// A consistent read-only view over the counters in `SharedState`, taken
/// after the run has ended (no further writers).
#[derive(Debug, Clone, Copy, Default)]
pub struct Snapshot {
    pub batches: u64,
    pub count: u64,
    pub errors: u64,
    pub total_time: u64,
    pub quant: u64,
    pub start_time: i64,
    pub end_time: i64,
    pub killed: i32,
}

/// The process-shared barrier + aggregation record. C4 (barrier) and C5
/// (shared state) in one type, mirroring the original's single `barrier_t`.
pub struct SharedState {
    mapping: SharedMapping,
    header: *mut Header,
    data: *mut i64,
    datasize: usize,
}

unsafe impl Send for SharedState {}
unsafe impl Sync for SharedState {}

impl SharedState {
    /// `datasize = max(DEF_DATASIZE, MIN_DATASIZE * hwm)`.
    pub fn create(setup: Setup) -> Result<Self, IpcError> {
        let datasize = DEF_DATASIZE.max(MIN_DATASIZE * setup.hwm as u64) as usize;
        let total = header_size() + datasize * std::mem::size_of::<i64>();
        let mapping = SharedMapping::new(total).map_err(IpcError::Mmap)?;

        let header = mapping.as_mut_ptr() as *mut Header;
        let data = unsafe { mapping.as_mut_ptr().add(header_size()) as *mut i64 };

        unsafe {
            header.write(Header {
                hwm: setup.hwm,
                datasize: datasize as u64,
                min_samples: setup.min_samples,
                overhead: setup.overhead,
                resolution: setup.resolution,
                min_runtime: setup.min_runtime,
                deadline: setup.deadline,
                start_time: setup.start_time,
                end_time: std::sync::atomic::AtomicI64::new(0),
                waiters: std::sync::atomic::AtomicI32::new(0),
                phase: std::sync::atomic::AtomicI64::new(0),
                batches: std::sync::atomic::AtomicU64::new(0),
                count: std::sync::atomic::AtomicU64::new(0),
                errors: std::sync::atomic::AtomicU64::new(0),
                total_time: std::sync::atomic::AtomicU64::new(0),
                quant: std::sync::atomic::AtomicU64::new(0),
                killed: std::sync::atomic::AtomicI32::new(Killed::None as i32),
                sync: zeroed_sync_fields(),
            });
        }

        barrier_impl::init(unsafe { &*header })?;

        Ok(Self {
            mapping,
            header,
            data,
            datasize,
        })
    }

    fn header(&self) -> &Header {
        unsafe { &*self.header }
    }

    /// Rendezvous all `hwm` participants. `result` present means this
    /// caller's batch outcome should be folded into the aggregate record.
    /// Returns `true` once the barrier has flipped into its terminal phase.
    pub fn enter(&self, result: Option<BatchResult>) -> Result<bool, IpcError> {
        barrier_impl::enter(self.header(), self.data, result)
    }

    pub fn killed(&self) -> Killed {
        Killed::from_i32(self.header().killed.load(Ordering::Relaxed))
    }

    /// Sets the termination cause directly, bypassing the barrier — used by
    /// the supervisor on signal delivery (ALRM/INT), matching the original
    /// where the parent process writes `ba_killed` straight into the shared
    /// mapping without going through `barrier_queue`.
    pub fn mark_killed(&self, cause: Killed) {
        self.header().killed.store(cause as i32, Ordering::Relaxed);
    }

    pub fn mark_end_time(&self, t: i64) {
        self.header().end_time.store(t, Ordering::Relaxed);
    }

    pub fn datasize(&self) -> usize {
        self.datasize
    }

    pub fn data_slice(&self) -> &[i64] {
        unsafe { std::slice::from_raw_parts(self.data, self.datasize) }
    }

    /// A copy of the valid prefix of the ring, safe to sort/mutate for
    /// analysis without disturbing the shared ring itself.
    pub fn data_copy(&self) -> Vec<i64> {
        let batches = self.header().batches.load(Ordering::Relaxed) as usize;
        let n = batches.min(self.datasize);
        self.data_slice()[..n].to_vec()
    }

    /// Mean over the entire valid ring prefix — used by the dynamic
    /// batch-size re-tune. Deliberately unwindowed, preserving the
    /// original's behavior of including stale samples on long runs.
    pub fn recent_mean(&self) -> f64 {
        let batches = self.header().batches.load(Ordering::Relaxed) as usize;
        let n = batches.min(self.datasize);
        if n == 0 {
            return 0.0;
        }
        let sum: i64 = self.data_slice()[..n].iter().sum();
        sum as f64 / n as f64
    }

    pub fn snapshot(&self) -> Snapshot {
        let h = self.header();
        Snapshot {
            batches: h.batches.load(Ordering::Relaxed),
            count: h.count.load(Ordering::Relaxed),
            errors: h.errors.load(Ordering::Relaxed),
            total_time: h.total_time.load(Ordering::Relaxed),
            quant: h.quant.load(Ordering::Relaxed),
            start_time: h.start_time,
            end_time: h.end_time.load(Ordering::Relaxed),
            killed: h.killed.load(Ordering::Relaxed),
        }
    }
}

impl Drop for SharedState {
    fn drop(&mut self) {
        #[cfg(feature = "sysv-barrier")]
        {
            let _ = barrier_impl::destroy(self.header());
        }
    }
}

#[cfg(not(feature = "sysv-barrier"))]
fn zeroed_sync_fields() -> SyncFields {
    SyncFields {
        lock: std::cell::UnsafeCell::new(unsafe { std::mem::zeroed() }),
        cv: std::cell::UnsafeCell::new(unsafe { std::mem::zeroed() }),
    }
}

#[cfg(feature = "sysv-barrier")]
fn zeroed_sync_fields() -> crate::layout::SyncFields {
    crate::layout::SyncFields {
        semid: std::sync::atomic::AtomicI32::new(-1),
    }
}

/// `update_stats`: folds one worker's batch outcome into the running
/// totals and appends its derived `ns/op` sample to the ring. Runs once per
/// caller that supplies a `Result`, serialized by whichever barrier
/// primitive is active — see `SPEC_FULL.md` §0 for why this departs from a
/// literal "exactly one call per phase" reading.
pub(crate) fn aggregate(header: &Header, data: *mut i64, result: BatchResult) {
    header.count.fetch_add(result.count, Ordering::Relaxed);
    header.errors.fetch_add(result.errors as u64, Ordering::Relaxed);

    let elapsed = result.elapsed_ns();
    header.total_time.fetch_add(elapsed, Ordering::Relaxed);

    let adjusted = elapsed.saturating_sub(header.overhead);
    if adjusted < 100 * header.resolution {
        header.quant.fetch_add(1, Ordering::Relaxed);
    }

    let ns_per_call = if result.count > 0 {
        (adjusted as f64 / result.count as f64).round() as i64
    } else {
        0
    };

    let batches = header.batches.load(Ordering::Relaxed);
    let idx = (batches % header.datasize) as usize;
    unsafe {
        data.add(idx).write(ns_per_call);
    }
    header.batches.store(batches + 1, Ordering::Relaxed);
}

/// Evaluated by the last arriver at a rendezvous that carried a `Result`.
/// Mirrors `barrier_queue`'s deadline/min-runtime check.
pub(crate) fn decide_termination(header: &Header, phase: i64) -> i64 {
    if header.deadline > 0 || header.min_runtime > 0 {
        let now = bench_clock::now_ns() as i64;
        let batches = header.batches.load(Ordering::Relaxed);
        let hit_deadline = header.deadline > 0 && now > header.deadline;
        let hit_min_runtime = batches >= header.min_samples as u64 * header.hwm as u64
            && header.min_runtime > 0
            && now > header.min_runtime;
        if hit_deadline || hit_min_runtime {
            return -1;
        }
    }
    phase + 1
}
