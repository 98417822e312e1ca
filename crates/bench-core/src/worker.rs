//! The measurement loop run by every worker thread (C6): align, rendezvous,
//! time one batch, rendezvous with the result, retune, repeat.

use bench_ipc::{BatchResult, SharedState};
use bench_plugin::Plugin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::error::CoreError;

const ALIGN_INTERVAL_NS: u64 = 75_000_000;
const ALIGN_POLL: Duration = Duration::from_millis(10);

pub struct WorkerConfig {
    pub align: bool,
    pub dynamic_batch: bool,
    /// Thread 0 of each process is the one that recomputes the process-local
    /// batch size during a retune round.
    pub is_default: bool,
}

/// Runs one worker thread to completion. Returns the fatal-error tally
/// folded from `initworker`/`finibatch`/`finiworker`, used by the owning
/// process to decide its own exit status.
pub fn run(
    plugin: &dyn Plugin,
    tsd: &mut [u8],
    shared: &SharedState,
    batch_size: &AtomicU64,
    cfg: &WorkerConfig,
) -> Result<u32, CoreError> {
    let mut fatal_errors = plugin.initworker(tsd);
    let mut last_align = bench_clock::now_ns();

    loop {
        let init_errors = plugin.initbatch(tsd);

        if cfg.align {
            clock_align(&mut last_align);
        }

        shared.enter(None)?;

        let size = batch_size.load(Ordering::Relaxed).max(1);
        let t_begin = bench_clock::now_ns();
        let mut result = BatchResult {
            count: 0,
            errors: 0,
            t_begin,
            t_end: 0,
        };
        plugin.benchmark(tsd, size, &mut result);
        result.t_end = bench_clock::now_ns();
        result.errors = result.errors.saturating_add(init_errors);

        let terminal = shared.enter(Some(result))?;

        fatal_errors = fatal_errors.saturating_add(plugin.finibatch(tsd));

        if cfg.dynamic_batch {
            shared.enter(None)?;
            if cfg.is_default {
                let mean = shared.recent_mean();
                let next = if mean > 0.0 && mean < 1_000_000.0 {
                    (1_000_000.0 / mean).round().max(1.0) as u64
                } else {
                    1
                };
                batch_size.store(next, Ordering::Relaxed);
            }
            shared.enter(None)?;
        }

        if terminal {
            break;
        }
    }

    fatal_errors = fatal_errors.saturating_add(plugin.finiworker(tsd));
    Ok(fatal_errors)
}

/// Sleeps once if ≥75ms have passed since the last alignment, nudging every
/// worker onto the same coarse tick before the next timed batch starts.
fn clock_align(last_align: &mut u64) {
    let now = bench_clock::now_ns();
    if now.saturating_sub(*last_align) >= ALIGN_INTERVAL_NS {
        std::thread::sleep(ALIGN_POLL);
        *last_align = bench_clock::now_ns();
    }
}
