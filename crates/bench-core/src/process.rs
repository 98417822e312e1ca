//! The per-process entry point (§4.7's "worker-process routine"): the main
//! thread becomes thread index 0, `T-1` more threads are spawned, each
//! against its own TSD slot, scoped so no `'static` bound is needed across
//! the fork boundary.

use crate::worker::{self, WorkerConfig};
use bench_ipc::{SharedState, TsdSegment};
use bench_plugin::Plugin;
use std::sync::atomic::AtomicU64;

/// Runs every thread of one worker process to completion and returns the
/// summed fatal-error tally.
pub fn run_process_threads(
    plugin: &dyn Plugin,
    shared: &SharedState,
    tsd: &TsdSegment,
    process_index: u32,
    threads: u32,
    align: bool,
    dynamic_batch: bool,
    initial_batch_size: u64,
) -> u32 {
    let batch_size = AtomicU64::new(initial_batch_size);

    std::thread::scope(|scope| {
        let batch_size = &batch_size;
        let mut handles = Vec::with_capacity(threads.saturating_sub(1) as usize);
        for t in 1..threads {
            let slot = process_index * threads + t;
            handles.push(scope.spawn(move || {
                let tsd_slot = unsafe { tsd.slot(slot as usize) };
                let cfg = WorkerConfig {
                    align,
                    dynamic_batch,
                    is_default: false,
                };
                worker::run(plugin, tsd_slot, shared, batch_size, &cfg)
            }));
        }

        let main_slot = (process_index * threads) as usize;
        let main_tsd = unsafe { tsd.slot(main_slot) };
        let main_cfg = WorkerConfig {
            align,
            dynamic_batch,
            is_default: true,
        };
        let mut fatal = worker::run(plugin, main_tsd, shared, batch_size, &main_cfg).unwrap_or(1);

        for h in handles {
            fatal = fatal.saturating_add(h.join().map(|r| r.unwrap_or(1)).unwrap_or(1));
        }

        fatal
    })
}

/// Entry point for a forked child: runs the process's threads, then exits
/// the process directly so `SharedState`'s `Drop` never runs in a child —
/// matching the original's children never reaching `barrier_destroy`.
pub fn run_forked(
    plugin: &dyn Plugin,
    shared: &SharedState,
    tsd: &TsdSegment,
    process_index: u32,
    threads: u32,
    align: bool,
    dynamic_batch: bool,
    initial_batch_size: u64,
) -> ! {
    let fatal = run_process_threads(
        plugin,
        shared,
        tsd,
        process_index,
        threads,
        align,
        dynamic_batch,
        initial_batch_size,
    );
    std::process::exit(if fatal > 0 { 1 } else { 0 });
}
