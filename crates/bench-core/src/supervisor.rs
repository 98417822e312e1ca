//! The top-level run orchestrator (C7). Calibration and option parsing have
//! already happened by the time `run` is called; this assembles the shared
//! state, spawns the worker process(es), drives the multi-process signal/
//! reap loop, and produces the final statistics.

use crate::error::CoreError;
use crate::process;
use crate::timer::DeadlineTimer;
use bench_config::Config;
use bench_ipc::{Killed, SharedState, Setup, TsdSegment};
use bench_plugin::Plugin;
use nix::sys::signal::{kill, sigprocmask, SigSet, Signal, SigmaskHow};
use nix::sys::signalfd::{SfdFlags, SignalFd};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{fork, ForkResult, Pid};
use std::io;
use tracing::{info, warn};

/// 60s of slack past the run's own deadline before the watchdog fires,
/// matching the original's `-X + 60s` alarm arming.
const WATCHDOG_SLACK_NS: i64 = 60_000_000_000;

pub struct SupervisorOutcome {
    pub analysis: bench_stats::Analysis,
    /// The sorted sample set `analyze` ran over; the outlier-corrected
    /// prefix is `samples[..analysis.batches_final]`.
    pub samples: Vec<i64>,
    pub snapshot: bench_ipc::Snapshot,
    pub exit_code: i32,
}

pub fn run(config: &Config, plugin: &dyn Plugin, overhead: u64, resolution: u64) -> Result<SupervisorOutcome, CoreError> {
    plugin.initrun()?;

    raise_fd_limit();

    let hwm = config.hwm();
    let tsd = TsdSegment::create(hwm as usize, plugin.tsd_size())?;

    let start_time = bench_clock::now_ns() as i64;
    let min_runtime = start_time + config.min_duration_ms * 1_000_000;
    let deadline = if config.deadline_ms > 0 {
        start_time + config.deadline_ms * 1_000_000
    } else if config.min_samples <= 0 {
        min_runtime
    } else {
        0
    };

    let shared = SharedState::create(Setup {
        hwm,
        min_samples: config.min_samples.max(0) as u32,
        overhead,
        resolution,
        min_runtime,
        deadline,
        start_time,
    })?;

    let dynamic_batch = config.dynamic_batch();
    let initial_batch_size = config.initial_batch_size();

    let exit_code = if config.single_process {
        info!(processes = 1, threads = config.threads, "running single-process");
        let fatal = process::run_process_threads(
            plugin,
            &shared,
            &tsd,
            0,
            config.threads,
            config.align,
            dynamic_batch,
            initial_batch_size,
        );
        if fatal > 0 {
            1
        } else {
            0
        }
    } else {
        info!(processes = config.processes, threads = config.threads, "running multi-process");
        run_multi_process(config, plugin, &shared, &tsd, deadline, dynamic_batch, initial_batch_size)?
    };

    shared.mark_end_time(bench_clock::now_ns() as i64);

    let mut data = shared.data_copy();
    let analysis = bench_stats::analyze(&mut data);
    let snapshot = shared.snapshot();

    if let Err(e) = plugin.finirun() {
        warn!(error = %e, "finirun failed");
    }

    drop(tsd);
    drop(shared);

    let exit_code = match plugin.fini() {
        Ok(()) => exit_code,
        Err(e) => {
            warn!(error = %e, "fini failed");
            exit_code.max(1)
        }
    };

    Ok(SupervisorOutcome {
        analysis,
        samples: data,
        snapshot,
        exit_code,
    })
}

fn run_multi_process(
    config: &Config,
    plugin: &dyn Plugin,
    shared: &SharedState,
    tsd: &TsdSegment,
    deadline: i64,
    dynamic_batch: bool,
    initial_batch_size: u64,
) -> Result<i32, CoreError> {
    let mut mask = SigSet::empty();
    for sig in [
        Signal::SIGALRM,
        Signal::SIGCHLD,
        Signal::SIGINT,
        Signal::SIGHUP,
        Signal::SIGTERM,
        Signal::SIGQUIT,
    ] {
        mask.add(sig);
    }
    sigprocmask(SigmaskHow::SIG_BLOCK, Some(&mask), None).map_err(nix_err)?;
    let mut signal_fd = SignalFd::with_flags(&mask, SfdFlags::empty()).map_err(nix_err)?;

    let mut children: Vec<Pid> = Vec::with_capacity(config.processes as usize);
    for p in 0..config.processes {
        match unsafe { fork() }.map_err(nix_err)? {
            ForkResult::Child => {
                process::run_forked(
                    plugin,
                    shared,
                    tsd,
                    p,
                    config.threads,
                    config.align,
                    dynamic_batch,
                    initial_batch_size,
                );
            }
            ForkResult::Parent { child } => {
                children.push(child);
            }
        }
    }

    let _timer = if deadline > 0 {
        Some(DeadlineTimer::arm(deadline + WATCHDOG_SLACK_NS)?)
    } else {
        None
    };

    let mut exit_code = 0i32;

    while !children.is_empty() {
        let signo = match signal_fd.read_signal().map_err(nix_err)? {
            Some(info) => info.ssi_signo as i32,
            None => continue,
        };

        if signo == libc::SIGALRM {
            info!("deadline watchdog fired, killing remaining children");
            shared.mark_killed(Killed::Long);
            kill_all(&children, Signal::SIGKILL);
        } else if signo == libc::SIGCHLD {
            reap_children(&mut children, &mut exit_code);
        } else if signo == libc::SIGINT {
            warn!("interrupted, killing remaining children");
            shared.mark_killed(Killed::Interrupt);
            kill_all(&children, Signal::SIGKILL);
            exit_code = exit_code.max(1);
        } else if signo == libc::SIGHUP || signo == libc::SIGTERM || signo == libc::SIGQUIT {
            warn!(signo, "terminating signal received, killing remaining children");
            shared.mark_killed(Killed::Interrupt);
            kill_all(&children, Signal::SIGKILL);
            exit_code = exit_code.max(1);
        }
    }

    Ok(exit_code)
}

fn reap_children(children: &mut Vec<Pid>, exit_code: &mut i32) {
    loop {
        match waitpid(None, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::Exited(pid, status)) => {
                children.retain(|&c| c != pid);
                if status != 0 {
                    *exit_code = (*exit_code).max(status);
                }
            }
            Ok(WaitStatus::Signaled(pid, _, _)) => {
                children.retain(|&c| c != pid);
                *exit_code = (*exit_code).max(1);
            }
            Ok(WaitStatus::StillAlive) => break,
            Err(_) => break,
            _ => continue,
        }
        if children.is_empty() {
            break;
        }
    }
}

fn kill_all(children: &[Pid], sig: Signal) {
    for &pid in children {
        let _ = kill(pid, sig);
    }
}

fn nix_err(e: nix::errno::Errno) -> CoreError {
    CoreError::Io(io::Error::from(e))
}

/// `setfdlimit`: raises `RLIMIT_NOFILE` to its hard maximum before forking
/// so `P*T` workers opening per-thread resources don't exhaust descriptors.
/// Best-effort; a failure here is not fatal.
fn raise_fd_limit() {
    unsafe {
        let mut lim: libc::rlimit = std::mem::zeroed();
        if libc::getrlimit(libc::RLIMIT_NOFILE, &mut lim) == 0 {
            lim.rlim_cur = lim.rlim_max;
            libc::setrlimit(libc::RLIMIT_NOFILE, &lim);
        }
    }
}
