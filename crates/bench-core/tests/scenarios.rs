//! End-to-end scenario tests mirroring the harness's documented invariants
//! and usage scenarios. Everything that stays inside one process (no
//! `fork()`) runs as an ordinary `#[test]`. Anything that exercises the
//! multi-process supervisor runs inside a freshly exec'd copy of this test
//! binary instead, dispatched by an environment variable the same way
//! `lithos-icc`'s mmap end-to-end tests isolate multi-process behavior from
//! the (multi-threaded) `cargo test` harness process.

use bench_config::Config;
use bench_plugin::{BatchResult, Plugin, PluginError};
use std::env;
use std::process::Command;
use std::time::Duration;

fn base_config() -> Config {
    Config {
        single_process: true,
        align: false,
        fixed_batch: Some(1),
        min_samples: 100,
        min_duration_ms: 0,
        echo_name: false,
        debug: 0,
        no_header: false,
        nominal_ns: None,
        print_line: false,
        report_mean: false,
        test_name: String::new(),
        overhead_override: Some(0),
        processes: 1,
        resolution_override: Some(1),
        detailed_stats: false,
        threads: 1,
        warnings: false,
        deadline_ms: 0,
    }
}

fn run(config: &Config, plugin: &dyn Plugin) -> bench_core::SupervisorOutcome {
    bench_core::run(config, plugin, config.overhead_override.unwrap_or(0), config.resolution_override.unwrap_or(1))
        .expect("run should succeed")
}

// ---------------------------------------------------------------------
// S1: no-op baseline, single-process, exact batch count.
// ---------------------------------------------------------------------

#[test]
fn s1_noop_baseline_terminates_at_exact_batch_count() {
    let config = Config {
        min_samples: 50,
        ..base_config()
    };
    let outcome = run(&config, &demo_noop::NoopPlugin);
    assert_eq!(outcome.snapshot.batches, 50);
    assert_eq!(outcome.exit_code, 0);
}

// ---------------------------------------------------------------------
// Invariant 8: C=10, D=0, T=P=1 terminates at exactly 10 batches.
// ---------------------------------------------------------------------

#[test]
fn invariant_8_exact_termination_with_no_minimum_duration() {
    let config = Config {
        min_samples: 10,
        min_duration_ms: 0,
        ..base_config()
    };
    let outcome = run(&config, &demo_noop::NoopPlugin);
    assert_eq!(outcome.snapshot.batches, 10);
}

// ---------------------------------------------------------------------
// S2: fixed-cost plug-in, median close to its calibrated ns/op.
// ---------------------------------------------------------------------

#[test]
fn s2_fixed_cost_plugin_median_within_tolerance_of_target() {
    let config = Config {
        min_samples: 300,
        min_duration_ms: 0,
        fixed_batch: None,
        ..base_config()
    };
    let plugin = demo_spin::SpinPlugin { ns_per_op: 2_000 };
    let outcome = run(&config, &plugin);
    let median = outcome.analysis.raw.median as f64;
    let target = plugin.ns_per_op as f64;
    assert!(
        (median - target).abs() < target * 0.5,
        "median {median} too far from target {target}"
    );
}

// ---------------------------------------------------------------------
// Invariant 7: the dynamic batch-size retune grows batch size well past
// its starting value of 1 for a constant-cost plug-in.
// ---------------------------------------------------------------------

#[test]
fn invariant_7_dynamic_batch_size_grows_past_its_starting_value() {
    let config = Config {
        min_samples: 200,
        min_duration_ms: 0,
        fixed_batch: None,
        nominal_ns: None,
        ..base_config()
    };
    let plugin = demo_spin::SpinPlugin { ns_per_op: 50 };
    let outcome = run(&config, &plugin);
    let snap = outcome.snapshot;
    assert!(snap.batches > 0);
    let ops_per_batch = snap.count as f64 / snap.batches as f64;
    assert!(
        ops_per_batch > 10.0,
        "average ops/batch {ops_per_batch} suggests the retune never grew the batch size"
    );
}

// ---------------------------------------------------------------------
// Invariant 9: a hard deadline cuts a slow plug-in off after a few
// batches instead of running to its nominal sample count.
// ---------------------------------------------------------------------

struct SleepPlugin {
    per_batch: Duration,
}

impl Plugin for SleepPlugin {
    fn benchmark(&self, _tsd: &mut [u8], batch_size: u64, result: &mut BatchResult) {
        std::thread::sleep(self.per_batch);
        result.count = batch_size;
        result.errors = 0;
    }
}

#[test]
fn invariant_9_deadline_terminates_a_slow_plugin_early() {
    let config = Config {
        min_samples: 100_000,
        min_duration_ms: 0,
        deadline_ms: 200,
        ..base_config()
    };
    let plugin = SleepPlugin {
        per_batch: Duration::from_millis(50),
    };
    let outcome = run(&config, &plugin);
    assert!(
        (3..=6).contains(&outcome.snapshot.batches),
        "expected roughly 4 batches in 200ms at 50ms/batch, got {}",
        outcome.snapshot.batches
    );
}

// ---------------------------------------------------------------------
// S6: quantization detection. An overhead override larger than the
// plug-in's own cost pushes every sample below the quantization floor.
// ---------------------------------------------------------------------

#[test]
fn s6_quantization_is_flagged_when_overhead_dominates_the_signal() {
    let config = Config {
        min_samples: 80,
        min_duration_ms: 0,
        overhead_override: Some(0),
        resolution_override: Some(1_000_000),
        ..base_config()
    };
    let outcome = run(&config, &demo_noop::NoopPlugin);
    assert!(
        outcome.snapshot.quant > 0,
        "expected a coarse resolution override to flag every batch as quantized"
    );
}

// ---------------------------------------------------------------------
// Multi-process scenarios: isolated in a freshly exec'd child process so
// the `fork()` calls inside the supervisor never run inside the
// multi-threaded test harness process itself.
// ---------------------------------------------------------------------

const ROLE_VAR: &str = "BENCH_CORE_E2E_ROLE";

fn self_spawn(role: &str) -> std::process::Output {
    let exe = env::current_exe().expect("current_exe");
    Command::new(exe)
        .arg("--exact")
        .arg("multi_process_dispatch")
        .arg("--nocapture")
        .env(ROLE_VAR, role)
        .output()
        .expect("failed to spawn self for multi-process test")
}

/// Dispatch target for the self-spawned child. A no-op when run directly
/// by the normal test harness (the environment variable is unset).
#[test]
fn multi_process_dispatch() {
    let Ok(role) = env::var(ROLE_VAR) else {
        return;
    };
    match role.as_str() {
        "s3" => scenario_s3(),
        "s5" => scenario_s5(),
        other => panic!("unknown multi-process test role: {other}"),
    }
}

/// S3: two processes of four threads each, enough batches to exercise
/// repeated rendezvous, and a clean exit with no orphaned children.
fn scenario_s3() {
    let config = Config {
        single_process: false,
        processes: 2,
        threads: 4,
        min_samples: 200,
        min_duration_ms: 0,
        fixed_batch: Some(10),
        overhead_override: Some(0),
        resolution_override: Some(1),
        ..base_config()
    };
    let outcome = run(&config, &demo_noop::NoopPlugin);
    assert!(
        outcome.snapshot.batches >= 200,
        "expected at least 200 aggregated batches, got {}",
        outcome.snapshot.batches
    );
    assert_eq!(outcome.exit_code, 0);
}

/// S5: SIGINT delivered mid-run is observed by the supervisor's signal
/// channel, marks the shared state `Interrupt`, and yields a nonzero exit
/// code while still producing a statistics snapshot.
fn scenario_s5() {
    let mut mask = nix::sys::signal::SigSet::empty();
    mask.add(nix::sys::signal::Signal::SIGINT);
    mask.add(nix::sys::signal::Signal::SIGALRM);
    mask.add(nix::sys::signal::Signal::SIGCHLD);
    mask.add(nix::sys::signal::Signal::SIGHUP);
    mask.add(nix::sys::signal::Signal::SIGTERM);
    mask.add(nix::sys::signal::Signal::SIGQUIT);
    nix::sys::signal::sigprocmask(nix::sys::signal::SigmaskHow::SIG_BLOCK, Some(&mask), None)
        .expect("sigprocmask");

    std::thread::spawn(|| {
        std::thread::sleep(Duration::from_millis(300));
        let _ = nix::sys::signal::kill(nix::unistd::Pid::this(), nix::sys::signal::Signal::SIGINT);
    });

    let config = Config {
        single_process: false,
        processes: 1,
        threads: 1,
        min_samples: 100_000,
        min_duration_ms: 0,
        fixed_batch: Some(1),
        ..base_config()
    };
    let plugin = SleepPlugin {
        per_batch: Duration::from_millis(50),
    };
    let outcome = run(&config, &plugin);

    assert_eq!(outcome.snapshot.killed, bench_ipc::Killed::Interrupt as i32);
    assert_ne!(outcome.exit_code, 0);
}

#[test]
fn s3_multi_process_rendezvous_completes_cleanly() {
    let output = self_spawn("s3");
    assert!(
        output.status.success(),
        "child exited with {:?}\nstdout:\n{}\nstderr:\n{}",
        output.status.code(),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn s5_interrupt_marks_run_killed_and_exits_nonzero() {
    let output = self_spawn("s5");
    assert!(
        output.status.success(),
        "child exited with {:?}\nstdout:\n{}\nstderr:\n{}",
        output.status.code(),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

// ---------------------------------------------------------------------
// Plug-in error propagation: `initrun` failing should abort the run
// before any worker thread starts.
// ---------------------------------------------------------------------

struct FailingInitrunPlugin;

impl Plugin for FailingInitrunPlugin {
    fn initrun(&self) -> Result<(), PluginError> {
        Err(PluginError::Setup("deliberate failure".into()))
    }

    fn benchmark(&self, _tsd: &mut [u8], batch_size: u64, result: &mut BatchResult) {
        result.count = batch_size;
        result.errors = 0;
    }
}

#[test]
fn initrun_failure_prevents_the_run_from_starting() {
    let config = base_config();
    let result = bench_core::run(&config, &FailingInitrunPlugin, 0, 1);
    assert!(result.is_err());
}
