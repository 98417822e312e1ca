//! The measurement-engine binary: parses the flag table, calibrates the
//! clock, runs the supervisor against a compiled-in plug-in, and prints the
//! report. Which plug-in is linked in is a build-time choice (`plugin-noop`
//! / `plugin-spin` features), following the original's plug-ins as separate
//! compilation units linked against the framework.

use bench_config::{Cli, Config, Parser};
use bench_plugin::Plugin;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[cfg(all(feature = "plugin-noop", feature = "plugin-spin"))]
compile_error!("microbench: enable exactly one of `plugin-noop` or `plugin-spin`");
#[cfg(not(any(feature = "plugin-noop", feature = "plugin-spin")))]
compile_error!("microbench: enable one of `plugin-noop` or `plugin-spin`");

#[cfg(feature = "plugin-noop")]
fn make_plugin() -> Box<dyn Plugin> {
    Box::new(demo_noop::NoopPlugin)
}

#[cfg(feature = "plugin-spin")]
fn make_plugin() -> Box<dyn Plugin> {
    Box::new(demo_spin::SpinPlugin::default())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.usage {
        bench_config::print_usage();
        return ExitCode::from(0);
    }

    let config = match Config::from_cli(cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("microbench: {e}");
            return ExitCode::from(1);
        }
    };

    let default_level = match config.debug {
        0 => "WARN",
        1..=3 => "INFO",
        4..=6 => "DEBUG",
        _ => "TRACE",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    if config.print_line {
        println!("{}", std::env::args().collect::<Vec<_>>().join(" "));
    }
    if config.echo_name {
        eprintln!("{}", config.test_name);
    }

    if let Err(e) = bench_clock::init() {
        eprintln!("microbench: {e}");
        return ExitCode::from(1);
    }

    let plugin = make_plugin();
    if let Err(e) = plugin.init() {
        eprintln!("microbench: plug-in init failed: {e}");
        return ExitCode::from(1);
    }

    let overhead = config
        .overhead_override
        .unwrap_or_else(bench_calibrate::measure_overhead);
    let resolution = config
        .resolution_override
        .unwrap_or_else(bench_calibrate::measure_resolution);

    let outcome = match bench_core::run(&config, plugin.as_ref(), overhead, resolution) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("microbench: {e}");
            return ExitCode::from(1);
        }
    };

    let report = bench_report::report(
        &outcome.samples[..outcome.analysis.batches_final],
        &outcome.analysis,
        &config,
        &bench_report::RunSummary {
            snapshot: outcome.snapshot,
            plugin_result: plugin.result(),
            resolution,
            batch_size: config.initial_batch_size(),
        },
    );

    print_report(&report);

    ExitCode::from(outcome.exit_code.clamp(0, 255) as u8)
}

fn print_report(report: &bench_report::Report) {
    if let Some(header) = &report.header_line {
        println!("{header}");
    }
    println!("{}", report.data_line);

    if let Some(block) = &report.stats_block {
        println!("# outliers removed: {}", block.outliers);
        println!("# {:<10} {:>16} {:>16}", "stat", "raw", "corrected");
        for row in &block.rows {
            println!("# {:<10} {:>16.3} {:>16.3}", row.name, row.raw, row.corrected);
        }
        if block.histogram.no_valid_data {
            println!("# histogram: no valid data");
        } else {
            for bucket in &block.histogram.buckets {
                println!("# [{:>10}, {:>10}) {}", bucket.lower, bucket.upper, bucket.count);
            }
            println!("# >v95: {}", block.histogram.above_v95);
        }
    }

    for warning in &report.warnings {
        println!("# warning: {warning}");
    }
}
