//! The reporter (C8): turns a finalized run's statistics into the
//! line-oriented text format, computed here as owned data so a caller can
//! either print it or assert against it directly.

use bench_config::Config;
use bench_ipc::{Killed, Snapshot};
use bench_stats::Analysis;

mod histogram;
mod warnings;

pub use histogram::{Histogram, HistogramBucket};

/// Everything about a finished run that isn't already in `Config` or
/// `Analysis`: the raw counters and the plug-in's own result string.
pub struct RunSummary {
    pub snapshot: Snapshot,
    pub plugin_result: String,
    /// The calibrated clock resolution in nanoseconds, needed by the
    /// quantization warning's suggested-batch-size-factor heuristic.
    pub resolution: u64,
    /// The batch size in effect at the end of the run, used by the same
    /// heuristic. Dynamic re-tuning makes this a per-thread, per-moment
    /// value; the configured/initial size is used as the nearest
    /// whole-run equivalent.
    pub batch_size: u64,
}

/// One row of the stats block: a statistic name plus its raw and
/// outlier-corrected values.
pub struct StatRow {
    pub name: &'static str,
    pub raw: f64,
    pub corrected: f64,
}

pub struct StatsBlock {
    pub rows: Vec<StatRow>,
    pub outliers: usize,
    pub histogram: Histogram,
}

pub struct Report {
    pub header_line: Option<String>,
    pub data_line: String,
    pub stats_block: Option<StatsBlock>,
    pub warnings: Vec<String>,
}

/// `samples` must be the sorted, outlier-corrected prefix produced by
/// `bench_stats::analyze` (i.e. `&sorted_data[..analysis.batches_final]`).
pub fn report(samples: &[i64], analysis: &Analysis, config: &Config, summary: &RunSummary) -> Report {
    let display_value = if config.report_mean {
        analysis.corrected.mean
    } else {
        analysis.corrected.median as f64
    };

    let ops_per_sample = if summary.snapshot.batches > 0 {
        summary.snapshot.count / summary.snapshot.batches
    } else {
        0
    };

    let data_line = format!(
        "{} {} {} {:.0} {} {} {} {}",
        config.test_name,
        config.processes,
        config.threads,
        display_value.round(),
        summary.snapshot.batches,
        summary.snapshot.errors,
        ops_per_sample,
        summary.plugin_result,
    );

    let header_line = (!config.no_header).then(|| {
        "name P T nsec/call samples errors ops/sample result".to_string()
    });

    let stats_block = config.detailed_stats.then(|| StatsBlock {
        rows: vec![
            StatRow {
                name: "min",
                raw: analysis.raw.min as f64,
                corrected: analysis.corrected.min as f64,
            },
            StatRow {
                name: "max",
                raw: analysis.raw.max as f64,
                corrected: analysis.corrected.max as f64,
            },
            StatRow {
                name: "mean",
                raw: analysis.raw.mean,
                corrected: analysis.corrected.mean,
            },
            StatRow {
                name: "median",
                raw: analysis.raw.median as f64,
                corrected: analysis.corrected.median as f64,
            },
            StatRow {
                name: "stddev",
                raw: analysis.raw.stddev,
                corrected: analysis.corrected.stddev,
            },
            StatRow {
                name: "stderr",
                raw: analysis.raw.stderr,
                corrected: analysis.corrected.stderr,
            },
            StatRow {
                name: "ci99",
                raw: analysis.raw.ci99,
                corrected: analysis.corrected.ci99,
            },
            StatRow {
                name: "skew",
                raw: analysis.raw.skew,
                corrected: analysis.corrected.skew,
            },
            StatRow {
                name: "kurtosis",
                raw: analysis.raw.kurtosis,
                corrected: analysis.corrected.kurtosis,
            },
        ],
        outliers: analysis.outliers,
        histogram: histogram::build(samples),
    });

    let warns = if config.warnings {
        warnings::collect(analysis, config, summary)
    } else {
        Vec::new()
    };

    Report {
        header_line,
        data_line,
        stats_block,
        warnings: warns,
    }
}

/// `killed` is the raw `Snapshot::killed` discriminant (`Killed`'s `repr(i32)`
/// values: 0 = none, 1 = long, 2 = interrupt).
pub(crate) fn killed_message(killed: i32) -> Option<&'static str> {
    match killed {
        1 => Some("run was killed: exceeded its hard deadline"),
        2 => Some("run was killed: interrupted"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bench_config::{Cli, Parser};

    fn config() -> Config {
        Config::from_cli(Cli::parse_from(["microbench"])).unwrap()
    }

    fn summary(batches: u64, count: u64, errors: u64) -> RunSummary {
        RunSummary {
            snapshot: Snapshot {
                batches,
                count,
                errors,
                total_time: 0,
                quant: 0,
                start_time: 0,
                end_time: 0,
                killed: Killed::None as i32,
            },
            plugin_result: String::new(),
            resolution: 1,
            batch_size: 1,
        }
    }

    #[test]
    fn data_line_has_eight_fields() {
        let mut data: Vec<i64> = (1..=200).collect();
        let analysis = bench_stats::analyze(&mut data);
        let cfg = config();
        let rep = report(&data[..analysis.batches_final], &analysis, &cfg, &summary(200, 200, 0));
        assert_eq!(rep.data_line.split_whitespace().count(), 8);
    }

    #[test]
    fn no_header_flag_suppresses_header_line() {
        let mut data: Vec<i64> = (1..=100).collect();
        let analysis = bench_stats::analyze(&mut data);
        let cfg = Config::from_cli(Cli::parse_from(["microbench", "-H"])).unwrap();
        let rep = report(&data[..analysis.batches_final], &analysis, &cfg, &summary(100, 100, 0));
        assert!(rep.header_line.is_none());
    }

    #[test]
    fn stats_block_only_emitted_when_requested() {
        let mut data: Vec<i64> = (1..=100).collect();
        let analysis = bench_stats::analyze(&mut data);
        let cfg = config();
        let rep = report(&data[..analysis.batches_final], &analysis, &cfg, &summary(100, 100, 0));
        assert!(rep.stats_block.is_none());

        let cfg = Config::from_cli(Cli::parse_from(["microbench", "-S"])).unwrap();
        let rep = report(&data[..analysis.batches_final], &analysis, &cfg, &summary(100, 100, 0));
        assert!(rep.stats_block.is_some());
    }
}
