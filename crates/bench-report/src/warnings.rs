//! The `-W` warning heuristics (C8).

use crate::{killed_message, RunSummary};
use bench_config::Config;
use bench_stats::Analysis;

pub fn collect(analysis: &Analysis, config: &Config, summary: &RunSummary) -> Vec<String> {
    let mut out = Vec::new();
    let snap = &summary.snapshot;

    if snap.quant > 0 {
        let median_us = analysis.corrected.median as f64 / 1000.0;
        let denom = summary.batch_size as f64 * median_us * 1000.0;
        let factor = if denom > 0.0 {
            ((summary.resolution as f64 * 100.0 / denom).floor() + 1.0) as i64
        } else {
            1
        };
        out.push(format!(
            "quantization error likely ({} batches affected); consider a batch size at least {factor}x larger",
            snap.quant
        ));
    }

    if snap.batches < 100 {
        out.push(format!("too few samples: only {} batches recorded", snap.batches));
    }

    if !config.report_mean {
        let dist = (analysis.corrected.mean - analysis.corrected.median as f64).abs();
        if dist > analysis.corrected.stddev / 2.0 {
            out.push("mean and median diverge by more than half a standard deviation".to_string());
        }
    }

    if config.hwm() == 1 {
        let wall = (snap.end_time - snap.start_time) as f64;
        if wall > 0.0 && (snap.total_time as f64 / wall) < 0.8 {
            out.push("less than 80% of wall-clock time was spent inside the benchmark".to_string());
        }
    }

    if let Some(msg) = killed_message(snap.killed) {
        out.push(msg.to_string());
    }
    if snap.errors > 0 {
        out.push(format!("{} errors reported during the run", snap.errors));
    }

    out
}
