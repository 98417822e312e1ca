use crate::cli::Cli;
use crate::error::ConfigError;
use crate::file_defaults::FileDefaults;

const DEF_SAMPLES: i64 = 100;
const DEF_TIME_MS: i64 = 10_000;

/// Immutable, validated configuration built once from the parsed CLI flags
/// (and an optional TOML file supplying defaults for anything not given on
/// the command line). Passed by reference into the supervisor and down
/// into the measurement loop; the only further-mutable cross-worker store
/// is `bench_ipc::SharedState`.
#[derive(Debug, Clone)]
pub struct Config {
    pub single_process: bool,
    pub align: bool,
    pub fixed_batch: Option<u64>,
    pub min_samples: i64,
    pub min_duration_ms: i64,
    pub echo_name: bool,
    pub debug: u8,
    pub no_header: bool,
    pub nominal_ns: Option<u64>,
    pub print_line: bool,
    pub report_mean: bool,
    pub test_name: String,
    pub overhead_override: Option<u64>,
    pub processes: u32,
    pub resolution_override: Option<u64>,
    pub detailed_stats: bool,
    pub threads: u32,
    pub warnings: bool,
    pub deadline_ms: i64,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config_path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
                toml::from_str::<FileDefaults>(&text)?
            }
            None => FileDefaults::default(),
        };

        let single_process = cli.single_process || file.single_process.unwrap_or(false);
        let align = cli.align || file.align.unwrap_or(false);
        let echo_name = cli.echo_name || file.echo_name.unwrap_or(false);
        let no_header = cli.no_header || file.no_header.unwrap_or(false);
        let print_line = cli.print_line || file.print_line.unwrap_or(false);
        let report_mean = cli.mean || file.mean.unwrap_or(false);
        let detailed_stats = cli.detailed_stats || file.detailed_stats.unwrap_or(false);
        let warnings = cli.warnings || file.warnings.unwrap_or(false);

        let fixed_batch = cli
            .batch
            .or(file.batch)
            .map(|v| v.max(1) as u64);
        let auto_tune_disabled_by_nominal = cli.nominal_ns.or(file.nominal_ns).is_some();
        let nominal_ns = cli.nominal_ns.or(file.nominal_ns).map(|v| v.max(0) as u64);

        let processes = if single_process {
            1
        } else {
            cli.processes.or(file.processes).unwrap_or(1).max(1) as u32
        };
        let threads = cli.threads.or(file.threads).unwrap_or(1).max(1) as u32;

        let min_samples = cli.min_samples.or(file.min_samples).unwrap_or(DEF_SAMPLES);
        let mut min_duration_ms = cli
            .min_duration_ms
            .or(file.min_duration_ms)
            .unwrap_or(DEF_TIME_MS);

        if min_samples <= 0 && min_duration_ms <= 0 {
            tracing::warn!(
                min_samples,
                min_duration_ms,
                "both -C and -D are <= 0, defaulting -D to {DEF_TIME_MS}"
            );
            min_duration_ms = DEF_TIME_MS;
        }

        let mut deadline_ms = cli.deadline_ms.or(file.deadline_ms).unwrap_or(0);
        if deadline_ms < 0 {
            tracing::warn!(deadline_ms, "-X < 0, defaulting to 0 (no hard cap)");
            deadline_ms = 0;
        } else if deadline_ms > 0 && deadline_ms < min_duration_ms {
            tracing::warn!(deadline_ms, min_duration_ms, "-X < -D, ignoring -X value");
            deadline_ms = 0;
        }

        let debug = cli.debug.or(file.debug).unwrap_or(0);
        let test_name = cli.name.or(file.name).unwrap_or_default();
        let overhead_override = cli.overhead.or(file.overhead).map(|v| v.max(0) as u64);
        let resolution_override = cli.resolution.or(file.resolution).map(|v| v.max(0) as u64);

        let _ = auto_tune_disabled_by_nominal;

        Ok(Config {
            single_process,
            align,
            fixed_batch,
            min_samples,
            min_duration_ms,
            echo_name,
            debug,
            no_header,
            nominal_ns,
            print_line,
            report_mean,
            test_name,
            overhead_override,
            processes,
            resolution_override,
            detailed_stats: detailed_stats || warnings,
            threads,
            warnings,
            deadline_ms,
        })
    }

    /// `true` unless the user fixed the batch size via `-B` or hinted it
    /// via `-I`, per the measurement loop's re-tune gate.
    pub fn dynamic_batch(&self) -> bool {
        self.fixed_batch.is_none() && self.nominal_ns.is_none()
    }

    pub fn hwm(&self) -> u32 {
        self.processes * self.threads
    }

    /// Initial batch size before any dynamic re-tuning: the fixed value if
    /// given, else derived from the nominal ns/op hint, else 1.
    pub fn initial_batch_size(&self) -> u64 {
        if let Some(b) = self.fixed_batch {
            return b.max(1);
        }
        if let Some(ns) = self.nominal_ns {
            if ns > 0 {
                return (1_000_000 / ns).max(1);
            }
        }
        1
    }
}
