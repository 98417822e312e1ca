use crate::units::parse_sized_int;
use clap::Parser;

fn sized(arg: &str) -> Result<i64, String> {
    parse_sized_int(arg)
}

/// Command-line surface for the measurement engine. Parsed into a
/// validated [`crate::Config`] by [`crate::Config::from_cli`].
#[derive(Debug, Parser)]
#[command(name = "microbench", version, about = "micro-benchmark harness")]
pub struct Cli {
    /// Single-process mode; forces P=1.
    #[arg(short = '1', long = "single-process", action = clap::ArgAction::SetTrue)]
    pub single_process: bool,

    /// Clock-align before each timed batch.
    #[arg(short = 'A', long = "align", action = clap::ArgAction::SetTrue)]
    pub align: bool,

    /// Fixed operations per batch; disables auto-tune.
    #[arg(short = 'B', long = "batch", value_parser = sized)]
    pub batch: Option<i64>,

    /// Minimum number of samples.
    #[arg(short = 'C', long = "min-samples", value_parser = sized)]
    pub min_samples: Option<i64>,

    /// Minimum duration in milliseconds.
    #[arg(short = 'D', long = "min-duration", value_parser = sized)]
    pub min_duration_ms: Option<i64>,

    /// Echo the test name to the diagnostic stream.
    #[arg(short = 'E', long = "echo", action = clap::ArgAction::SetTrue)]
    pub echo_name: bool,

    /// Framework debug verbosity (0-9).
    #[arg(short = 'G', long = "debug", value_parser = clap::value_parser!(u8).range(0..=9))]
    pub debug: Option<u8>,

    /// Suppress the header line.
    #[arg(short = 'H', long = "no-header", action = clap::ArgAction::SetTrue)]
    pub no_header: bool,

    /// Nominal ns/op hint for initial batch sizing; disables auto-tune.
    #[arg(short = 'I', long = "nominal-ns", value_parser = sized)]
    pub nominal_ns: Option<i64>,

    /// Print the invocation line.
    #[arg(short = 'L', long = "print-invocation", action = clap::ArgAction::SetTrue)]
    pub print_line: bool,

    /// Report mean rather than median.
    #[arg(short = 'M', long = "mean", action = clap::ArgAction::SetTrue)]
    pub mean: bool,

    /// Test name.
    #[arg(short = 'N', long = "name")]
    pub name: Option<String>,

    /// Override the measured clock overhead, in nanoseconds.
    #[arg(short = 'O', long = "overhead", value_parser = sized)]
    pub overhead: Option<i64>,

    /// Number of processes.
    #[arg(short = 'P', long = "processes", value_parser = sized)]
    pub processes: Option<i64>,

    /// Override the measured clock resolution, in nanoseconds.
    #[arg(short = 'R', long = "resolution", value_parser = sized)]
    pub resolution: Option<i64>,

    /// Print the detailed stats block.
    #[arg(short = 'S', long = "stats", action = clap::ArgAction::SetTrue)]
    pub detailed_stats: bool,

    /// Threads per process.
    #[arg(short = 'T', long = "threads", value_parser = sized)]
    pub threads: Option<i64>,

    /// Emit warning heuristics (implies -S).
    #[arg(short = 'W', long = "warnings", action = clap::ArgAction::SetTrue)]
    pub warnings: bool,

    /// Hard maximum duration in milliseconds (must exceed -D).
    #[arg(short = 'X', long = "deadline", value_parser = sized)]
    pub deadline_ms: Option<i64>,

    /// Print usage and exit.
    #[arg(short = '?', long = "usage", action = clap::ArgAction::SetTrue)]
    pub usage: bool,

    /// Optional TOML file supplying defaults for any flag not given above.
    #[arg(long = "config")]
    pub config_path: Option<String>,
}

/// Prints the flag table to stdout, matching the original's `usage()`.
/// Callers check `Cli::usage` before ever building a `Config` and exit 0
/// right after, so no framework state needs to exist yet.
pub fn print_usage() {
    use clap::CommandFactory;
    let _ = Cli::command().print_help();
    println!();
}
