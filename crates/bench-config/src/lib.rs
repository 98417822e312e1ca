//! Command-line and config-file parsing for the measurement engine: the
//! flag table translated into a validated, immutable [`Config`].

mod cli;
mod config;
mod error;
mod file_defaults;
mod units;

pub use cli::{print_usage, Cli};
pub use clap::Parser;
pub use config::Config;
pub use error::ConfigError;
pub use units::parse_sized_int;

impl Config {
    pub fn parse() -> Result<Self, ConfigError> {
        let cli = Cli::parse();
        Config::from_cli(cli)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_table() {
        let cli = Cli::parse_from(["microbench"]);
        let cfg = Config::from_cli(cli).unwrap();
        assert_eq!(cfg.min_samples, 100);
        assert_eq!(cfg.min_duration_ms, 10_000);
        assert_eq!(cfg.processes, 1);
        assert_eq!(cfg.threads, 1);
        assert_eq!(cfg.deadline_ms, 0);
        assert!(cfg.dynamic_batch());
    }

    #[test]
    fn single_process_flag_forces_one_process() {
        let cli = Cli::parse_from(["microbench", "-1", "-P", "4"]);
        let cfg = Config::from_cli(cli).unwrap();
        assert_eq!(cfg.processes, 1);
    }

    #[test]
    fn fixed_batch_disables_dynamic_tuning() {
        let cli = Cli::parse_from(["microbench", "-B", "1000"]);
        let cfg = Config::from_cli(cli).unwrap();
        assert!(!cfg.dynamic_batch());
        assert_eq!(cfg.initial_batch_size(), 1000);
    }

    #[test]
    fn suffixed_batch_size_parses_as_binary_unit() {
        let cli = Cli::parse_from(["microbench", "-B", "1k"]);
        let cfg = Config::from_cli(cli).unwrap();
        assert_eq!(cfg.initial_batch_size(), 1024);
    }

    #[test]
    fn deadline_below_min_duration_is_ignored() {
        let cli = Cli::parse_from(["microbench", "-D", "1000", "-X", "500"]);
        let cfg = Config::from_cli(cli).unwrap();
        assert_eq!(cfg.deadline_ms, 0);
    }

    #[test]
    fn warnings_flag_implies_detailed_stats() {
        let cli = Cli::parse_from(["microbench", "-W"]);
        let cfg = Config::from_cli(cli).unwrap();
        assert!(cfg.detailed_stats);
    }
}
