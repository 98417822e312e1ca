//! Optional TOML file supplying defaults for any flag not given on the
//! command line, in the shape `obsidian-config` uses for its own
//! `#[serde(default = "...")]` field defaults.

use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
pub struct FileDefaults {
    pub single_process: Option<bool>,
    pub align: Option<bool>,
    pub batch: Option<i64>,
    pub min_samples: Option<i64>,
    pub min_duration_ms: Option<i64>,
    pub echo_name: Option<bool>,
    pub debug: Option<u8>,
    pub no_header: Option<bool>,
    pub nominal_ns: Option<i64>,
    pub print_line: Option<bool>,
    pub mean: Option<bool>,
    pub name: Option<String>,
    pub overhead: Option<i64>,
    pub processes: Option<i64>,
    pub resolution: Option<i64>,
    pub detailed_stats: Option<bool>,
    pub threads: Option<i64>,
    pub warnings: Option<bool>,
    pub deadline_ms: Option<i64>,
}
