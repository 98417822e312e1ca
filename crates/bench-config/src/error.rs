use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("parsing command line: {0}")]
    Cli(#[from] clap::Error),
    #[error("invalid value for -{flag}: {message}")]
    InvalidValue { flag: char, message: String },
}
