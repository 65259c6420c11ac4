use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::EngineConfig;

#[derive(Parser, Debug)]
#[command(author, version, about = "Fantasy golf team scoring and season standings", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
    /// Optional TOML file; command-line values win over it.
    #[arg(long, global = true, value_name = "CONFIG_TOML", value_parser = crate::args::validation::check_readable_file)]
    pub config_toml: Option<PathBuf>,
    /// Log filter, e.g. `info` or `golf_standings=debug`. `RUST_LOG` wins over it.
    #[arg(long, global = true, value_name = "FILTER")]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score one tournament snapshot.
    Score {
        #[arg(long, value_name = "SNAPSHOT_JSON", value_parser = crate::args::validation::check_readable_json)]
        snapshot: PathBuf,
        /// Final scores of the previous playoff leg, keyed by tour card id.
        #[arg(long, value_name = "PRIOR_JSON", value_parser = crate::args::validation::check_readable_json)]
        prior: Option<PathBuf>,
        /// Defaults to stdout.
        #[arg(long, value_name = "OUTPUT_JSON")]
        output: Option<PathBuf>,
    },
    /// Roll up a season's completed results into standings.
    Standings {
        #[arg(long, value_name = "SEASON_JSON", value_parser = crate::args::validation::check_readable_json)]
        season: PathBuf,
        #[arg(long, value_name = "OUTPUT_JSON")]
        output: Option<PathBuf>,
    },
    /// Re-run every tournament and season in a data directory on an interval.
    Watch {
        #[arg(long, value_name = "DATA_DIR")]
        data_dir: Option<PathBuf>,
        #[arg(long, value_name = "SECONDS", value_parser = crate::args::validation::check_interval_secs)]
        interval_secs: Option<u64>,
    },
}

/// Contents of `--config-toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct FileConfig {
    pub(crate) log_level: Option<String>,
    pub(crate) data_dir: Option<PathBuf>,
    pub(crate) interval_secs: Option<u64>,
    #[serde(default)]
    pub(crate) engine: EngineConfig,
}

#[derive(Debug, Clone)]
pub enum AppMode {
    Score {
        snapshot: PathBuf,
        prior: Option<PathBuf>,
        output: Option<PathBuf>,
    },
    Standings {
        season: PathBuf,
        output: Option<PathBuf>,
    },
    Watch {
        data_dir: PathBuf,
        interval: Duration,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mode: AppMode,
    pub log_level: String,
    pub engine: EngineConfig,
}
