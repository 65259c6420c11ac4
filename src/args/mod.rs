pub mod types;
pub mod validation;

pub use types::{AppConfig, AppMode, Cli, Command};

use anyhow::{Context, Result, anyhow};
use std::fs;
use std::time::Duration;

use types::FileConfig;

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_INTERVAL_SECS: u64 = 60;

/// Merge the command line over the optional TOML file over defaults.
///
/// # Errors
/// Returns an error if the config file is unreadable or invalid, or if
/// `watch` has no data directory from either source.
pub fn load_config(cli: Cli) -> Result<AppConfig> {
    let file_config = match cli.config_toml.as_ref() {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("read config toml {}", path.display()))?;
            parse_file_config(&contents).with_context(|| format!("parse config toml {}", path.display()))?
        }
        None => FileConfig::default(),
    };

    let mode = match cli.command {
        Command::Score {
            snapshot,
            prior,
            output,
        } => AppMode::Score {
            snapshot,
            prior,
            output,
        },
        Command::Standings { season, output } => AppMode::Standings { season, output },
        Command::Watch {
            data_dir,
            interval_secs,
        } => {
            let data_dir = data_dir
                .or(file_config.data_dir)
                .ok_or_else(|| anyhow!("missing --data-dir"))?;
            let secs = interval_secs
                .or(file_config.interval_secs)
                .unwrap_or(DEFAULT_INTERVAL_SECS);
            if secs == 0 {
                return Err(anyhow!("interval_secs must be at least 1"));
            }
            AppMode::Watch {
                data_dir,
                interval: Duration::from_secs(secs),
            }
        }
    };

    Ok(AppConfig {
        mode,
        log_level: cli
            .log_level
            .or(file_config.log_level)
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        engine: file_config.engine,
    })
}

fn parse_file_config(contents: &str) -> Result<FileConfig> {
    Ok(toml::from_str::<FileConfig>(contents)?)
}
