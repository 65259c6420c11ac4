use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use golf_standings::args::{AppMode, Cli, load_config};
use golf_standings::model::{PriorPlayoffScores, SeasonSnapshot, TournamentSnapshot};
use golf_standings::runner::Runner;
use golf_standings::storage::FileStorage;
use golf_standings::{score_tournament, season_standings};

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse {}", path.display()))
}

fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let body = serde_json::to_string_pretty(value).context("encode output")?;
    match output {
        Some(path) => fs::write(path, body).with_context(|| format!("write {}", path.display())),
        None => {
            println!("{body}");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config(Cli::parse())?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    match config.mode {
        AppMode::Score {
            snapshot,
            prior,
            output,
        } => {
            let snapshot: TournamentSnapshot = read_json(&snapshot)?;
            let prior: PriorPlayoffScores = match prior {
                Some(path) => read_json(&path)?,
                None => PriorPlayoffScores::default(),
            };
            let outcome = score_tournament(&snapshot, &prior, &config.engine)?;
            write_json(&outcome, output.as_deref())?;
        }
        AppMode::Standings { season, output } => {
            let season: SeasonSnapshot = read_json(&season)?;
            let outcome = season_standings(&season, &config.engine);
            write_json(&outcome, output.as_deref())?;
        }
        AppMode::Watch { data_dir, interval } => {
            info!(data_dir = %data_dir.display(), interval_secs = interval.as_secs(), "watching");
            let runner = Runner::new(Arc::new(FileStorage::new(data_dir)), config.engine);
            runner
                .watch(interval, async {
                    let _ = tokio::signal::ctrl_c().await;
                })
                .await;
        }
    }
    Ok(())
}
