use ahash::AHashMap;
use futures::future::join_all;
use std::collections::BTreeSet;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::EngineConfig;
use crate::engine::{RunOutcome, SkipReason, score_tournament};
use crate::error::EngineError;
use crate::model::{StandingUpdate, TeamRecord, TeamUpdate, TournamentSnapshot};
use crate::standings::season_standings;
use crate::storage::Storage;

pub type TournamentRun = Result<RunOutcome<Vec<TeamUpdate>>, EngineError>;
pub type StandingsRun = Result<RunOutcome<Vec<StandingUpdate>>, EngineError>;

/// Marks a tournament id as running until dropped.
struct RunClaim<'a> {
    active: &'a Mutex<BTreeSet<i64>>,
    tournament_id: i64,
}

impl<'a> RunClaim<'a> {
    fn acquire(active: &'a Mutex<BTreeSet<i64>>, tournament_id: i64) -> Result<Self, EngineError> {
        let mut ids = active.lock().unwrap_or_else(PoisonError::into_inner);
        if !ids.insert(tournament_id) {
            return Err(EngineError::RunInProgress(tournament_id));
        }
        Ok(Self {
            active,
            tournament_id,
        })
    }
}

impl Drop for RunClaim<'_> {
    fn drop(&mut self) {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.tournament_id);
    }
}

/// Positions stored by the previous run become each roster's starting
/// position, so the next run reports them as `past_position`.
fn carry_positions(snapshot: &mut TournamentSnapshot, previous: &[TeamRecord]) {
    let positions: AHashMap<i64, &str> = previous
        .iter()
        .filter_map(|r| Some((r.team_id, r.position.as_deref()?)))
        .collect();
    for team in &mut snapshot.teams {
        if let Some(position) = positions.get(&team.id) {
            team.position = Some((*position).to_string());
        }
    }
}

/// Drives engine runs against a storage backend: at most one active run per
/// tournament id, any number of tournaments concurrently.
pub struct Runner {
    storage: Arc<dyn Storage>,
    config: EngineConfig,
    active: Mutex<BTreeSet<i64>>,
    max_attempts: u32,
    retry_delay: Duration,
}

impl Runner {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, config: EngineConfig) -> Self {
        Self {
            storage,
            config,
            active: Mutex::new(BTreeSet::new()),
            max_attempts: 3,
            retry_delay: Duration::from_millis(250),
        }
    }

    #[must_use]
    pub fn with_retries(mut self, max_attempts: u32, retry_delay: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.retry_delay = retry_delay;
        self
    }

    /// One full run for a tournament: load, score, persist.
    ///
    /// # Errors
    /// `RunInProgress` if another run holds this tournament id, `Storage` on
    /// backend failures, `MissingReference` on an inconsistent snapshot.
    pub async fn run_tournament(&self, tournament_id: i64) -> TournamentRun {
        let _claim = RunClaim::acquire(&self.active, tournament_id)?;

        let Some(mut snapshot) = self.storage.load_snapshot(tournament_id).await? else {
            info!(tournament_id, "no snapshot, skipping");
            return Ok(RunOutcome::Skipped(SkipReason::NoActiveTournament));
        };
        if snapshot.tournament.id != tournament_id {
            return Err(EngineError::MissingReference(format!(
                "snapshot for tournament {tournament_id} holds tournament {}",
                snapshot.tournament.id
            )));
        }
        let previous = self.storage.load_team_records(tournament_id).await?;
        carry_positions(&mut snapshot, &previous);
        let prior = self.storage.load_prior_playoff_scores(&snapshot).await?;
        debug!(tournament_id, carried = prior.0.len(), "prior playoff scores loaded");

        let config = self.config.clone();
        let outcome = tokio::task::spawn_blocking(move || score_tournament(&snapshot, &prior, &config))
            .await
            .map_err(|e| EngineError::Other(format!("scoring task for tournament {tournament_id} failed: {e}")))??;

        match &outcome {
            RunOutcome::Completed(updates) => {
                let records: Vec<TeamRecord> = updates.iter().map(TeamUpdate::to_record).collect();
                self.storage.store_team_updates(tournament_id, &records).await?;
            }
            RunOutcome::Skipped(reason) => info!(tournament_id, %reason, "tournament run skipped"),
        }
        Ok(outcome)
    }

    /// Recompute and persist season standings.
    ///
    /// # Errors
    /// `Storage` on backend failures.
    pub async fn run_standings(&self, season_id: i64) -> StandingsRun {
        let Some(season) = self.storage.load_season(season_id).await? else {
            info!(season_id, "no season snapshot, skipping");
            return Ok(RunOutcome::Skipped(SkipReason::NoParticipants));
        };
        let outcome = season_standings(&season, &self.config);
        if let RunOutcome::Completed(rows) = &outcome {
            self.storage.store_standings(season_id, rows).await?;
        }
        Ok(outcome)
    }

    /// `run_tournament` with retries for retryable failures. Skips and
    /// fatal errors are returned on the first attempt.
    pub async fn run_with_retry(&self, tournament_id: i64) -> TournamentRun {
        let mut attempt = 1;
        loop {
            match self.run_tournament(tournament_id).await {
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    warn!(tournament_id, attempt, error = %e, "run failed, retrying");
                    tokio::time::sleep(self.retry_delay * attempt).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    /// Run every known tournament concurrently.
    ///
    /// # Errors
    /// Only when the tournament list itself cannot be read; per-tournament
    /// failures are reported in the returned list.
    pub async fn run_all(&self) -> Result<Vec<(i64, TournamentRun)>, EngineError> {
        let ids = self.storage.list_tournaments().await?;
        let runs = ids.iter().map(|&id| async move { (id, self.run_with_retry(id).await) });
        Ok(join_all(runs).await)
    }

    /// One pass of the watch loop: all tournaments, then all seasons.
    ///
    /// # Errors
    /// When the tournament or season list cannot be read.
    pub async fn tick(&self) -> Result<(), EngineError> {
        for (tournament_id, result) in self.run_all().await? {
            match result {
                Ok(RunOutcome::Completed(updates)) => {
                    debug!(tournament_id, teams = updates.len(), "tournament updated");
                }
                Ok(RunOutcome::Skipped(_)) => {}
                Err(e) => error!(tournament_id, error = %e, "tournament run failed"),
            }
        }
        for season_id in self.storage.list_seasons().await? {
            if let Err(e) = self.run_standings(season_id).await {
                error!(season_id, error = %e, "standings run failed");
            }
        }
        Ok(())
    }

    /// Re-run everything on a fixed interval until `shutdown` resolves.
    pub async fn watch(&self, every: Duration, shutdown: impl Future<Output = ()>) {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                () = &mut shutdown => {
                    info!("watch loop stopping");
                    return;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.tick().await {
                        error!(error = %e, "watch pass failed");
                    }
                }
            }
        }
    }
}
