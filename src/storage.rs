use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use crate::model::{PriorPlayoffScores, SeasonSnapshot, StandingUpdate, TeamRecord, TournamentSnapshot};
use crate::score::previous_playoff_leg;

#[derive(Debug, Clone)]
pub struct StorageError {
    message: String,
}

impl StorageError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for StorageError {}

impl From<String> for StorageError {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for StorageError {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Read side of a run. The engine itself never touches storage; the runner
/// loads a snapshot through this trait and hands it over.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn list_tournaments(&self) -> Result<Vec<i64>, StorageError>;
    async fn list_seasons(&self) -> Result<Vec<i64>, StorageError>;
    async fn load_snapshot(&self, tournament_id: i64) -> Result<Option<TournamentSnapshot>, StorageError>;
    async fn load_team_records(&self, tournament_id: i64) -> Result<Vec<TeamRecord>, StorageError>;
    async fn load_season(&self, season_id: i64) -> Result<Option<SeasonSnapshot>, StorageError>;

    /// Final scores of the playoff leg played before the snapshot's
    /// tournament, keyed by tour card. Empty for the first leg and outside
    /// the playoffs.
    async fn load_prior_playoff_scores(&self, snapshot: &TournamentSnapshot) -> Result<PriorPlayoffScores, StorageError> {
        let Some(tier) = snapshot.tier.as_ref() else {
            return Ok(PriorPlayoffScores::default());
        };
        let Some(previous) = previous_playoff_leg(&snapshot.tournament, tier, &snapshot.schedule) else {
            return Ok(PriorPlayoffScores::default());
        };
        let records = self.load_team_records(previous).await?;
        Ok(PriorPlayoffScores::from_records(&records))
    }
}

/// Write side of a run.
#[async_trait]
pub trait ResultSink: Send + Sync {
    async fn store_team_updates(&self, tournament_id: i64, records: &[TeamRecord]) -> Result<(), StorageError>;
    async fn store_standings(&self, season_id: i64, standings: &[StandingUpdate]) -> Result<(), StorageError>;
}

/// Both halves, for backends that hold snapshots and results together.
pub trait Storage: SnapshotSource + ResultSink {}

impl<T: SnapshotSource + ResultSink> Storage for T {}

/// JSON files under one data directory:
/// `tournaments/<id>.json`, `seasons/<id>.json`, `results/<id>.json`,
/// `standings/<season_id>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path(&self, kind: &str, id: i64) -> PathBuf {
        self.root.join(kind).join(format!("{id}.json"))
    }

    async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::new(format!("read {}: {e}", path.display()))),
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| StorageError::new(format!("parse {}: {e}", path.display())))
    }

    /// Ids of the `<id>.json` files in one subdirectory, ascending.
    async fn list_ids(&self, kind: &str) -> Result<Vec<i64>, StorageError> {
        let dir = self.root.join(kind);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(StorageError::new(format!("list {}: {e}", dir.display()))),
        };
        let mut ids = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::new(format!("list {}: {e}", dir.display())))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(id) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<i64>().ok())
            {
                ids.push(id);
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }

    // Write to a sibling temp file and rename, so readers never see a partial file.
    async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::new(format!("create {}: {e}", parent.display())))?;
        }
        let body = serde_json::to_string_pretty(value)
            .map_err(|e| StorageError::new(format!("encode {}: {e}", path.display())))?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body)
            .await
            .map_err(|e| StorageError::new(format!("write {}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| StorageError::new(format!("rename {}: {e}", path.display())))
    }
}

#[async_trait]
impl SnapshotSource for FileStorage {
    async fn list_tournaments(&self) -> Result<Vec<i64>, StorageError> {
        self.list_ids("tournaments").await
    }

    async fn list_seasons(&self) -> Result<Vec<i64>, StorageError> {
        self.list_ids("seasons").await
    }

    async fn load_snapshot(&self, tournament_id: i64) -> Result<Option<TournamentSnapshot>, StorageError> {
        Self::read_json(&self.path("tournaments", tournament_id)).await
    }

    async fn load_team_records(&self, tournament_id: i64) -> Result<Vec<TeamRecord>, StorageError> {
        Ok(Self::read_json(&self.path("results", tournament_id))
            .await?
            .unwrap_or_default())
    }

    async fn load_season(&self, season_id: i64) -> Result<Option<SeasonSnapshot>, StorageError> {
        Self::read_json(&self.path("seasons", season_id)).await
    }
}

#[async_trait]
impl ResultSink for FileStorage {
    async fn store_team_updates(&self, tournament_id: i64, records: &[TeamRecord]) -> Result<(), StorageError> {
        Self::write_json(&self.path("results", tournament_id), records).await
    }

    async fn store_standings(&self, season_id: i64, standings: &[StandingUpdate]) -> Result<(), StorageError> {
        Self::write_json(&self.path("standings", season_id), standings).await
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    snapshots: BTreeMap<i64, TournamentSnapshot>,
    records: BTreeMap<i64, Vec<TeamRecord>>,
    seasons: BTreeMap<i64, SeasonSnapshot>,
    standings: BTreeMap<i64, Vec<StandingUpdate>>,
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    state: RwLock<MemoryState>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put_snapshot(&self, snapshot: TournamentSnapshot) {
        let mut state = self.state.write().await;
        state.snapshots.insert(snapshot.tournament.id, snapshot);
    }

    pub async fn put_season(&self, season: SeasonSnapshot) {
        let mut state = self.state.write().await;
        state.seasons.insert(season.season_id, season);
    }

    pub async fn standings(&self, season_id: i64) -> Option<Vec<StandingUpdate>> {
        self.state.read().await.standings.get(&season_id).cloned()
    }
}

#[async_trait]
impl SnapshotSource for MemoryStorage {
    async fn list_tournaments(&self) -> Result<Vec<i64>, StorageError> {
        Ok(self.state.read().await.snapshots.keys().copied().collect())
    }

    async fn list_seasons(&self) -> Result<Vec<i64>, StorageError> {
        Ok(self.state.read().await.seasons.keys().copied().collect())
    }

    async fn load_snapshot(&self, tournament_id: i64) -> Result<Option<TournamentSnapshot>, StorageError> {
        Ok(self.state.read().await.snapshots.get(&tournament_id).cloned())
    }

    async fn load_team_records(&self, tournament_id: i64) -> Result<Vec<TeamRecord>, StorageError> {
        Ok(self
            .state
            .read()
            .await
            .records
            .get(&tournament_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn load_season(&self, season_id: i64) -> Result<Option<SeasonSnapshot>, StorageError> {
        Ok(self.state.read().await.seasons.get(&season_id).cloned())
    }
}

#[async_trait]
impl ResultSink for MemoryStorage {
    async fn store_team_updates(&self, tournament_id: i64, records: &[TeamRecord]) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        state.records.insert(tournament_id, records.to_vec());
        Ok(())
    }

    async fn store_standings(&self, season_id: i64, standings: &[StandingUpdate]) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        state.standings.insert(season_id, standings.to_vec());
        Ok(())
    }
}
