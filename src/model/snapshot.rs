use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::model::output::TeamRecord;
use crate::model::position::PlayerStatus;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Tournament {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    pub season_id: i64,
    pub course_id: i64,
    pub tier_id: i64,
    pub start_date: NaiveDate,
    /// 1-4 while in play, 5 once the tournament is complete.
    #[serde(default)]
    pub current_round: Option<u8>,
    #[serde(default)]
    pub live_play: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Course {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    pub par: i32,
}

/// Points and payouts by finish rank; index 0 is first place.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct TierTable {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub playoff: bool,
    #[serde(default)]
    pub points: Vec<f64>,
    #[serde(default)]
    pub payouts: Vec<f64>,
}

/// One entry of the season schedule, used to order the playoff legs.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ScheduledTournament {
    pub id: i64,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub playoff: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TeamRoster {
    pub id: i64,
    pub tour_card_id: i64,
    #[serde(default)]
    pub player_ids: Vec<i64>,
    /// Position persisted by the previous run.
    #[serde(default)]
    pub position: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Bracket {
    Gold,
    Silver,
}

impl Bracket {
    #[must_use]
    pub fn from_flag(flag: u8) -> Option<Self> {
        match flag {
            1 => Some(Self::Gold),
            2 => Some(Self::Silver),
            _ => None,
        }
    }

    #[must_use]
    pub fn flag(self) -> u8 {
        match self {
            Self::Gold => 1,
            Self::Silver => 2,
        }
    }
}

/// A season participant on one tour.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TourCard {
    pub id: i64,
    pub tour_id: i64,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub points: f64,
    #[serde(default)]
    pub earnings: f64,
    /// 0 = not qualified, 1 = gold, 2 = silver.
    #[serde(default)]
    pub playoff: u8,
}

impl TourCard {
    #[must_use]
    pub fn bracket(&self) -> Option<Bracket> {
        Bracket::from_flag(self.playoff)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct PlayerRoundSnapshot {
    pub player_id: i64,
    #[serde(default)]
    pub name: String,
    /// Leaderboard position or a finish status such as `CUT`, `WD`, `DQ`.
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub today: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub thru: Option<f64>,
    #[serde(default, deserialize_with = "lenient_rounds")]
    pub round_strokes: [Option<f64>; 4],
    #[serde(default)]
    pub tee_times: [Option<String>; 4],
}

impl PlayerRoundSnapshot {
    #[must_use]
    pub fn status(&self) -> PlayerStatus {
        PlayerStatus::from_position(self.position.as_deref())
    }

    /// Raw strokes for a 1-based round.
    #[must_use]
    pub fn strokes(&self, round: u8) -> Option<f64> {
        let idx = usize::from(round.checked_sub(1)?);
        self.round_strokes.get(idx).copied().flatten()
    }

    #[must_use]
    pub fn tee_time(&self, round: u8) -> Option<&str> {
        let idx = usize::from(round.checked_sub(1)?);
        self.tee_times.get(idx).and_then(Option::as_deref)
    }
}

/// Final cumulative scores from the preceding playoff leg, keyed by tour card id.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct PriorPlayoffScores(pub BTreeMap<i64, f64>);

impl PriorPlayoffScores {
    #[must_use]
    pub fn score_for(&self, tour_card_id: i64) -> Option<f64> {
        self.0.get(&tour_card_id).copied()
    }

    /// Final scores of a persisted playoff leg. Teams without a score are left
    /// out and start the next leg from zero.
    #[must_use]
    pub fn from_records(records: &[TeamRecord]) -> Self {
        Self(
            records
                .iter()
                .filter_map(|r| Some((r.tour_card_id, r.score?)))
                .collect(),
        )
    }
}

/// Everything one tournament run reads, captured at a single point in time.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TournamentSnapshot {
    pub tournament: Tournament,
    #[serde(default)]
    pub course: Option<Course>,
    #[serde(default)]
    pub tier: Option<TierTable>,
    #[serde(default)]
    pub schedule: Vec<ScheduledTournament>,
    #[serde(default)]
    pub teams: Vec<TeamRoster>,
    #[serde(default)]
    pub tour_cards: Vec<TourCard>,
    #[serde(default)]
    pub players: Vec<PlayerRoundSnapshot>,
}

/// A persisted team result, read back for the season rollup.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TeamResult {
    pub tour_card_id: i64,
    pub tournament_id: i64,
    #[serde(default)]
    pub round: Option<u8>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub points: f64,
    #[serde(default)]
    pub earnings: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SeasonSnapshot {
    pub season_id: i64,
    #[serde(default)]
    pub tour_cards: Vec<TourCard>,
    #[serde(default)]
    pub results: Vec<TeamResult>,
}

fn number_from_value(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.eq_ignore_ascii_case("e") {
                return Some(0.0);
            }
            trimmed.trim_start_matches('+').parse::<f64>().ok()
        }
        _ => None,
    };
    parsed.filter(|n| n.is_finite())
}

// Feeds send "-", "", or null for values that are not available yet.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

fn lenient_rounds<'de, D>(deserializer: D) -> Result<[Option<f64>; 4], D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    let mut rounds = [None; 4];
    for (slot, value) in rounds.iter_mut().zip(values.iter()) {
        *slot = number_from_value(value);
    }
    Ok(rounds)
}
