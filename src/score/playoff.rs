use serde::{Deserialize, Serialize};

use crate::config::{EngineConfig, round_to};
use crate::model::{Bracket, PriorPlayoffScores, ScheduledTournament, TierTable, TourCard, Tournament};

pub const MAX_PLAYOFF_LEG: u8 = 3;

fn is_playoff(tournament: &Tournament, tier: &TierTable, schedule: &[ScheduledTournament]) -> bool {
    tier.playoff
        || schedule
            .iter()
            .any(|t| t.id == tournament.id && t.playoff)
}

/// The season's playoff events ordered by start date, and the position of
/// `tournament` among them.
fn playoff_legs(tournament: &Tournament, schedule: &[ScheduledTournament]) -> (Vec<i64>, usize) {
    let mut legs: Vec<(chrono::NaiveDate, i64)> = schedule
        .iter()
        .filter(|t| t.playoff)
        .map(|t| (t.start_date, t.id))
        .collect();
    if !legs.iter().any(|(_, id)| *id == tournament.id) {
        legs.push((tournament.start_date, tournament.id));
    }
    legs.sort_unstable();
    let position = legs
        .iter()
        .position(|(_, id)| *id == tournament.id)
        .unwrap_or(0);
    (legs.into_iter().map(|(_, id)| id).collect(), position)
}

/// Playoff leg of a tournament: 0 outside the playoffs, otherwise its 1-based
/// position among the season's playoff events by start date, capped at 3.
#[must_use]
pub fn event_index(tournament: &Tournament, tier: &TierTable, schedule: &[ScheduledTournament]) -> u8 {
    if !is_playoff(tournament, tier, schedule) {
        return 0;
    }
    let (_, position) = playoff_legs(tournament, schedule);
    u8::try_from(position + 1)
        .unwrap_or(MAX_PLAYOFF_LEG)
        .min(MAX_PLAYOFF_LEG)
}

/// The playoff event played immediately before this one, for legs two and three.
#[must_use]
pub fn previous_playoff_leg(
    tournament: &Tournament,
    tier: &TierTable,
    schedule: &[ScheduledTournament],
) -> Option<i64> {
    if !is_playoff(tournament, tier, schedule) {
        return None;
    }
    let (legs, position) = playoff_legs(tournament, schedule);
    legs.get(position.checked_sub(1)?).copied()
}

/// Bracket a team competes in. Outside the playoffs everybody shares the
/// silver bracket.
#[must_use]
pub fn team_bracket(stage: u8, tour_card: Option<&TourCard>) -> Bracket {
    if stage == 0 {
        return Bracket::Silver;
    }
    tour_card
        .and_then(TourCard::bracket)
        .unwrap_or(Bracket::Silver)
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(tag = "kind", content = "strokes", rename_all = "snake_case")]
pub enum CarryIn {
    None,
    Seeded(f64),
    Carried(f64),
}

impl CarryIn {
    #[must_use]
    pub fn strokes(self) -> f64 {
        match self {
            Self::None => 0.0,
            Self::Seeded(strokes) | Self::Carried(strokes) => strokes,
        }
    }
}

/// Starting strokes for the first playoff leg, drawn from the tier's points
/// table by season rank within the bracket. Tied participants share the mean
/// of the tied slice.
#[must_use]
pub fn seeding_strokes(
    tour_card: &TourCard,
    tour_cards: &[TourCard],
    tier: &TierTable,
    config: &EngineConfig,
) -> f64 {
    let Some(bracket) = tour_card.bracket() else {
        return 0.0;
    };
    let peers = tour_cards
        .iter()
        .filter(|c| c.tour_id == tour_card.tour_id && c.bracket() == Some(bracket));

    let (better, tied) = peers.fold((0usize, 0usize), |(better, tied), peer| {
        if peer.points > tour_card.points {
            (better + 1, tied)
        } else if (peer.points - tour_card.points).abs() < f64::EPSILON {
            (better, tied + 1)
        } else {
            (better, tied)
        }
    });
    // the participant itself may be missing from the list
    let tied = tied.max(1);

    let start = config.seed_offset(bracket) + better;
    let sum: f64 = (start..start + tied)
        .map(|idx| tier.points.get(idx).copied().unwrap_or(0.0))
        .sum();
    #[allow(clippy::cast_precision_loss)]
    let count = tied as f64;
    round_to(sum / count, 1)
}

/// Carry-in baseline of one team for the given playoff leg.
#[must_use]
pub fn resolve_carry_in(
    stage: u8,
    tour_card: Option<&TourCard>,
    tour_cards: &[TourCard],
    tier: &TierTable,
    prior: &PriorPlayoffScores,
    config: &EngineConfig,
) -> CarryIn {
    match (stage, tour_card) {
        (0, _) | (_, None) => CarryIn::None,
        (1, Some(card)) => CarryIn::Seeded(seeding_strokes(card, tour_cards, tier, config)),
        // dropped out of the previous leg: no carry-over
        (_, Some(card)) => CarryIn::Carried(prior.score_for(card.id).unwrap_or(0.0)),
    }
}
