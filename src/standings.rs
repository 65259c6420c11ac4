use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::config::{EngineConfig, round_to};
use crate::engine::{RunOutcome, SkipReason};
use crate::model::{CUT_LABEL, SeasonSnapshot, StandingUpdate, TeamResult, TourCard, parse_rank, tie_label};
use crate::score::aggregate::FINAL_ROUND;
use crate::score::sort_utils::tie_groups;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Tally {
    points: f64,
    earnings: f64,
    wins: u32,
    top_ten: u32,
    made_cut: u32,
    appearances: u32,
}

fn tally(results: &[&TeamResult]) -> Tally {
    let mut t = Tally::default();
    for result in results {
        let position = result.position.as_deref();
        let rank = position.and_then(parse_rank);
        if position.is_some_and(|p| !p.trim().is_empty()) && rank.is_none() && position != Some(CUT_LABEL) {
            warn!(
                tour_card_id = result.tour_card_id,
                tournament_id = result.tournament_id,
                ?position,
                "unparsable finish position"
            );
        }
        t.appearances += 1;
        if rank == Some(1) {
            t.wins += 1;
        }
        if rank.is_some_and(|r| r <= 10) {
            t.top_ten += 1;
        }
        if position != Some(CUT_LABEL) {
            t.made_cut += 1;
        }
        t.points += round_to(result.points, 0);
        t.earnings += result.earnings;
    }
    t
}

/// Season rollup of completed tournaments for every tour participant, ranked
/// within each tour by points.
#[must_use]
pub fn season_standings(season: &SeasonSnapshot, config: &EngineConfig) -> RunOutcome<Vec<StandingUpdate>> {
    if season.tour_cards.is_empty() {
        return RunOutcome::Skipped(SkipReason::NoParticipants);
    }

    let mut completed: BTreeMap<i64, Vec<&TeamResult>> = BTreeMap::new();
    for result in &season.results {
        if result.round.is_some_and(|r| r >= FINAL_ROUND) {
            completed.entry(result.tour_card_id).or_default().push(result);
        }
    }

    let mut tours: BTreeMap<i64, Vec<(&TourCard, Tally)>> = BTreeMap::new();
    for card in &season.tour_cards {
        let results = completed.get(&card.id).map(Vec::as_slice).unwrap_or_default();
        tours
            .entry(card.tour_id)
            .or_default()
            .push((card, tally(results)));
    }

    let mut standings = Vec::with_capacity(season.tour_cards.len());
    for (tour_id, mut entries) in tours {
        entries.sort_by(|a, b| {
            b.1.points
                .total_cmp(&a.1.points)
                .then_with(|| a.0.id.cmp(&b.0.id))
        });
        for group in tie_groups(entries, |a, b| a.1.points.total_cmp(&b.1.points) == Ordering::Equal) {
            let position = tie_label(group.rank, group.is_tied());
            let playoff = config.playoff_flag(group.rank);
            for (card, t) in group.members {
                standings.push(StandingUpdate {
                    tour_card_id: card.id,
                    tour_id,
                    points: t.points,
                    earnings: t.earnings,
                    wins: t.wins,
                    top_ten: t.top_ten,
                    made_cut: t.made_cut,
                    appearances: t.appearances,
                    position: position.clone(),
                    playoff,
                });
            }
        }
    }

    info!(
        season_id = season.season_id,
        participants = standings.len(),
        "season standings computed"
    );
    RunOutcome::Completed(standings)
}
