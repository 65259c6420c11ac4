use ahash::AHashMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::model::{
    Bracket, Course, PlayerRoundSnapshot, PriorPlayoffScores, TeamRoster, TeamUpdate, TierTable,
    TourCard, TournamentSnapshot,
};
use crate::score::{
    FINAL_ROUND, RankInput, RoundRequest, TeamRoundInput, TeamRounds, TournamentState,
    assign_positions, build_score_card, distribute, event_index, resolve_carry_in, resolve_round,
    team_bracket,
};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoActiveTournament,
    TournamentNotStarted,
    NoTeams,
    NoParticipants,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NoActiveTournament => "no active tournament",
            Self::TournamentNotStarted => "tournament has not started",
            Self::NoTeams => "tournament has no teams",
            Self::NoParticipants => "season has no tour participants",
        };
        write!(f, "{s}")
    }
}

/// Result of a run that did not fail. Skips are expected steady states and
/// are never retried.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "outcome", content = "data", rename_all = "snake_case")]
pub enum RunOutcome<T> {
    Completed(T),
    Skipped(SkipReason),
}

impl<T> RunOutcome<T> {
    #[must_use]
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Skipped(_) => None,
        }
    }
}

/// Read-only indexes over one snapshot, built once per run.
pub struct Lookup<'a> {
    players: AHashMap<i64, &'a PlayerRoundSnapshot>,
    tour_cards: AHashMap<i64, &'a TourCard>,
}

impl<'a> Lookup<'a> {
    #[must_use]
    pub fn new(snapshot: &'a TournamentSnapshot) -> Self {
        Self {
            players: snapshot.players.iter().map(|p| (p.player_id, p)).collect(),
            tour_cards: snapshot.tour_cards.iter().map(|c| (c.id, c)).collect(),
        }
    }

    #[must_use]
    pub fn player(&self, id: i64) -> Option<&'a PlayerRoundSnapshot> {
        self.players.get(&id).copied()
    }

    #[must_use]
    pub fn tour_card(&self, id: i64) -> Option<&'a TourCard> {
        self.tour_cards.get(&id).copied()
    }
}

/// One team's fixed inputs for the run.
struct TeamPlan<'a> {
    team: &'a TeamRoster,
    bracket: Bracket,
    players: Vec<&'a PlayerRoundSnapshot>,
    cut: bool,
    carry_in: f64,
}

fn referenced<'a>(snapshot: &'a TournamentSnapshot) -> Result<(&'a Course, &'a TierTable), EngineError> {
    let tournament = &snapshot.tournament;
    let course = snapshot
        .course
        .as_ref()
        .filter(|c| c.id == tournament.course_id)
        .ok_or_else(|| {
            EngineError::MissingReference(format!(
                "course {} for tournament {}",
                tournament.course_id, tournament.id
            ))
        })?;
    let tier = snapshot
        .tier
        .as_ref()
        .filter(|t| t.id == tournament.tier_id)
        .ok_or_else(|| {
            EngineError::MissingReference(format!(
                "tier {} for tournament {}",
                tournament.tier_id, tournament.id
            ))
        })?;
    Ok((course, tier))
}

fn unique_teams(teams: &[TeamRoster]) -> Vec<&TeamRoster> {
    let mut seen = BTreeSet::new();
    let mut unique: Vec<&TeamRoster> = teams
        .iter()
        .filter(|team| {
            let first = seen.insert(team.id);
            if !first {
                warn!(team_id = team.id, "duplicate team in snapshot, keeping the first");
            }
            first
        })
        .collect();
    unique.sort_by_key(|team| team.id);
    unique
}

/// Score one tournament snapshot. Pure: no I/O, and identical input always
/// produces identical output.
///
/// # Errors
/// Returns `EngineError::MissingReference` if the snapshot lacks the course or
/// tier its tournament references. No partial output is produced.
pub fn score_tournament(
    snapshot: &TournamentSnapshot,
    prior: &PriorPlayoffScores,
    config: &EngineConfig,
) -> Result<RunOutcome<Vec<TeamUpdate>>, EngineError> {
    let (course, tier) = referenced(snapshot)?;
    let tournament = &snapshot.tournament;

    let current_round = match tournament.current_round {
        None | Some(0) => return Ok(RunOutcome::Skipped(SkipReason::TournamentNotStarted)),
        Some(round) => round.min(FINAL_ROUND),
    };
    if snapshot.teams.is_empty() {
        return Ok(RunOutcome::Skipped(SkipReason::NoTeams));
    }

    let lookup = Lookup::new(snapshot);
    let stage = event_index(tournament, tier, &snapshot.schedule);
    let state = TournamentState {
        current_round,
        live_play: tournament.live_play && current_round < FINAL_ROUND,
        stage,
        par: course.par,
    };
    let teams = unique_teams(&snapshot.teams);

    let plans: Vec<TeamPlan<'_>> = teams
        .par_iter()
        .map(|&team| {
            let card = lookup.tour_card(team.tour_card_id);
            if card.is_none() {
                warn!(team_id = team.id, tour_card_id = team.tour_card_id, "team has no tour card");
            }
            let players: Vec<&PlayerRoundSnapshot> = team
                .player_ids
                .iter()
                .filter_map(|id| {
                    let player = lookup.player(*id);
                    if player.is_none() {
                        warn!(team_id = team.id, player_id = *id, "roster player missing from snapshot");
                    }
                    player
                })
                .collect();
            let active = players.iter().filter(|p| p.status().is_active()).count();
            TeamPlan {
                team,
                bracket: team_bracket(stage, card),
                cut: state.is_cut(active, config),
                carry_in: resolve_carry_in(stage, card, &snapshot.tour_cards, tier, prior, config)
                    .strokes(),
                players,
            }
        })
        .collect();

    let mut rounds: BTreeMap<i64, TeamRounds> = plans.iter().map(|p| (p.team.id, [None; 4])).collect();
    for (round, mode) in state.round_plan() {
        let inputs: Vec<TeamRoundInput<'_>> = plans
            .iter()
            .filter(|p| !p.cut || round <= 2)
            .map(|p| TeamRoundInput {
                team_id: p.team.id,
                bracket: p.bracket,
                players: p.players.clone(),
            })
            .collect();
        let request = RoundRequest {
            round,
            stage,
            par: course.par,
            mode,
        };
        for (team_id, contribution) in resolve_round(&inputs, &request, config) {
            if let Some(slot) = rounds
                .get_mut(&team_id)
                .and_then(|r| r.get_mut(usize::from(round - 1)))
            {
                *slot = Some(contribution);
            }
        }
    }

    let cards: Vec<_> = plans
        .iter()
        .map(|p| {
            let team_rounds = rounds.get(&p.team.id).copied().unwrap_or([None; 4]);
            (p, build_score_card(&state, p.cut, &team_rounds, p.carry_in, config))
        })
        .collect();

    let rank_inputs: Vec<RankInput> = cards
        .iter()
        .map(|(p, card)| RankInput {
            team_id: p.team.id,
            bracket: p.bracket,
            score: card.score(),
        })
        .collect();
    let placements = assign_positions(&rank_inputs, stage);
    let awards = distribute(&placements, tier, stage, config);

    let updates: Vec<TeamUpdate> = cards
        .into_iter()
        .map(|(p, card)| {
            let award = awards.get(&p.team.id).copied().unwrap_or_default();
            TeamUpdate {
                team_id: p.team.id,
                tour_card_id: p.team.tour_card_id,
                tournament_id: tournament.id,
                round: current_round,
                card,
                position: placements.get(&p.team.id).map(|pl| pl.label.clone()),
                past_position: p.team.position.clone(),
                points: award.points,
                earnings: award.earnings,
            }
        })
        .collect();

    info!(
        tournament_id = tournament.id,
        stage,
        current_round,
        live = state.live_play,
        teams = updates.len(),
        cut = updates.iter().filter(|u| u.card.is_cut()).count(),
        "tournament scored"
    );
    Ok(RunOutcome::Completed(updates))
}
