use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::model::{Bracket, PlayerRoundSnapshot};
use crate::score::selection::{selection_count, uses_full_roster};

pub const FULL_ROUND_THRU: f64 = 18.0;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    /// A completed round, scored from final strokes.
    Posted,
    /// The round in progress, scored from running today/thru values.
    Live,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Contribution {
    pub today: f64,
    pub thru: f64,
    pub over_par: f64,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContributionSource {
    /// Computed from the team's own players.
    Own,
    /// Copied from the worst eligible team in the bracket.
    Penalty,
    /// Nobody in the bracket was eligible.
    Empty,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct ResolvedContribution {
    pub value: Contribution,
    pub source: ContributionSource,
}

impl ResolvedContribution {
    /// Average raw strokes for the round, when a real value backs it.
    #[must_use]
    pub fn raw_strokes(&self, par: i32) -> Option<f64> {
        match self.source {
            ContributionSource::Empty => None,
            ContributionSource::Own | ContributionSource::Penalty => {
                Some(f64::from(par) + self.value.over_par)
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct RoundRequest {
    pub round: u8,
    pub stage: u8,
    pub par: i32,
    pub mode: ScoringMode,
}

/// A team's roster resolved against the snapshot for one round.
#[derive(Clone, Debug)]
pub struct TeamRoundInput<'a> {
    pub team_id: i64,
    pub bracket: Bracket,
    pub players: Vec<&'a PlayerRoundSnapshot>,
}

struct Candidate {
    key: f64,
    today: f64,
    thru: f64,
    cumulative: Option<f64>,
    player_id: i64,
}

fn compare_candidates(a: &Candidate, b: &Candidate) -> Ordering {
    a.key
        .total_cmp(&b.key)
        .then_with(|| match (a.cumulative, b.cumulative) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.player_id.cmp(&b.player_id))
}

fn candidates(players: &[&PlayerRoundSnapshot], request: &RoundRequest) -> Vec<Candidate> {
    match request.mode {
        ScoringMode::Posted => players
            .iter()
            .filter(|p| p.status().played_round(request.round))
            .filter_map(|p| {
                let over_par = p.strokes(request.round)? - f64::from(request.par);
                Some(Candidate {
                    key: over_par,
                    today: over_par,
                    thru: FULL_ROUND_THRU,
                    cumulative: p.score,
                    player_id: p.player_id,
                })
            })
            .collect(),
        ScoringMode::Live => players
            .iter()
            .filter(|p| p.status().is_active())
            .filter_map(|p| {
                let thru = p.thru.unwrap_or(0.0);
                let today = match p.today {
                    Some(today) => today,
                    // not teed off yet: even par through zero holes
                    None if thru <= 0.0 => 0.0,
                    None => return None,
                };
                Some(Candidate {
                    key: today,
                    today,
                    thru,
                    cumulative: p.score,
                    player_id: p.player_id,
                })
            })
            .collect(),
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let count = count as f64;
    sum / count
}

/// Contribution of one team from its own players, or `None` when the team
/// lacks enough eligible players for the round.
#[must_use]
pub fn team_contribution(
    players: &[&PlayerRoundSnapshot],
    request: &RoundRequest,
    config: &EngineConfig,
) -> Option<Contribution> {
    let required = selection_count(request.stage, request.round);
    let mut pool = candidates(players, request);
    if pool.len() < required {
        return None;
    }
    pool.sort_by(compare_candidates);
    let take = match request.mode {
        ScoringMode::Posted if uses_full_roster(required) => pool.len(),
        _ => required,
    };
    let selected = &pool[..take];

    match request.mode {
        ScoringMode::Posted => {
            let over_par = config.round_value(mean(selected.iter().map(|c| c.key)));
            Some(Contribution {
                today: over_par,
                thru: FULL_ROUND_THRU,
                over_par,
            })
        }
        ScoringMode::Live => {
            let today = config.round_value(mean(selected.iter().map(|c| c.today)));
            let thru = config.round_value(mean(selected.iter().map(|c| c.thru)));
            Some(Contribution {
                today,
                thru,
                over_par: today,
            })
        }
    }
}

fn empty_contribution(mode: ScoringMode) -> Contribution {
    Contribution {
        today: 0.0,
        thru: match mode {
            ScoringMode::Posted => FULL_ROUND_THRU,
            ScoringMode::Live => 0.0,
        },
        over_par: 0.0,
    }
}

/// Worst (highest) eligible contribution per bracket. Equal values resolve to
/// the lowest team id.
fn worst_by_bracket(own: &[(i64, Bracket, Option<Contribution>)]) -> BTreeMap<Bracket, Contribution> {
    let mut worst: BTreeMap<Bracket, (i64, Contribution)> = BTreeMap::new();
    for (team_id, bracket, contribution) in own {
        let Some(contribution) = contribution else {
            continue;
        };
        worst
            .entry(*bracket)
            .and_modify(|current| {
                let replace = match contribution.over_par.total_cmp(&current.1.over_par) {
                    Ordering::Greater => true,
                    Ordering::Equal => *team_id < current.0,
                    Ordering::Less => false,
                };
                if replace {
                    *current = (*team_id, *contribution);
                }
            })
            .or_insert((*team_id, *contribution));
    }
    worst.into_iter().map(|(b, (_, c))| (b, c)).collect()
}

/// Contributions of every team for one round, with the bracket fallback
/// applied to ineligible teams.
#[must_use]
pub fn resolve_round(
    teams: &[TeamRoundInput<'_>],
    request: &RoundRequest,
    config: &EngineConfig,
) -> BTreeMap<i64, ResolvedContribution> {
    let own: Vec<(i64, Bracket, Option<Contribution>)> = teams
        .par_iter()
        .map(|team| {
            (
                team.team_id,
                team.bracket,
                team_contribution(&team.players, request, config),
            )
        })
        .collect();

    let worst = worst_by_bracket(&own);

    own.into_iter()
        .map(|(team_id, bracket, contribution)| {
            let resolved = match contribution {
                Some(value) => ResolvedContribution {
                    value,
                    source: ContributionSource::Own,
                },
                None => match worst.get(&bracket) {
                    Some(value) => {
                        warn!(
                            team_id,
                            round = request.round,
                            over_par = value.over_par,
                            "team short of eligible players, assigning worst bracket contribution"
                        );
                        ResolvedContribution {
                            value: *value,
                            source: ContributionSource::Penalty,
                        }
                    }
                    None => ResolvedContribution {
                        value: empty_contribution(request.mode),
                        source: ContributionSource::Empty,
                    },
                },
            };
            debug!(team_id, round = request.round, ?resolved, "round contribution");
            (team_id, resolved)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: i64, strokes: [Option<f64>; 4], position: &str) -> PlayerRoundSnapshot {
        PlayerRoundSnapshot {
            player_id: id,
            position: Some(position.to_string()),
            round_strokes: strokes,
            ..PlayerRoundSnapshot::default()
        }
    }

    fn live(id: i64, today: f64, thru: f64, score: f64) -> PlayerRoundSnapshot {
        PlayerRoundSnapshot {
            player_id: id,
            position: Some("T10".to_string()),
            today: Some(today),
            thru: Some(thru),
            score: Some(score),
            ..PlayerRoundSnapshot::default()
        }
    }

    fn posted(round: u8, stage: u8) -> RoundRequest {
        RoundRequest {
            round,
            stage,
            par: 72,
            mode: ScoringMode::Posted,
        }
    }

    #[test]
    fn posted_top_five_in_round_three() {
        let players: Vec<PlayerRoundSnapshot> = (0..8)
            .map(|i| player(i, [None, None, Some(70.0 + i as f64), None], "T1"))
            .collect();
        let refs: Vec<&PlayerRoundSnapshot> = players.iter().collect();
        let c = team_contribution(&refs, &posted(3, 0), &EngineConfig::default()).unwrap();
        // 70..74 minus par 72 => -2,-1,0,1,2
        assert!((c.over_par - 0.0).abs() < 1e-9);
        assert!((c.thru - 18.0).abs() < 1e-9);
        assert!((c.today - c.over_par).abs() < 1e-9);
    }

    #[test]
    fn posted_full_roster_in_round_one() {
        let players: Vec<PlayerRoundSnapshot> = (0..10)
            .map(|i| player(i, [Some(if i == 9 { 80.0 } else { 72.0 }), None, None, None], "T1"))
            .collect();
        let refs: Vec<&PlayerRoundSnapshot> = players.iter().collect();
        let c = team_contribution(&refs, &posted(1, 0), &EngineConfig::default()).unwrap();
        assert!((c.over_par - 0.8).abs() < 1e-9);
    }

    #[test]
    fn cut_players_count_in_early_rounds_only() {
        let mut players: Vec<PlayerRoundSnapshot> = (0..4)
            .map(|i| player(i, [Some(72.0), Some(72.0), Some(72.0), None], "T5"))
            .collect();
        players.push(player(9, [Some(75.0), Some(76.0), None, None], "CUT"));
        let refs: Vec<&PlayerRoundSnapshot> = players.iter().collect();
        assert!(team_contribution(&refs, &posted(3, 2), &EngineConfig::default()).is_none());
        let round_two = team_contribution(&refs, &posted(2, 2), &EngineConfig::default()).unwrap();
        assert!((round_two.over_par - 0.8).abs() < 1e-9);
    }

    #[test]
    fn live_selection_breaks_ties_by_cumulative_then_id() {
        let players = vec![
            live(5, -2.0, 10.0, -4.0),
            live(3, -2.0, 12.0, -6.0),
            live(4, -1.0, 14.0, -1.0),
            live(1, -1.0, 8.0, -1.0),
        ];
        let refs: Vec<&PlayerRoundSnapshot> = players.iter().collect();
        let request = RoundRequest {
            round: 3,
            stage: 3,
            par: 72,
            mode: ScoringMode::Live,
        };
        let c = team_contribution(&refs, &request, &EngineConfig::default()).unwrap();
        // selects 3 (-2), 5 (-2), then 1 (-1, lower id than 4)
        assert!((c.today - -1.7).abs() < 1e-9);
        assert!((c.thru - 10.0).abs() < 1e-9);
    }

    #[test]
    fn live_player_on_course_without_a_round_score_is_left_out() {
        let live_round = RoundRequest {
            round: 2,
            stage: 3,
            par: 72,
            mode: ScoringMode::Live,
        };
        let unreadable = PlayerRoundSnapshot {
            player_id: 4,
            position: Some("T10".to_string()),
            thru: Some(9.0),
            score: Some(-5.0),
            ..PlayerRoundSnapshot::default()
        };
        let players = vec![live(1, -1.0, 9.0, -1.0), live(2, 2.0, 9.0, 2.0), live(3, 0.0, 9.0, 0.0), unreadable];
        let refs: Vec<&PlayerRoundSnapshot> = players.iter().collect();
        let c = team_contribution(&refs, &live_round, &EngineConfig::default()).unwrap();
        // -1, 0 and +2 count; the unreadable player is not taken as even par
        assert!((c.today - 0.3).abs() < 1e-9);

        let not_started = PlayerRoundSnapshot {
            player_id: 5,
            position: Some("T10".to_string()),
            ..PlayerRoundSnapshot::default()
        };
        let players = vec![live(1, -1.0, 9.0, -1.0), live(2, 2.0, 9.0, 2.0), not_started];
        let refs: Vec<&PlayerRoundSnapshot> = players.iter().collect();
        let c = team_contribution(&refs, &live_round, &EngineConfig::default()).unwrap();
        assert!((c.today - 0.3).abs() < 1e-9);
        assert!((c.thru - 6.0).abs() < 1e-9);
    }

    #[test]
    fn ineligible_team_takes_worst_in_bracket() {
        let good: Vec<PlayerRoundSnapshot> = (0..5)
            .map(|i| player(i, [None, None, Some(70.0), None], "T1"))
            .collect();
        let bad: Vec<PlayerRoundSnapshot> = (10..15)
            .map(|i| player(i, [None, None, Some(76.0), None], "T30"))
            .collect();
        let short: Vec<PlayerRoundSnapshot> = (20..24)
            .map(|i| player(i, [None, None, Some(65.0), None], "T2"))
            .collect();
        let teams = vec![
            TeamRoundInput {
                team_id: 1,
                bracket: Bracket::Silver,
                players: good.iter().collect(),
            },
            TeamRoundInput {
                team_id: 2,
                bracket: Bracket::Silver,
                players: bad.iter().collect(),
            },
            TeamRoundInput {
                team_id: 3,
                bracket: Bracket::Silver,
                players: short.iter().collect(),
            },
        ];
        let resolved = resolve_round(&teams, &posted(3, 0), &EngineConfig::default());
        assert_eq!(resolved[&3].source, ContributionSource::Penalty);
        assert!((resolved[&3].value.over_par - 4.0).abs() < 1e-9);
        assert_eq!(resolved[&3].raw_strokes(72), Some(76.0));
        assert_eq!(resolved[&1].source, ContributionSource::Own);
    }

    #[test]
    fn no_eligible_team_in_bracket_scores_zero() {
        let short: Vec<PlayerRoundSnapshot> = (0..2)
            .map(|i| player(i, [None, None, Some(70.0), None], "T1"))
            .collect();
        let other: Vec<PlayerRoundSnapshot> = (10..15)
            .map(|i| player(i, [None, None, Some(70.0), None], "T1"))
            .collect();
        let teams = vec![
            TeamRoundInput {
                team_id: 1,
                bracket: Bracket::Gold,
                players: short.iter().collect(),
            },
            TeamRoundInput {
                team_id: 2,
                bracket: Bracket::Silver,
                players: other.iter().collect(),
            },
        ];
        let resolved = resolve_round(&teams, &posted(3, 1), &EngineConfig::default());
        assert_eq!(resolved[&1].source, ContributionSource::Empty);
        assert!((resolved[&1].value.over_par).abs() < 1e-9);
        assert!((resolved[&1].value.thru - 18.0).abs() < 1e-9);
        assert_eq!(resolved[&1].raw_strokes(72), None);
    }
}
