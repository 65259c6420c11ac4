use crate::config::EngineConfig;
use crate::model::{CurrentRound, ScoreCard};
use crate::score::contribution::{
    Contribution, ContributionSource, FULL_ROUND_THRU, ResolvedContribution, ScoringMode,
};

pub const FINAL_ROUND: u8 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TournamentState {
    /// 1-4 while in play, 5 once complete.
    pub current_round: u8,
    pub live_play: bool,
    pub stage: u8,
    pub par: i32,
}

impl TournamentState {
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.current_round >= FINAL_ROUND
    }

    /// Rounds to score this run and how to score each of them.
    #[must_use]
    pub fn round_plan(&self) -> Vec<(u8, ScoringMode)> {
        if self.is_final() {
            return (1..=4).map(|r| (r, ScoringMode::Posted)).collect();
        }
        let current = self.current_round.max(1);
        let mut plan: Vec<(u8, ScoringMode)> =
            (1..current).map(|r| (r, ScoringMode::Posted)).collect();
        plan.push((
            current,
            if self.live_play {
                ScoringMode::Live
            } else {
                ScoringMode::Posted
            },
        ));
        plan
    }

    /// A regular-season team is cut once play passes round two with fewer
    /// than the minimum number of active players.
    #[must_use]
    pub fn is_cut(&self, active_players: usize, config: &EngineConfig) -> bool {
        self.stage == 0 && self.current_round >= 3 && active_players < config.cut_min_active
    }
}

/// Contributions of one team indexed by round (index 0 = round one).
pub type TeamRounds = [Option<ResolvedContribution>; 4];

const MISSING: ResolvedContribution = ResolvedContribution {
    value: Contribution {
        today: 0.0,
        thru: FULL_ROUND_THRU,
        over_par: 0.0,
    },
    source: ContributionSource::Empty,
};

fn round_at(rounds: &TeamRounds, round: u8) -> ResolvedContribution {
    usize::from(round)
        .checked_sub(1)
        .and_then(|idx| rounds.get(idx).copied().flatten())
        .unwrap_or(MISSING)
}

fn raw(rounds: &TeamRounds, round: u8, par: i32) -> Option<f64> {
    round_at(rounds, round).raw_strokes(par)
}

fn over_par_through(rounds: &TeamRounds, last: u8) -> f64 {
    (1..=last).map(|r| round_at(rounds, r).value.over_par).sum()
}

/// Combine a team's round contributions and carry-in into its score card.
#[must_use]
pub fn build_score_card(
    state: &TournamentState,
    cut: bool,
    rounds: &TeamRounds,
    carry_in: f64,
    config: &EngineConfig,
) -> ScoreCard {
    let par = state.par;
    if cut {
        return ScoreCard::Cut {
            round_one: raw(rounds, 1, par),
            round_two: raw(rounds, 2, par),
        };
    }

    if state.is_final() {
        let last = round_at(rounds, 4);
        return ScoreCard::Final {
            round_one: raw(rounds, 1, par),
            round_two: raw(rounds, 2, par),
            round_three: raw(rounds, 3, par),
            round_four: raw(rounds, 4, par),
            today: last.value.over_par,
            thru: FULL_ROUND_THRU,
            score: config.round_value(carry_in + over_par_through(rounds, 4)),
        };
    }

    let round = state.current_round.max(1);
    let contribution = round_at(rounds, round);
    let completed = over_par_through(rounds, round - 1);
    let score = config.round_value(carry_in + completed + contribution.value.over_par);
    let current = if state.live_play {
        CurrentRound {
            today: contribution.value.today,
            thru: contribution.value.thru,
            live: true,
            posted: None,
        }
    } else {
        CurrentRound {
            today: contribution.value.over_par,
            thru: FULL_ROUND_THRU,
            live: false,
            posted: contribution.raw_strokes(par),
        }
    };

    match round {
        1 => ScoreCard::RoundOne { current, score },
        2 => ScoreCard::RoundTwo {
            round_one: raw(rounds, 1, par),
            current,
            score,
        },
        3 => ScoreCard::RoundThree {
            round_one: raw(rounds, 1, par),
            round_two: raw(rounds, 2, par),
            current,
            score,
        },
        _ => ScoreCard::RoundFour {
            round_one: raw(rounds, 1, par),
            round_two: raw(rounds, 2, par),
            round_three: raw(rounds, 3, par),
            current,
            score,
        },
    }
}
