use serde::{Deserialize, Serialize};

/// The round being played (or just closed) at the time of the run.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct CurrentRound {
    pub today: f64,
    pub thru: f64,
    pub live: bool,
    /// Average raw strokes when the round was scored as posted.
    pub posted: Option<f64>,
}

/// One team's scoring state. Each variant carries exactly the fields that
/// exist at that point of the tournament.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ScoreCard {
    Cut {
        round_one: Option<f64>,
        round_two: Option<f64>,
    },
    RoundOne {
        current: CurrentRound,
        score: f64,
    },
    RoundTwo {
        round_one: Option<f64>,
        current: CurrentRound,
        score: f64,
    },
    RoundThree {
        round_one: Option<f64>,
        round_two: Option<f64>,
        current: CurrentRound,
        score: f64,
    },
    RoundFour {
        round_one: Option<f64>,
        round_two: Option<f64>,
        round_three: Option<f64>,
        current: CurrentRound,
        score: f64,
    },
    Final {
        round_one: Option<f64>,
        round_two: Option<f64>,
        round_three: Option<f64>,
        round_four: Option<f64>,
        today: f64,
        thru: f64,
        score: f64,
    },
}

impl ScoreCard {
    #[must_use]
    pub fn is_cut(&self) -> bool {
        matches!(self, Self::Cut { .. })
    }

    #[must_use]
    pub fn score(&self) -> Option<f64> {
        match *self {
            Self::Cut { .. } => None,
            Self::RoundOne { score, .. }
            | Self::RoundTwo { score, .. }
            | Self::RoundThree { score, .. }
            | Self::RoundFour { score, .. }
            | Self::Final { score, .. } => Some(score),
        }
    }

    /// Per-round raw fields in round order; the current round shows its
    /// posted value when it was not scored live.
    #[must_use]
    pub fn rounds(&self) -> [Option<f64>; 4] {
        match *self {
            Self::Cut {
                round_one,
                round_two,
            } => [round_one, round_two, None, None],
            Self::RoundOne { current, .. } => [current.posted, None, None, None],
            Self::RoundTwo {
                round_one, current, ..
            } => [round_one, current.posted, None, None],
            Self::RoundThree {
                round_one,
                round_two,
                current,
                ..
            } => [round_one, round_two, current.posted, None],
            Self::RoundFour {
                round_one,
                round_two,
                round_three,
                current,
                ..
            } => [round_one, round_two, round_three, current.posted],
            Self::Final {
                round_one,
                round_two,
                round_three,
                round_four,
                ..
            } => [round_one, round_two, round_three, round_four],
        }
    }

    #[must_use]
    pub fn today_thru(&self) -> Option<(f64, f64)> {
        match *self {
            Self::Cut { .. } => None,
            Self::RoundOne { current, .. }
            | Self::RoundTwo { current, .. }
            | Self::RoundThree { current, .. }
            | Self::RoundFour { current, .. } => Some((current.today, current.thru)),
            Self::Final { today, thru, .. } => Some((today, thru)),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TeamUpdate {
    pub team_id: i64,
    pub tour_card_id: i64,
    pub tournament_id: i64,
    pub round: u8,
    pub card: ScoreCard,
    pub position: Option<String>,
    pub past_position: Option<String>,
    pub points: f64,
    pub earnings: f64,
}

/// Flat row handed to the persistence sink.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TeamRecord {
    pub team_id: i64,
    pub tour_card_id: i64,
    pub round: u8,
    pub round_one: Option<f64>,
    pub round_two: Option<f64>,
    pub round_three: Option<f64>,
    pub round_four: Option<f64>,
    pub today: Option<f64>,
    pub thru: Option<f64>,
    pub score: Option<f64>,
    pub position: Option<String>,
    pub past_position: Option<String>,
    pub points: f64,
    pub earnings: f64,
}

impl TeamUpdate {
    #[must_use]
    pub fn to_record(&self) -> TeamRecord {
        let [round_one, round_two, round_three, round_four] = self.card.rounds();
        let today_thru = self.card.today_thru();
        TeamRecord {
            team_id: self.team_id,
            tour_card_id: self.tour_card_id,
            round: self.round,
            round_one,
            round_two,
            round_three,
            round_four,
            today: today_thru.map(|(today, _)| today),
            thru: today_thru.map(|(_, thru)| thru),
            score: self.card.score(),
            position: self.position.clone(),
            past_position: self.past_position.clone(),
            points: self.points,
            earnings: self.earnings,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StandingUpdate {
    pub tour_card_id: i64,
    pub tour_id: i64,
    pub points: f64,
    pub earnings: f64,
    pub wins: u32,
    pub top_ten: u32,
    pub made_cut: u32,
    pub appearances: u32,
    pub position: String,
    /// 0 = none, 1 = gold, 2 = silver.
    pub playoff: u8,
}
