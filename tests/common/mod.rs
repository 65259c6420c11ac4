#![allow(dead_code)]

use chrono::NaiveDate;
use golf_standings::model::{
    Course, PlayerRoundSnapshot, ScheduledTournament, TeamRoster, TeamUpdate, TierTable, TourCard,
    Tournament, TournamentSnapshot,
};
use std::collections::BTreeMap;

pub const PAR: i32 = 72;

pub fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, month, day).expect("valid test date")
}

/// A player who posted `strokes` for the first rounds and nothing after.
pub fn player(player_id: i64, position: &str, strokes: &[f64]) -> PlayerRoundSnapshot {
    let mut round_strokes = [None; 4];
    for (slot, value) in round_strokes.iter_mut().zip(strokes) {
        *slot = Some(*value);
    }
    PlayerRoundSnapshot {
        player_id,
        name: format!("Player {player_id}"),
        position: Some(position.to_string()),
        score: Some(strokes.iter().map(|s| s - f64::from(PAR)).sum()),
        round_strokes,
        ..PlayerRoundSnapshot::default()
    }
}

/// A player mid-round in live play.
pub fn live_player(player_id: i64, today: Option<f64>, thru: Option<f64>) -> PlayerRoundSnapshot {
    PlayerRoundSnapshot {
        player_id,
        name: format!("Player {player_id}"),
        position: Some("T1".to_string()),
        score: today,
        today,
        thru,
        ..PlayerRoundSnapshot::default()
    }
}

pub fn roster(id: i64, tour_card_id: i64, player_ids: impl IntoIterator<Item = i64>) -> TeamRoster {
    TeamRoster {
        id,
        tour_card_id,
        player_ids: player_ids.into_iter().collect(),
        position: None,
    }
}

pub fn card(id: i64, points: f64, playoff: u8) -> TourCard {
    TourCard {
        id,
        tour_id: 1,
        display_name: format!("Member {id}"),
        points,
        earnings: 0.0,
        playoff,
    }
}

pub fn tournament(id: i64, start_date: NaiveDate, current_round: Option<u8>, live_play: bool) -> Tournament {
    Tournament {
        id,
        name: format!("Event {id}"),
        season_id: 2025,
        course_id: 1,
        tier_id: 1,
        start_date,
        current_round,
        live_play,
    }
}

pub fn regular_tier() -> TierTable {
    TierTable {
        id: 1,
        name: "Standard".to_string(),
        playoff: false,
        points: vec![500.0, 300.0, 200.0, 100.0, 50.0],
        payouts: vec![50_000.0, 30_000.0, 20_000.0, 10_000.0, 5_000.0],
    }
}

/// Playoff tier whose points table doubles as the seeding strokes table
/// (`points[i] == i`) and whose payouts hold gold entries first and silver
/// entries from index 30.
pub fn playoff_tier() -> TierTable {
    let mut payouts = vec![0.0; 32];
    payouts[0] = 1_000.0;
    payouts[1] = 600.0;
    payouts[30] = 300.0;
    payouts[31] = 200.0;
    TierTable {
        id: 1,
        name: "Playoff".to_string(),
        playoff: true,
        points: (0..40).map(f64::from).collect(),
        payouts,
    }
}

/// The three playoff legs of the 2025 season.
pub fn playoff_schedule() -> Vec<ScheduledTournament> {
    [(101, 1), (102, 8), (103, 15)]
        .into_iter()
        .map(|(id, day)| ScheduledTournament {
            id,
            start_date: date(8, day),
            playoff: true,
        })
        .collect()
}

pub fn snapshot(
    tournament: Tournament,
    tier: TierTable,
    teams: Vec<TeamRoster>,
    tour_cards: Vec<TourCard>,
    players: Vec<PlayerRoundSnapshot>,
) -> TournamentSnapshot {
    TournamentSnapshot {
        tournament,
        course: Some(Course {
            id: 1,
            name: "Test Links".to_string(),
            par: PAR,
        }),
        tier: Some(tier),
        schedule: vec![],
        teams,
        tour_cards,
        players,
    }
}

pub fn by_team(updates: Vec<TeamUpdate>) -> BTreeMap<i64, TeamUpdate> {
    updates.into_iter().map(|u| (u.team_id, u)).collect()
}

pub fn close(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-9
}
