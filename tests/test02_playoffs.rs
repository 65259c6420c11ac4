mod common;

use common::{by_team, card, close, date, live_player, player, playoff_schedule, playoff_tier, roster, snapshot, tournament};
use golf_standings::model::{PriorPlayoffScores, ScoreCard, TeamRecord, TournamentSnapshot};
use golf_standings::runner::Runner;
use golf_standings::storage::{MemoryStorage, ResultSink, SnapshotSource};
use golf_standings::{EngineConfig, RunOutcome, score_tournament};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Four gold and two silver participants sharing one pool of players.
fn playoff_snapshot(tournament_id: i64, day: u32, current_round: u8, live: bool, players_per_team: i64) -> TournamentSnapshot {
    let cards = vec![
        card(1, 1_000.0, 1),
        card(2, 900.0, 1),
        card(3, 900.0, 1),
        card(4, 800.0, 1),
        card(5, 500.0, 2),
        card(6, 400.0, 2),
    ];
    let teams = (1..=6).map(|id| roster(id * 10, id, 1..=players_per_team)).collect();
    let mut snapshot = snapshot(
        tournament(tournament_id, date(8, day), Some(current_round), live),
        playoff_tier(),
        teams,
        cards,
        vec![],
    );
    snapshot.schedule = playoff_schedule();
    snapshot
}

#[test]
fn test02_first_leg_starts_from_seeded_strokes() -> Result<(), Box<dyn std::error::Error>> {
    let mut snapshot = playoff_snapshot(101, 1, 1, true, 10);
    // nobody has teed off yet
    snapshot.players = (1..=10).map(|id| live_player(id, None, None)).collect();

    let teams = by_team(
        score_tournament(&snapshot, &PriorPlayoffScores::default(), &EngineConfig::default())?
            .completed()
            .ok_or("first leg should be scored")?,
    );
    let scores: BTreeMap<i64, Option<f64>> = teams.iter().map(|(id, u)| (*id, u.card.score())).collect();
    assert_eq!(scores[&10], Some(0.0));
    assert_eq!(scores[&20], Some(1.5));
    assert_eq!(scores[&30], Some(1.5));
    assert_eq!(scores[&40], Some(3.0));
    assert_eq!(scores[&50], Some(30.0));
    assert_eq!(scores[&60], Some(31.0));

    // brackets rank on their own
    let label = |id: i64| teams[&id].position.clone().unwrap_or_default();
    assert_eq!(label(10), "1");
    assert_eq!(label(20), "T2");
    assert_eq!(label(30), "T2");
    assert_eq!(label(40), "4");
    assert_eq!(label(50), "1");
    assert_eq!(label(60), "2");

    for update in teams.values() {
        assert!(close(update.points, 0.0));
        assert!(close(update.earnings, 0.0));
        assert!(matches!(update.card, ScoreCard::RoundOne { current, .. } if current.live && close(current.thru, 0.0)));
    }
    Ok(())
}

#[tokio::test]
async fn test02_second_leg_carries_previous_final_score() -> Result<(), Box<dyn std::error::Error>> {
    let mut snapshot = playoff_snapshot(102, 8, 1, false, 5);
    snapshot.players = (1..=5).map(|id| player(id, "T1", &[70.0])).collect();

    let storage = Arc::new(MemoryStorage::new());
    storage.put_snapshot(snapshot).await;
    let prior_leg = [(10, 1, -3.0), (20, 2, 2.0)]
        .into_iter()
        .map(|(team_id, tour_card_id, score)| TeamRecord {
            team_id,
            tour_card_id,
            round: 5,
            round_one: Some(70.0),
            round_two: Some(70.0),
            round_three: Some(70.0),
            round_four: Some(70.0),
            today: Some(-2.0),
            thru: Some(18.0),
            score: Some(score),
            position: Some("1".to_string()),
            past_position: None,
            points: 0.0,
            earnings: 0.0,
        })
        .collect::<Vec<_>>();
    storage.store_team_updates(101, &prior_leg).await?;

    let leg_two = storage.load_snapshot(102).await?.ok_or("second leg stored")?;
    let prior = storage.load_prior_playoff_scores(&leg_two).await?;
    assert_eq!(prior.score_for(1), Some(-3.0));
    assert_eq!(prior.score_for(3), None);

    let runner = Runner::new(storage.clone(), EngineConfig::default());
    let RunOutcome::Completed(updates) = runner.run_tournament(102).await? else {
        return Err("second leg should be scored".into());
    };
    let teams = by_team(updates);
    assert_eq!(teams[&10].card.score(), Some(-5.0));
    assert_eq!(teams[&20].card.score(), Some(0.0));
    // no result in the previous leg: starts from zero
    assert_eq!(teams[&30].card.score(), Some(-2.0));
    assert!(close(teams[&10].earnings, 0.0));

    let stored = storage.load_team_records(102).await?;
    assert_eq!(stored.len(), 6);
    assert_eq!(stored.iter().find(|r| r.team_id == 10).and_then(|r| r.score), Some(-5.0));
    assert_eq!(stored.iter().find(|r| r.team_id == 10).and_then(|r| r.round_one), Some(70.0));
    Ok(())
}

#[test]
fn test02_final_leg_pays_each_bracket_from_its_offset() -> Result<(), Box<dyn std::error::Error>> {
    let mut snapshot = playoff_snapshot(103, 15, 5, false, 3);
    snapshot.players = (1..=3).map(|id| player(id, "T1", &[70.0, 70.0, 70.0, 70.0])).collect();
    // two gold teams and two silver teams
    snapshot.teams.retain(|team| [10, 20, 50, 60].contains(&team.id));

    let prior = PriorPlayoffScores([(1, -10.0), (2, -5.0), (5, 0.0), (6, 0.0)].into_iter().collect());
    let teams = by_team(
        score_tournament(&snapshot, &prior, &EngineConfig::default())?
            .completed()
            .ok_or("final leg should be scored")?,
    );

    assert_eq!(teams[&10].card.score(), Some(-18.0));
    assert_eq!(teams[&20].card.score(), Some(-13.0));
    assert_eq!(teams[&50].card.score(), Some(-8.0));
    assert_eq!(teams[&60].card.score(), Some(-8.0));

    assert!(close(teams[&10].earnings, 1_000.0));
    assert!(close(teams[&20].earnings, 600.0));
    assert_eq!(teams[&50].position.as_deref(), Some("T1"));
    assert!(close(teams[&50].earnings, 250.0));
    assert!(close(teams[&60].earnings, 250.0));
    for update in teams.values() {
        assert!(close(update.points, 0.0));
    }
    Ok(())
}

#[test]
fn test02_first_leg_in_round_three_uses_bracket_fallback() -> Result<(), Box<dyn std::error::Error>> {
    let mut snapshot = playoff_snapshot(101, 1, 3, false, 0);
    let mut players: Vec<_> = (1..=10).map(|id| player(id, "T5", &[72.0, 72.0, 70.0])).collect();
    // a gold team with four players left standing
    players.extend((11..=14).map(|id| player(id, "T9", &[72.0, 72.0, 68.0])));
    players.extend((15..=20).map(|id| player(id, "WD", &[72.0, 72.0])));
    snapshot.players = players;
    snapshot.teams = vec![
        roster(10, 1, 1..=10),
        roster(20, 2, 11..=20),
        roster(40, 4, (1..=5).map(|id| id + 5)),
        roster(50, 5, 1..=10),
    ];

    let teams = by_team(
        score_tournament(&snapshot, &PriorPlayoffScores::default(), &EngineConfig::default())?
            .completed()
            .ok_or("round three should be scored")?,
    );
    // playoffs never cut; the short team takes the worst gold contribution (-2)
    // rather than its own -4
    match teams[&20].card {
        ScoreCard::RoundThree { current, .. } => assert!(close(current.today, -2.0)),
        other => return Err(format!("unexpected card {other:?}").into()),
    }
    Ok(())
}
