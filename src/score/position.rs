use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::model::{Bracket, CUT_LABEL, tie_label};
use crate::score::sort_utils::{cmp_score_then_id, tie_groups};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RankInput {
    pub team_id: i64,
    pub bracket: Bracket,
    /// `None` for a team that was cut.
    pub score: Option<f64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Placement {
    pub team_id: i64,
    pub bracket: Bracket,
    pub label: String,
    pub rank: Option<u32>,
    /// Size of the tie group the team finished in.
    pub tied: usize,
}

/// Finish labels for every team. Outside the playoffs all teams rank together;
/// during the playoffs each bracket ranks on its own.
#[must_use]
pub fn assign_positions(entries: &[RankInput], stage: u8) -> BTreeMap<i64, Placement> {
    let mut placements = BTreeMap::new();
    let mut pools: BTreeMap<Option<Bracket>, Vec<(f64, i64, Bracket)>> = BTreeMap::new();

    for entry in entries {
        match entry.score {
            Some(score) => {
                let pool = if stage == 0 { None } else { Some(entry.bracket) };
                pools
                    .entry(pool)
                    .or_default()
                    .push((score, entry.team_id, entry.bracket));
            }
            None => {
                placements.insert(
                    entry.team_id,
                    Placement {
                        team_id: entry.team_id,
                        bracket: entry.bracket,
                        label: CUT_LABEL.to_string(),
                        rank: None,
                        tied: 0,
                    },
                );
            }
        }
    }

    for (_, mut pool) in pools {
        pool.sort_by(|a, b| cmp_score_then_id((a.0, a.1), (b.0, b.1)));
        for group in tie_groups(pool, |a, b| a.0.total_cmp(&b.0) == Ordering::Equal) {
            let label = tie_label(group.rank, group.is_tied());
            let tied = group.members.len();
            for (_, team_id, bracket) in group.members {
                placements.insert(
                    team_id,
                    Placement {
                        team_id,
                        bracket,
                        label: label.clone(),
                        rank: Some(group.rank),
                        tied,
                    },
                );
            }
        }
    }

    placements
}
