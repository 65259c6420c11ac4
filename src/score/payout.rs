use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::{EngineConfig, round_to};
use crate::model::TierTable;
use crate::score::position::Placement;

pub const FINAL_PLAYOFF_LEG: u8 = 3;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Default)]
pub struct Award {
    pub points: f64,
    pub earnings: f64,
}

/// Mean of the `count` table entries starting at `rank - 1 + offset`, rounded
/// to the nearest integer. Entries past the end of the table are worth zero.
#[must_use]
pub fn tie_average(table: &[f64], rank: u32, count: usize, offset: usize) -> f64 {
    let Some(start) = usize::try_from(rank)
        .ok()
        .and_then(|r| r.checked_sub(1))
        .map(|r| r + offset)
    else {
        return 0.0;
    };
    let count = count.max(1);
    let sum: f64 = (start..start + count)
        .map(|idx| table.get(idx).copied().unwrap_or(0.0))
        .sum();
    #[allow(clippy::cast_precision_loss)]
    let divisor = count as f64;
    round_to(sum / divisor, 0)
}

/// Points and earnings for one placement.
#[must_use]
pub fn award_for(placement: &Placement, tier: &TierTable, stage: u8, config: &EngineConfig) -> Award {
    let Some(rank) = placement.rank else {
        return Award::default();
    };
    match stage {
        0 => Award {
            points: tie_average(&tier.points, rank, placement.tied, 0),
            earnings: tie_average(&tier.payouts, rank, placement.tied, 0),
        },
        FINAL_PLAYOFF_LEG => Award {
            points: 0.0,
            earnings: tie_average(
                &tier.payouts,
                rank,
                placement.tied,
                config.payout_offset(placement.bracket),
            ),
        },
        // earlier playoff legs only carry strokes forward
        _ => Award::default(),
    }
}

#[must_use]
pub fn distribute(
    placements: &BTreeMap<i64, Placement>,
    tier: &TierTable,
    stage: u8,
    config: &EngineConfig,
) -> BTreeMap<i64, Award> {
    placements
        .iter()
        .map(|(team_id, placement)| (*team_id, award_for(placement, tier, stage, config)))
        .collect()
}
