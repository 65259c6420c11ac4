use serde::{Deserialize, Serialize};

use crate::model::Bracket;

/// Tunables for one engine run. Every field has a default so a partial TOML
/// table is enough.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Index shift of the silver bracket into the seeding strokes table.
    pub silver_seed_offset: usize,
    /// Index shift of the silver bracket into the final-leg payouts table.
    pub silver_payout_offset: usize,
    /// Last season rank that qualifies for the gold bracket.
    pub gold_cutoff: u32,
    /// Last season rank that qualifies for the silver bracket.
    pub silver_cutoff: u32,
    /// A regular-season team with fewer active players after round two is cut.
    pub cut_min_active: usize,
    pub contribution_decimals: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            silver_seed_offset: 30,
            silver_payout_offset: 30,
            gold_cutoff: 15,
            silver_cutoff: 35,
            cut_min_active: 5,
            contribution_decimals: 1,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn seed_offset(&self, bracket: Bracket) -> usize {
        match bracket {
            Bracket::Gold => 0,
            Bracket::Silver => self.silver_seed_offset,
        }
    }

    #[must_use]
    pub fn payout_offset(&self, bracket: Bracket) -> usize {
        match bracket {
            Bracket::Gold => 0,
            Bracket::Silver => self.silver_payout_offset,
        }
    }

    /// Playoff flag earned by a season rank.
    #[must_use]
    pub fn playoff_flag(&self, rank: u32) -> u8 {
        if rank == 0 {
            0
        } else if rank <= self.gold_cutoff {
            Bracket::Gold.flag()
        } else if rank <= self.silver_cutoff {
            Bracket::Silver.flag()
        } else {
            0
        }
    }

    #[must_use]
    pub fn round_value(&self, value: f64) -> f64 {
        round_to(value, self.contribution_decimals)
    }
}

/// Rounds to `decimals` places with halves going up, so -0.5 becomes 0.
#[must_use]
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(i32::try_from(decimals).unwrap_or(1));
    (value * factor + 0.5).floor() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playoff_flags_by_rank() {
        let config = EngineConfig::default();
        assert_eq!(config.playoff_flag(1), 1);
        assert_eq!(config.playoff_flag(15), 1);
        assert_eq!(config.playoff_flag(16), 2);
        assert_eq!(config.playoff_flag(35), 2);
        assert_eq!(config.playoff_flag(36), 0);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config: EngineConfig = toml::from_str("silver_payout_offset = 75").unwrap();
        assert_eq!(config.silver_payout_offset, 75);
        assert_eq!(config.silver_seed_offset, 30);
    }

    #[test]
    fn rounding() {
        assert!((round_to(2.345, 1) - 2.3).abs() < 1e-9);
        assert!((round_to(-1.25, 0) - -1.0).abs() < 1e-9);
    }

    #[test]
    fn halves_round_up_on_both_sides_of_par() {
        assert!(round_to(-0.5, 0).abs() < 1e-9);
        assert!((round_to(-0.25, 1) - -0.2).abs() < 1e-9);
        assert!((round_to(-2.5, 0) - -2.0).abs() < 1e-9);
        assert!((round_to(2.5, 0) - 3.0).abs() < 1e-9);
    }
}
