use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

pub const CUT_LABEL: &str = "CUT";

static RANK_LABEL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\s*T?(\d+)\s*$").ok());

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStatus {
    Active,
    Cut,
    Withdrawn,
    Disqualified,
}

impl PlayerStatus {
    #[must_use]
    pub fn from_position(position: Option<&str>) -> Self {
        match position.map(|p| p.trim().to_ascii_uppercase()).as_deref() {
            Some("CUT" | "MC") => Self::Cut,
            Some("WD") => Self::Withdrawn,
            Some("DQ") => Self::Disqualified,
            _ => Self::Active,
        }
    }

    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    /// Whether a player with this status still played the given round.
    /// A cut player finished rounds one and two.
    #[must_use]
    pub fn played_round(self, round: u8) -> bool {
        match self {
            Self::Active => true,
            Self::Cut => round <= 2,
            // withdrawals and disqualifications only count where strokes were posted
            Self::Withdrawn | Self::Disqualified => true,
        }
    }
}

/// Numeric rank of a finish label: `"T3"` and `"3"` give 3, `"CUT"` gives `None`.
#[must_use]
pub fn parse_rank(label: &str) -> Option<u32> {
    let re = RANK_LABEL.as_ref()?;
    let caps = re.captures(label)?;
    caps.get(1)?.as_str().parse().ok().filter(|rank| *rank > 0)
}

#[must_use]
pub fn tie_label(rank: u32, tied: bool) -> String {
    if tied {
        format!("T{rank}")
    } else {
        rank.to_string()
    }
}
