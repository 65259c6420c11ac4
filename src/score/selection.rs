/// Number of a team's players whose scores count toward a round.
///
/// `stage` is 0 for a regular-season event and 1-3 for the playoff legs.
#[must_use]
pub fn selection_count(stage: u8, round: u8) -> usize {
    match (stage, round) {
        (0 | 1, 0..=2) => 10,
        (0 | 1, _) => 5,
        (2, _) => 5,
        _ => 3,
    }
}

/// Counting ten or more players means the whole roster counts.
#[must_use]
pub fn uses_full_roster(count: usize) -> bool {
    count >= 10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_table() {
        assert_eq!(selection_count(0, 1), 10);
        assert_eq!(selection_count(0, 2), 10);
        assert_eq!(selection_count(0, 3), 5);
        assert_eq!(selection_count(1, 4), 5);
        assert_eq!(selection_count(2, 1), 5);
        assert_eq!(selection_count(2, 4), 5);
        assert_eq!(selection_count(3, 1), 3);
        assert_eq!(selection_count(3, 4), 3);
    }

    #[test]
    fn later_rounds_never_count_more_players() {
        for stage in 0..=3 {
            for early in 1..=2 {
                for late in 3..=4 {
                    assert!(selection_count(stage, late) <= selection_count(stage, early));
                }
            }
        }
    }
}
