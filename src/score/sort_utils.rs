use std::cmp::Ordering;

/// A run of entries sharing one sort value.
#[derive(Debug, Clone, PartialEq)]
pub struct TieGroup<T> {
    /// Count of strictly better entries plus one.
    pub rank: u32,
    pub members: Vec<T>,
}

impl<T> TieGroup<T> {
    #[must_use]
    pub fn is_tied(&self) -> bool {
        self.members.len() > 1
    }
}

/// Split an already sorted list into tie groups. `same` decides whether two
/// neighbours share a value.
#[must_use]
pub fn tie_groups<T>(sorted: Vec<T>, same: impl Fn(&T, &T) -> bool) -> Vec<TieGroup<T>> {
    let mut groups: Vec<TieGroup<T>> = Vec::new();
    let mut seen: u32 = 0;
    for item in sorted {
        let joins = groups
            .last()
            .and_then(|group| group.members.last())
            .is_some_and(|last| same(last, &item));
        if let (true, Some(group)) = (joins, groups.last_mut()) {
            group.members.push(item);
        } else {
            groups.push(TieGroup {
                rank: seen + 1,
                members: vec![item],
            });
        }
        seen += 1;
    }
    groups
}

/// Ascending float order with a deterministic secondary key.
pub fn cmp_score_then_id(a: (f64, i64), b: (f64, i64)) -> Ordering {
    a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1))
}
