use shoal_core::{IdSetIndex, IdentifiableIdSet};

/// Six sets: `1` and `2` are identical, `3` and `6` sit inside them, and
/// `4`/`5` form a separate family over foreign members.
#[must_use]
pub fn families() -> IdSetIndex {
    [
        IdentifiableIdSet::new(1, [1, 2, 3]),
        IdentifiableIdSet::new(2, [1, 2, 3]),
        IdentifiableIdSet::new(3, [1, 2]),
        IdentifiableIdSet::new(4, [7, 8]),
        IdentifiableIdSet::new(5, [7, 8, 9]),
        IdentifiableIdSet::new(6, [1]),
    ]
    .into_iter()
    .collect()
}
