//! Place category → station group classification.

/// Group for each recognized place category.
const CATEGORY_GROUPS: [(&str, u8); 4] = [("station", 2), ("stop", 5), ("halt", 5), ("junction", 4)];

/// Groups in the order they win a tie-break.
///
/// This is a fixed ranking of the dataset's station classes, not a numeric
/// order: 5 beats 3 and 6, and 4 comes last.
const GROUP_PRIORITY: [u8; 7] = [0, 1, 2, 5, 3, 6, 4];

/// Station group for a place category label, if the category is ranked.
pub fn group_from_category(category: &str) -> Option<u8> {
    CATEGORY_GROUPS
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, group)| *group)
}

/// The most important group present, by [`GROUP_PRIORITY`].
///
/// Unranked entries (`None`) and groups outside the table are ignored.
pub fn largest_group(groups: impl IntoIterator<Item = Option<u8>>) -> Option<u8> {
    let present: Vec<u8> = groups.into_iter().flatten().collect();
    GROUP_PRIORITY
        .iter()
        .copied()
        .find(|group| present.contains(group))
}
