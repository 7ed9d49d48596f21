// Subgrouping arithmetic
//
// Large collections are split into balanced synthetic ranges so no node
// exposes more than `group_limit` direct children. A limit of 0 or 1
// disables grouping.

/// Returns true if `child_count` exceeds the group limit and grouping is enabled
pub fn needs_subgrouping(group_limit: u64, child_count: u64) -> bool {
    group_limit > 1 && child_count > group_limit
}

/// Maximum number of entries in each immediate subgroup.
///
/// The smallest power of `group_limit` that brings the number of subgroups
/// down to at most `group_limit`; 1 when no grouping is needed.
pub fn subgroup_size(group_limit: u64, child_count: u64) -> u64 {
    if !needs_subgrouping(group_limit, child_count) {
        return 1;
    }
    let mut group_size = 1u64;
    while child_count.div_ceil(group_size) > group_limit {
        group_size = group_size.saturating_mul(group_limit);
    }
    group_size
}

/// Number of immediate children for a collection of `child_count` entries
pub fn subgroup_count(group_limit: u64, child_count: u64) -> u64 {
    child_count.div_ceil(subgroup_size(group_limit, child_count))
}

/// Half-open range `[start, end)` of the `i`th immediate subgroup
pub fn subgroup_range(group_limit: u64, child_count: u64, i: u64) -> (u64, u64) {
    let group_size = subgroup_size(group_limit, child_count);
    let start = i.saturating_mul(group_size).min(child_count);
    let end = start.saturating_add(group_size).min(child_count);
    (start, end)
}
