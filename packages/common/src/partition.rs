//! Pure planning for splitting a contest's entries across judging groups.

/// The entries one group receives from a partition run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupAssignment {
    pub group_id: i32,
    pub entry_ids: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PartitionError {
    #[error("there are no active judging groups to assign entries to")]
    NoGroups,
}

/// Split `entry_ids` into contiguous blocks, one per group.
///
/// Entries are taken in ascending id order and groups in ascending id order.
/// With `N` entries and `G` groups the first `N mod G` groups receive
/// `ceil(N / G)` entries and the rest `floor(N / G)`, so block sizes never
/// differ by more than one. Groups past the last entry get an empty block.
pub fn plan_partition(
    entry_ids: &[i32],
    group_ids: &[i32],
) -> Result<Vec<GroupAssignment>, PartitionError> {
    let mut groups = group_ids.to_vec();
    groups.sort_unstable();
    groups.dedup();
    if groups.is_empty() {
        return Err(PartitionError::NoGroups);
    }

    let mut entries = entry_ids.to_vec();
    entries.sort_unstable();
    entries.dedup();

    let base = entries.len() / groups.len();
    let extra = entries.len() % groups.len();

    let mut rest = entries.as_slice();
    let plan = groups
        .into_iter()
        .enumerate()
        .map(|(i, group_id)| {
            let size = base + usize::from(i < extra);
            let (block, tail) = rest.split_at(size);
            rest = tail;
            GroupAssignment {
                group_id,
                entry_ids: block.to_vec(),
            }
        })
        .collect();
    Ok(plan)
}
