use std::collections::HashMap;

use super::geometry::collides;
use super::types::LayoutItem;

// Items taller than this are kept in an unbucketed side list.
const MAX_BUCKET_SPAN: i64 = 4096;

/// Row-bucketed accelerator for "first item colliding with X" during compaction.
///
/// Entries are ordinals into a `members` list (positions into the working item
/// slice). The index grows as compaction places items, and ties resolve to the
/// lowest ordinal so results match a linear scan of `members`.
#[derive(Debug, Default)]
pub(crate) struct CollisionIndex {
    rows: HashMap<i32, Vec<usize>>,
    tall: Vec<usize>,
    seen: Vec<u32>,
    stamp: u32,
}

fn row_span(item: &LayoutItem) -> (i32, i32) {
    let start = item.y;
    let end = item.y.saturating_add(item.h).saturating_sub(1).max(start);
    (start, end)
}

impl CollisionIndex {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            rows: HashMap::new(),
            tall: Vec::new(),
            seen: vec![0; capacity],
            stamp: 1,
        }
    }

    pub(crate) fn insert(&mut self, item: &LayoutItem, ordinal: usize) {
        if ordinal >= self.seen.len() {
            self.seen.resize(ordinal + 1, 0);
        }
        let (start, end) = row_span(item);
        if i64::from(end) - i64::from(start) >= MAX_BUCKET_SPAN {
            self.tall.push(ordinal);
            return;
        }
        for row in start..=end {
            self.rows.entry(row).or_default().push(ordinal);
        }
    }

    fn next_stamp(&mut self) -> u32 {
        self.stamp = self.stamp.wrapping_add(1);
        if self.stamp == 0 {
            self.seen.fill(0);
            self.stamp = 1;
        }
        self.stamp
    }

    /// Lowest ordinal in `members` whose item collides with `probe`.
    pub(crate) fn first_collision(
        &mut self,
        items: &[LayoutItem],
        members: &[usize],
        probe: &LayoutItem,
    ) -> Option<usize> {
        let (start, end) = row_span(probe);
        if i64::from(end) - i64::from(start) >= MAX_BUCKET_SPAN {
            return members
                .iter()
                .position(|&member| collides(&items[member], probe));
        }

        let stamp = self.next_stamp();
        let mut best: Option<usize> = None;
        let mut consider = |ordinal: usize, seen: &mut [u32]| {
            if seen[ordinal] == stamp {
                return;
            }
            seen[ordinal] = stamp;
            if best.is_some_and(|current| current <= ordinal) {
                return;
            }
            if let Some(&member) = members.get(ordinal) {
                if collides(&items[member], probe) {
                    best = Some(ordinal);
                }
            }
        };

        for row in start..=end {
            let Some(bucket) = self.rows.get(&row) else {
                continue;
            };
            for &ordinal in bucket {
                consider(ordinal, &mut self.seen);
            }
        }
        for &ordinal in &self.tall {
            consider(ordinal, &mut self.seen);
        }
        best
    }
}
