use std::collections::HashMap;

use super::bounds::correct_bounds;
use super::compact::compact;
use super::types::{CompactType, LayoutItem};
use crate::ir::ChildSpec;

/// Rebuild a layout for the collaborator's current child list.
///
/// Children keep their existing geometry unless they carry an explicit `grid`
/// override; new children without one are appended at the running bottom as a
/// 1x1 cell. Children without a key are skipped. The result is bounds-corrected
/// and, unless `allow_overlap`, compacted. `on_progress` sees the partial list
/// after every child.
pub fn synchronize_layout_with_children(
    initial: &[LayoutItem],
    children: &[ChildSpec],
    cols: i32,
    compact_type: CompactType,
    allow_overlap: bool,
    mut on_progress: Option<&mut dyn FnMut(&[LayoutItem])>,
) -> Vec<LayoutItem> {
    let by_id: HashMap<&str, &LayoutItem> = initial
        .iter()
        .map(|item| (item.id.as_str(), item))
        .collect();

    let mut layout: Vec<LayoutItem> = Vec::with_capacity(children.len());
    let mut current_bottom = 0;
    for child in children {
        let Some(key) = child.key.as_deref() else {
            continue;
        };
        let item = match (&child.grid, by_id.get(key)) {
            (None, Some(existing)) => (*existing).clone(),
            (Some(grid), _) => LayoutItem {
                id: key.to_string(),
                ..grid.clone()
            },
            (None, None) => LayoutItem::new(key, 0, current_bottom, 1, 1),
        };
        current_bottom = current_bottom.max(item.bottom());
        layout.push(item);
        if let Some(callback) = on_progress.as_mut() {
            callback(&layout);
        }
    }

    tracing::debug!(
        message = "sync.children",
        children = children.len(),
        items = layout.len(),
        allow_overlap
    );

    correct_bounds(&mut layout, cols);
    if allow_overlap {
        layout
    } else {
        compact(&layout, compact_type, cols, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child(key: &str) -> ChildSpec {
        ChildSpec {
            key: Some(key.to_string()),
            grid: None,
        }
    }

    fn child_with(key: &str, x: i32, y: i32, w: i32, h: i32) -> ChildSpec {
        ChildSpec {
            key: Some(key.to_string()),
            grid: Some(LayoutItem::new("", x, y, w, h)),
        }
    }

    fn geometry(layout: &[LayoutItem]) -> Vec<(&str, i32, i32, i32, i32)> {
        layout
            .iter()
            .map(|item| (item.id.as_str(), item.x, item.y, item.w, item.h))
            .collect()
    }

    #[test]
    fn reuses_overrides_and_appends_new_children() {
        let initial = vec![LayoutItem::new("a", 0, 0, 2, 2)];
        let children = vec![child("a"), child("b"), child_with("c", 5, 0, 20, 1)];
        let out = synchronize_layout_with_children(
            &initial,
            &children,
            12,
            CompactType::Vertical,
            false,
            None,
        );
        assert_eq!(
            geometry(&out),
            [("a", 0, 0, 2, 2), ("b", 0, 3, 1, 1), ("c", 0, 2, 12, 1)]
        );
    }

    #[test]
    fn override_beats_existing_geometry() {
        let initial = vec![LayoutItem::new("a", 0, 0, 2, 2)];
        let out = synchronize_layout_with_children(
            &initial,
            &[child_with("a", 3, 0, 4, 1)],
            12,
            CompactType::Vertical,
            false,
            None,
        );
        assert_eq!(geometry(&out), [("a", 3, 0, 4, 1)]);
    }

    #[test]
    fn dropped_children_disappear_and_keyless_are_skipped() {
        let initial = vec![LayoutItem::new("a", 0, 0, 1, 1), LayoutItem::new("b", 1, 0, 1, 1)];
        let children = vec![ChildSpec::default(), child("b")];
        let out = synchronize_layout_with_children(
            &initial,
            &children,
            12,
            CompactType::Vertical,
            false,
            None,
        );
        assert_eq!(geometry(&out), [("b", 1, 0, 1, 1)]);
    }

    #[test]
    fn overlap_mode_skips_compaction() {
        let children = vec![child_with("a", 0, 5, 1, 1)];
        let kept = synchronize_layout_with_children(&[], &children, 12, CompactType::Vertical, true, None);
        assert_eq!(kept[0].y, 5);
        let packed =
            synchronize_layout_with_children(&[], &children, 12, CompactType::Vertical, false, None);
        assert_eq!(packed[0].y, 0);
    }

    #[test]
    fn progress_sees_each_child() {
        let mut seen = Vec::new();
        let mut record = |partial: &[LayoutItem]| seen.push(partial.len());
        synchronize_layout_with_children(
            &[],
            &[child("a"), ChildSpec::default(), child("b")],
            12,
            CompactType::None,
            false,
            Some(&mut record),
        );
        assert_eq!(seen, [1, 2]);
    }
}
