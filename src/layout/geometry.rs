use super::types::{CompactType, LayoutItem};

/// Strict rectangle overlap on half-open spans. Items sharing an id never collide,
/// and touching edges do not count.
pub fn collides(a: &LayoutItem, b: &LayoutItem) -> bool {
    if a.id == b.id {
        return false;
    }
    if a.right() <= b.x {
        return false;
    }
    if a.x >= b.right() {
        return false;
    }
    if a.bottom() <= b.y {
        return false;
    }
    if a.y >= b.bottom() {
        return false;
    }
    true
}

/// Bottom extent of the layout (0 when empty).
pub fn bottom(layout: &[LayoutItem]) -> i32 {
    layout.iter().map(LayoutItem::bottom).fold(0, i32::max)
}

pub fn clone_layout_item(item: &LayoutItem) -> LayoutItem {
    item.clone()
}

pub fn clone_layout(layout: &[LayoutItem]) -> Vec<LayoutItem> {
    layout.to_vec()
}

pub fn get_layout_item<'a>(layout: &'a [LayoutItem], id: &str) -> Option<&'a LayoutItem> {
    layout.iter().find(|item| item.id == id)
}

pub(crate) fn position_of(layout: &[LayoutItem], id: &str) -> Option<usize> {
    layout.iter().position(|item| item.id == id)
}

pub fn get_statics(layout: &[LayoutItem]) -> Vec<&LayoutItem> {
    layout.iter().filter(|item| item.is_static).collect()
}

pub fn get_first_collision<'a>(
    layout: &'a [LayoutItem],
    item: &LayoutItem,
) -> Option<&'a LayoutItem> {
    layout.iter().find(|other| collides(other, item))
}

pub fn get_all_collisions<'a>(layout: &'a [LayoutItem], item: &LayoutItem) -> Vec<&'a LayoutItem> {
    layout.iter().filter(|other| collides(other, item)).collect()
}

pub(crate) fn first_collision_index(layout: &[LayoutItem], item: &LayoutItem) -> Option<usize> {
    layout.iter().position(|other| collides(other, item))
}

pub(crate) fn collision_indices(layout: &[LayoutItem], item: &LayoutItem) -> Vec<usize> {
    layout
        .iter()
        .enumerate()
        .filter(|(_, other)| collides(other, item))
        .map(|(idx, _)| idx)
        .collect()
}

/// Indices of `layout` in compaction order. The sort is stable, so ties keep
/// their input order; `CompactType::None` keeps the input order outright.
pub(crate) fn sorted_order(layout: &[LayoutItem], compact_type: CompactType) -> Vec<usize> {
    let mut order: Vec<usize> = (0..layout.len()).collect();
    match compact_type {
        CompactType::Vertical => order.sort_by_key(|&idx| (layout[idx].y, layout[idx].x)),
        CompactType::Horizontal => order.sort_by_key(|&idx| (layout[idx].x, layout[idx].y)),
        CompactType::None => {}
    }
    order
}

/// Copy of `layout` sorted into compaction order.
pub fn sort_layout_items(layout: &[LayoutItem], compact_type: CompactType) -> Vec<LayoutItem> {
    sorted_order(layout, compact_type)
        .into_iter()
        .map(|idx| layout[idx].clone())
        .collect()
}

/// Replace the item sharing `item.id`, leaving every other entry untouched.
pub fn modify_layout(layout: &[LayoutItem], item: &LayoutItem) -> Vec<LayoutItem> {
    layout
        .iter()
        .map(|existing| {
            if existing.id == item.id {
                item.clone()
            } else {
                existing.clone()
            }
        })
        .collect()
}

/// Clone the layout and run `f` on the item with `id`. `None` when the id is absent.
pub fn with_layout_item<F>(
    layout: &[LayoutItem],
    id: &str,
    f: F,
) -> Option<(Vec<LayoutItem>, LayoutItem)>
where
    F: FnOnce(&mut LayoutItem),
{
    let index = position_of(layout, id)?;
    let mut next = layout.to_vec();
    f(&mut next[index]);
    let item = next[index].clone();
    Some((next, item))
}

/// Geometry equality, used to decide whether a change should be reported.
pub fn layout_changed(before: &[LayoutItem], after: &[LayoutItem]) -> bool {
    before.len() != after.len()
        || before
            .iter()
            .zip(after)
            .any(|(a, b)| !a.same_geometry(b))
}
