use super::geometry::{collides, sorted_order};
use super::index::CollisionIndex;
use super::types::{Axis, CompactType, LayoutItem};

/// Compact a layout, removing gaps along the `compact_type` axis.
///
/// Statics never move. Items are placed in compaction order (row-major for
/// vertical, column-major for horizontal) but the output keeps the input order.
/// The input is not modified.
pub fn compact(
    layout: &[LayoutItem],
    compact_type: CompactType,
    cols: i32,
    allow_overlap: bool,
) -> Vec<LayoutItem> {
    let order = sorted_order(layout, compact_type);
    let mut working: Vec<LayoutItem> = order.iter().map(|&idx| layout[idx].clone()).collect();
    compact_sorted(&mut working, &order, compact_type, cols, allow_overlap);

    let mut out = vec![LayoutItem::default(); layout.len()];
    for (item, &idx) in working.into_iter().zip(&order) {
        out[idx] = item;
    }
    out
}

/// Same algorithm as [`compact`], rewriting the caller's items in place.
///
/// The caller hands over exclusive access to `layout` for the duration of the
/// call; item order is preserved and no item is cloned.
pub fn compact_in_place(
    layout: &mut [LayoutItem],
    compact_type: CompactType,
    cols: i32,
    allow_overlap: bool,
) -> &mut [LayoutItem] {
    let order = sorted_order(layout, compact_type);
    let mut working: Vec<LayoutItem> = order
        .iter()
        .map(|&idx| std::mem::take(&mut layout[idx]))
        .collect();
    compact_sorted(&mut working, &order, compact_type, cols, allow_overlap);
    for (item, &idx) in working.into_iter().zip(&order) {
        layout[idx] = item;
    }
    layout
}

/// `items` is in compaction order; `order[pos]` is the input index of `items[pos]`.
fn compact_sorted(
    items: &mut [LayoutItem],
    order: &[usize],
    compact_type: CompactType,
    cols: i32,
    allow_overlap: bool,
) {
    // Statics are compared in input order so collision tie-breaks do not depend
    // on the sort.
    let mut compare_with: Vec<usize> =
        (0..items.len()).filter(|&pos| items[pos].is_static).collect();
    compare_with.sort_by_key(|&pos| order[pos]);

    let mut index = CollisionIndex::with_capacity(items.len());
    for (ordinal, &member) in compare_with.iter().enumerate() {
        index.insert(&items[member], ordinal);
    }

    for pos in 0..items.len() {
        if items[pos].is_static {
            continue;
        }
        compact_item(
            items,
            pos,
            &compare_with,
            &mut index,
            compact_type,
            cols,
            allow_overlap,
        );
        compare_with.push(pos);
        index.insert(&items[pos], compare_with.len() - 1);
    }
}

fn first_hit(
    items: &[LayoutItem],
    pos: usize,
    compare_with: &[usize],
    index: &mut CollisionIndex,
) -> Option<usize> {
    index
        .first_collision(items, compare_with, &items[pos])
        .map(|ordinal| compare_with[ordinal])
}

fn compact_item(
    items: &mut [LayoutItem],
    pos: usize,
    compare_with: &[usize],
    index: &mut CollisionIndex,
    compact_type: CompactType,
    cols: i32,
    allow_overlap: bool,
) {
    match compact_type {
        CompactType::Vertical => {
            // Never start below the placed content; lets callers park items at y = i32::MAX.
            let floor = compare_with
                .iter()
                .map(|&member| items[member].bottom())
                .fold(0, i32::max);
            items[pos].y = items[pos].y.min(floor);
            if first_hit(items, pos, compare_with, index).is_none() {
                let l = &items[pos];
                let target = compare_with
                    .iter()
                    .map(|&member| &items[member])
                    .filter(|other| other.bottom() <= l.y)
                    .filter(|other| l.right() > other.x && l.x < other.right())
                    .map(LayoutItem::bottom)
                    .fold(0, i32::max);
                items[pos].y = target;
            }
        }
        CompactType::Horizontal => {
            // A domino push may have parked it past the last column.
            items[pos].x = items[pos].x.min(cols - items[pos].w);
            if first_hit(items, pos, compare_with, index).is_none() {
                let l = &items[pos];
                let target = compare_with
                    .iter()
                    .map(|&member| &items[member])
                    .filter(|other| other.right() <= l.x)
                    .filter(|other| l.bottom() > other.y && l.y < other.bottom())
                    .map(LayoutItem::right)
                    .fold(0, i32::max);
                items[pos].x = target;
            }
        }
        CompactType::None => {}
    }

    while let Some(hit) = first_hit(items, pos, compare_with, index) {
        if compact_type == CompactType::None && allow_overlap {
            break;
        }
        if compact_type.is_horizontal() {
            let target = items[hit].right();
            resolve_compaction_collision(items, pos, target, Axis::X, compact_type);
            if items[pos].right() > cols {
                // Out of columns: drop a row and slide back left as far as it fits.
                items[pos].x = cols - items[pos].w;
                items[pos].y = items[pos].y.saturating_add(1);
                tracing::trace!(
                    message = "compact.wrap",
                    id = %items[pos].id,
                    x = items[pos].x,
                    y = items[pos].y
                );
                while items[pos].x > 0 && first_hit(items, pos, compare_with, index).is_none() {
                    items[pos].x -= 1;
                }
            }
        } else {
            let target = items[hit].bottom();
            resolve_compaction_collision(items, pos, target, Axis::Y, compact_type);
        }
    }

    items[pos].x = items[pos].x.max(0);
    items[pos].y = items[pos].y.max(0);
}

/// Push every later item that would collide with `items[pos]` out of the way,
/// farthest dependents first, then move `items[pos]` to `move_to` on `axis`.
fn resolve_compaction_collision(
    items: &mut [LayoutItem],
    pos: usize,
    move_to: i32,
    axis: Axis,
    compact_type: CompactType,
) {
    let size = items[pos].extent(axis);
    let nudged = items[pos].coord(axis).saturating_add(1);
    items[pos].set_coord(axis, nudged);

    for other in pos + 1..items.len() {
        if items[other].is_static {
            continue;
        }
        // Sorted input lets us stop once we are past the mover.
        let past = match compact_type {
            CompactType::Vertical => items[other].y > items[pos].bottom(),
            CompactType::Horizontal => items[other].x > items[pos].right(),
            CompactType::None => false,
        };
        if past {
            break;
        }
        if collides(&items[pos], &items[other]) {
            resolve_compaction_collision(
                items,
                other,
                move_to.saturating_add(size),
                axis,
                compact_type,
            );
        }
    }

    items[pos].set_coord(axis, move_to);
}
