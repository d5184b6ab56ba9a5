use std::borrow::Cow;

use super::geometry::{collides, collision_indices, first_collision_index, position_of};
use super::types::{Axis, CompactType, LayoutItem, MoveOptions};

/// Move the item `id` to `(x, y)` and push colliding neighbours out of the way.
///
/// Returns `Cow::Borrowed(layout)` when nothing changed: the id is unknown, the
/// item is pinned, the target equals the current position, or prevent-collision
/// reverted the move. Otherwise returns a new layout; `layout` itself is never
/// modified. `None` coordinates leave that axis alone.
pub fn move_element<'a>(
    layout: &'a [LayoutItem],
    id: &str,
    x: Option<i32>,
    y: Option<i32>,
    options: &MoveOptions,
) -> Cow<'a, [LayoutItem]> {
    let Some(index) = position_of(layout, id) else {
        return Cow::Borrowed(layout);
    };
    let item = &layout[index];
    if item.is_pinned() || (Some(item.x) == x && Some(item.y) == y) {
        return Cow::Borrowed(layout);
    }

    let mut next = layout.to_vec();
    if move_element_in_place(&mut next, index, x, y, options) {
        Cow::Owned(next)
    } else {
        Cow::Borrowed(layout)
    }
}

/// In-place form of [`move_element`], addressed by index.
///
/// The caller owns `layout` exclusively for the call. Returns whether the
/// layout changed.
pub fn move_element_in_place(
    layout: &mut [LayoutItem],
    index: usize,
    x: Option<i32>,
    y: Option<i32>,
    options: &MoveOptions,
) -> bool {
    if index >= layout.len() {
        return false;
    }
    let mut cascade = Cascade::new(layout, options.compact_type);
    cascade.move_element(
        index,
        options.allow_overlap,
        x,
        y,
        options.is_user_action,
        options.prevent_collision,
    )
}

/// Push `item_to_move` clear of `collides_with`, in place.
///
/// On a user action the item first tries the slot on the far side of
/// `collides_with` (above it, or left of it when compacting horizontally);
/// cascaded calls nudge one unit at a time along the compaction axis until the
/// pair no longer overlaps. `collides_with` itself is treated as already moved
/// and is never displaced.
pub fn move_element_away_from_collision(
    layout: &mut [LayoutItem],
    collides_with: usize,
    item_to_move: usize,
    compact_type: CompactType,
    is_user_action: bool,
) {
    if collides_with >= layout.len() || item_to_move >= layout.len() {
        return;
    }
    let mut cascade = Cascade::new(layout, compact_type);
    cascade.moved[collides_with] = true;
    cascade.move_away(collides_with, item_to_move, is_user_action);
}

/// State for one move and the cascade it triggers. `moved` marks items already
/// displaced during this call so a cascade never revisits them.
struct Cascade<'a> {
    items: &'a mut [LayoutItem],
    compact_type: CompactType,
    moved: Vec<bool>,
}

impl<'a> Cascade<'a> {
    fn new(items: &'a mut [LayoutItem], compact_type: CompactType) -> Self {
        let moved = vec![false; items.len()];
        Self {
            items,
            compact_type,
            moved,
        }
    }

    fn move_element(
        &mut self,
        index: usize,
        allow_overlap: bool,
        x: Option<i32>,
        y: Option<i32>,
        is_user_action: bool,
        prevent_collision: bool,
    ) -> bool {
        let (old_x, old_y) = {
            let item = &self.items[index];
            if item.is_pinned() {
                return false;
            }
            if Some(item.x) == x && Some(item.y) == y {
                return false;
            }
            (item.x, item.y)
        };

        tracing::trace!(
            message = "move.element",
            id = %self.items[index].id,
            from_x = old_x,
            from_y = old_y,
            to_x = ?x,
            to_y = ?y
        );

        if let Some(x) = x {
            self.items[index].x = x;
        }
        if let Some(y) = y {
            self.items[index].y = y;
        }
        self.moved[index] = true;

        let moving_up = match (self.compact_type, x, y) {
            (CompactType::Vertical, _, Some(y)) => old_y >= y,
            (CompactType::Horizontal, Some(x), _) => old_x >= x,
            _ => false,
        };

        let mut collisions = collision_indices(self.items, &self.items[index]);
        if collisions.is_empty() {
            return true;
        }
        if allow_overlap {
            return true;
        }
        if prevent_collision {
            tracing::debug!(
                message = "move.reverted",
                id = %self.items[index].id,
                x = old_x,
                y = old_y
            );
            self.items[index].x = old_x;
            self.items[index].y = old_y;
            self.moved[index] = false;
            return false;
        }

        let items = &*self.items;
        match self.compact_type {
            CompactType::Vertical => collisions.sort_by_key(|&idx| (items[idx].y, items[idx].x)),
            CompactType::Horizontal => {
                collisions.sort_by_key(|&idx| (items[idx].x, items[idx].y))
            }
            CompactType::None => {}
        }
        if moving_up {
            collisions.reverse();
        }

        for collision in collisions {
            if self.moved[collision] {
                continue;
            }
            tracing::trace!(
                message = "move.resolve",
                id = %self.items[index].id,
                other = %self.items[collision].id
            );
            if self.items[collision].is_static {
                // Statics hold their ground; the mover yields instead.
                self.move_away(collision, index, is_user_action);
            } else {
                self.move_away(index, collision, is_user_action);
            }
        }
        true
    }

    fn move_away(&mut self, collides_with: usize, item_to_move: usize, is_user_action: bool) {
        let compact_h = self.compact_type.is_horizontal();
        let compact_v = self.compact_type.is_vertical();
        let prevent_collision = self.items[collides_with].is_static;

        if is_user_action {
            let target = &self.items[collides_with];
            let mover = &self.items[item_to_move];
            let probe = LayoutItem {
                id: "-1".to_string(),
                x: if compact_h { (target.x - mover.w).max(0) } else { mover.x },
                y: if compact_v { (target.y - mover.h).max(0) } else { mover.y },
                w: mover.w,
                h: mover.h,
                ..Default::default()
            };

            let Some(blocker) = first_collision_index(self.items, &probe) else {
                tracing::debug!(
                    message = "move.reverse",
                    id = %self.items[item_to_move].id,
                    x = probe.x,
                    y = probe.y
                );
                self.move_element(
                    item_to_move,
                    false,
                    compact_h.then_some(probe.x),
                    compact_v.then_some(probe.y),
                    false,
                    prevent_collision,
                );
                return;
            };

            let blocker = &self.items[blocker];
            let target = &self.items[collides_with];
            let collision_north = blocker.bottom() > target.y;
            let collision_west = target.right() > blocker.x;

            if collision_north && compact_v {
                let y = target.bottom();
                self.move_element(item_to_move, false, None, Some(y), false, prevent_collision);
                return;
            }
            if collision_north && self.compact_type == CompactType::None {
                // Free-form grids swap the two items vertically.
                let mover_y = self.items[item_to_move].y;
                let mover_h = self.items[item_to_move].h;
                self.items[collides_with].y = mover_y;
                self.items[item_to_move].y = mover_y.saturating_add(mover_h);
                return;
            }
            if collision_west && compact_h {
                let x = self.items[item_to_move].x;
                self.move_element(collides_with, false, Some(x), None, false, prevent_collision);
                return;
            }
        }

        let axis = match self.compact_type {
            CompactType::Horizontal => Axis::X,
            CompactType::Vertical => Axis::Y,
            CompactType::None => return,
        };
        loop {
            let before = self.items[item_to_move].coord(axis);
            let step = Some(before.saturating_add(1));
            let (x, y) = match axis {
                Axis::X => (step, None),
                Axis::Y => (None, step),
            };
            let stepped = self.move_element(item_to_move, false, x, y, false, prevent_collision);
            let after = self.items[item_to_move].coord(axis);
            if !stepped
                || after <= before
                || !collides(&self.items[collides_with], &self.items[item_to_move])
            {
                break;
            }
        }
    }
}
