use super::geometry::{collides, position_of};
use super::movement::move_element_in_place;
use super::types::{LayoutItem, MoveOptions, Placeholder, ResizeHandle};

/// Result of one resize step: the new layout and where the ghost should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeOutcome {
    pub layout: Vec<LayoutItem>,
    pub placeholder: Placeholder,
}

/// Resize item `id` to `w x h` grid units from `handle`.
///
/// Sizes are clamped to the item's min/max. Handles on the west or north edge
/// keep the opposite edge fixed by shifting the origin; a shift past 0 keeps the
/// old size on that axis. A shifted origin is applied through the move engine
/// as a user action. With `prevent_collision` (and no overlap) a resize that
/// would collide is reverted. Unknown ids return `None`.
pub fn resize_element(
    layout: &[LayoutItem],
    id: &str,
    w: i32,
    h: i32,
    handle: ResizeHandle,
    options: &MoveOptions,
) -> Option<ResizeOutcome> {
    let index = position_of(layout, id)?;
    let current = &layout[index];
    let (mut w, mut h) = current.clamp_size(w, h);
    let (mut x, mut y) = (current.x, current.y);
    let mut should_move = false;

    if handle.moves_west_edge() {
        let shifted = current.x + (current.w - w);
        if shifted != current.x && shifted < 0 {
            w = current.w;
        }
        x = shifted.max(0);
        should_move = true;
    }
    if handle.moves_north_edge() {
        let shifted = current.y + (current.h - h);
        if shifted != current.y && shifted < 0 {
            h = current.h;
        }
        y = shifted.max(0);
        should_move = true;
    }

    if options.prevent_collision && !options.allow_overlap {
        let candidate = LayoutItem {
            x,
            y,
            w,
            h,
            ..current.clone()
        };
        if layout.iter().any(|other| collides(other, &candidate)) {
            tracing::debug!(message = "resize.reverted", id = %current.id, w, h);
            x = current.x;
            y = current.y;
            w = current.w;
            h = current.h;
            should_move = false;
        }
    }

    let mut next = layout.to_vec();
    next[index].w = w;
    next[index].h = h;
    if should_move {
        move_element_in_place(&mut next, index, Some(x), Some(y), &options.user_action(true));
    }

    tracing::trace!(
        message = "resize.element",
        id = %next[index].id,
        x = next[index].x,
        y = next[index].y,
        w,
        h
    );
    let placeholder = Placeholder::of(&next[index], true);
    Some(ResizeOutcome {
        layout: next,
        placeholder,
    })
}
