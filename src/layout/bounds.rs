use super::geometry::collides;
use super::types::LayoutItem;

/// Pull every item back inside `cols` columns, in place.
///
/// Right overflow is clamped so `x + w == cols`; a negative `x` resets the item to
/// a full-width row. A static that lands on an earlier static is nudged down one
/// row at a time, never sideways.
pub fn correct_bounds(layout: &mut [LayoutItem], cols: i32) -> &mut [LayoutItem] {
    let mut statics: Vec<usize> = Vec::new();

    for idx in 0..layout.len() {
        if layout[idx].right() > cols {
            layout[idx].x = cols - layout[idx].w;
        }
        if layout[idx].x < 0 {
            layout[idx].x = 0;
            layout[idx].w = cols;
        }

        if !layout[idx].is_static {
            continue;
        }
        let start = layout[idx].y;
        while statics
            .iter()
            .any(|&other| collides(&layout[other], &layout[idx]))
        {
            layout[idx].y = layout[idx].y.saturating_add(1);
        }
        if layout[idx].y != start {
            tracing::debug!(
                message = "bounds.static_nudged",
                id = %layout[idx].id,
                from = start,
                to = layout[idx].y
            );
        }
        statics.push(idx);
    }
    layout
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_right_overflow() {
        let mut layout = vec![LayoutItem::new("a", 11, 0, 3, 1)];
        correct_bounds(&mut layout, 12);
        assert_eq!(layout[0].x, 9);
        assert_eq!(layout[0].w, 3);
    }

    #[test]
    fn too_wide_item_becomes_full_width() {
        let mut layout = vec![LayoutItem::new("a", 0, 0, 20, 1)];
        correct_bounds(&mut layout, 12);
        assert_eq!((layout[0].x, layout[0].w), (0, 12));
    }

    #[test]
    fn negative_x_becomes_full_width() {
        let mut layout = vec![LayoutItem::new("a", -1, 4, 2, 1)];
        correct_bounds(&mut layout, 6);
        assert_eq!((layout[0].x, layout[0].y, layout[0].w), (0, 4, 6));
    }

    #[test]
    fn colliding_statics_are_pushed_down() {
        let mut layout = vec![
            LayoutItem::new("s1", 0, 0, 2, 2).pinned(),
            LayoutItem::new("s2", 1, 1, 2, 2).pinned(),
        ];
        correct_bounds(&mut layout, 12);
        assert_eq!(layout[0].y, 0);
        assert_eq!(layout[1].y, 2);
        assert_eq!(layout[1].x, 1);
    }

    #[test]
    fn dynamic_items_do_not_displace_statics() {
        let mut layout = vec![
            LayoutItem::new("a", 0, 0, 2, 3),
            LayoutItem::new("s", 0, 1, 2, 1).pinned(),
        ];
        correct_bounds(&mut layout, 12);
        assert_eq!(layout[1].y, 1);
        assert_eq!(layout[0].y, 0);
    }

    #[test]
    fn statics_clear_every_earlier_static() {
        let mut layout = vec![
            LayoutItem::new("s1", 0, 0, 4, 1).pinned(),
            LayoutItem::new("s2", 0, 1, 4, 1).pinned(),
            LayoutItem::new("s3", 2, 0, 1, 1).pinned(),
        ];
        correct_bounds(&mut layout, 12);
        assert_eq!(layout[2].y, 2);
    }
}
