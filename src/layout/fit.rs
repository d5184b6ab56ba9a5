use serde::{Deserialize, Serialize};

use super::geometry::{bottom, get_first_collision};
use super::types::{GridPoint, GridSize, LayoutItem};

const FIT_PROBE_ID: &str = "__fit__";

/// How an item dragged in from outside the grid picks its landing cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropStrategy {
    /// Land exactly under the cursor.
    #[default]
    Cursor,
    /// Snap next to the closest existing block.
    Auto,
}

impl DropStrategy {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "cursor" => Some(Self::Cursor),
            "auto" => Some(Self::Auto),
            _ => None,
        }
    }
}

/// Checked dimensions for one search.
#[derive(Debug, Clone, Copy)]
struct FitBox {
    w: i32,
    h: i32,
    cols: i32,
    max_rows: Option<i32>,
}

impl FitBox {
    fn new(size: GridSize, cols: i32, max_rows: Option<i32>) -> Option<Self> {
        if size.w <= 0 || size.h <= 0 || cols <= 0 || size.w > cols {
            return None;
        }
        if max_rows.is_some_and(|rows| size.h > rows) {
            return None;
        }
        Some(Self {
            w: size.w,
            h: size.h,
            cols,
            max_rows,
        })
    }

    fn probe(&self, x: i32, y: i32) -> LayoutItem {
        LayoutItem::new(FIT_PROBE_ID, x, y, self.w, self.h)
    }

    fn can_place(&self, layout: &[LayoutItem], x: i32, y: i32) -> bool {
        if x < 0 || x.saturating_add(self.w) > self.cols || y < 0 {
            return false;
        }
        if self
            .max_rows
            .is_some_and(|rows| y.saturating_add(self.h) > rows)
        {
            return false;
        }
        get_first_collision(layout, &self.probe(x, y)).is_none()
    }
}

/// First collision-free slot for a `size` box in row-major scan order.
///
/// Rows are scanned from 0 down to the layout bottom (or `max_rows - h`), so the
/// row just below the content always fits when nothing higher does. Returns
/// `None` for non-positive sizes, boxes wider than `cols`, or boxes taller than
/// `max_rows`.
pub fn find_first_fit(
    layout: &[LayoutItem],
    size: GridSize,
    cols: i32,
    max_rows: Option<i32>,
) -> Option<GridPoint> {
    let fit = FitBox::new(size, cols, max_rows)?;
    first_fit(layout, &fit)
}

fn first_fit(layout: &[LayoutItem], fit: &FitBox) -> Option<GridPoint> {
    let mut max_y = bottom(layout).max(0);
    if let Some(rows) = fit.max_rows {
        max_y = max_y.min(rows - fit.h);
    }
    if max_y < 0 {
        return None;
    }

    for y in 0..=max_y {
        for x in 0..=fit.cols - fit.w {
            if get_first_collision(layout, &fit.probe(x, y)).is_none() {
                return Some(GridPoint::new(x, y));
            }
        }
    }
    None
}

/// Slot adjacent to an existing block whose centre is closest to `(target_x, target_y)`.
///
/// Every block offers eight candidates (the four sides and the four corners).
/// Ties keep enumeration order. With an empty layout the target itself is
/// snapped into bounds. Falls back to [`find_first_fit`] when nothing adjacent
/// is free.
pub fn find_nearest_fit(
    layout: &[LayoutItem],
    size: GridSize,
    cols: i32,
    target_x: f64,
    target_y: f64,
    max_rows: Option<i32>,
) -> Option<GridPoint> {
    let fit = FitBox::new(size, cols, max_rows)?;

    if layout.is_empty() {
        let x = round_half_up(target_x).min(cols - fit.w).max(0);
        let y = round_half_up(target_y).max(0);
        if fit.can_place(layout, x, y) {
            return Some(GridPoint::new(x, y));
        }
        return first_fit(layout, &fit);
    }

    let half_w = f64::from(fit.w) / 2.0;
    let half_h = f64::from(fit.h) / 2.0;
    let distance = |x: i32, y: i32| {
        let dx = f64::from(x) + half_w - target_x;
        let dy = f64::from(y) + half_h - target_y;
        dx * dx + dy * dy
    };

    let mut candidates: Vec<(GridPoint, f64)> = Vec::new();
    for block in layout {
        let left = block.x.saturating_sub(fit.w);
        let right = block.right();
        let above = block.y.saturating_sub(fit.h);
        let below = block.bottom();
        let positions = [
            (left, block.y),
            (right, block.y),
            (block.x, above),
            (block.x, below),
            (left, above),
            (right, above),
            (left, below),
            (right, below),
        ];
        for (x, y) in positions {
            if fit.can_place(layout, x, y) {
                candidates.push((GridPoint::new(x, y), distance(x, y)));
            }
        }
    }

    candidates.sort_by(|a, b| a.1.total_cmp(&b.1));
    if let Some((point, _)) = candidates.first() {
        return Some(*point);
    }
    first_fit(layout, &fit)
}

/// Landing cell for an external drop at grid cell `cursor`.
///
/// `Cursor` uses the cell as-is. `Auto` searches for the nearest fit around the
/// centre of a box dropped at `cursor`.
pub fn resolve_drop_position(
    layout: &[LayoutItem],
    size: GridSize,
    cursor: GridPoint,
    strategy: DropStrategy,
    cols: i32,
    max_rows: Option<i32>,
) -> Option<GridPoint> {
    match strategy {
        DropStrategy::Cursor => Some(cursor),
        DropStrategy::Auto => {
            let target_x = f64::from(cursor.x) + f64::from(size.w) / 2.0;
            let target_y = f64::from(cursor.y) + f64::from(size.h) / 2.0;
            let found = find_nearest_fit(layout, size, cols, target_x, target_y, max_rows);
            tracing::debug!(
                message = "fit.drop",
                cursor_x = cursor.x,
                cursor_y = cursor.y,
                found = ?found
            );
            found
        }
    }
}

/// JavaScript `Math.round`: halves round toward positive infinity. Non-finite
/// input maps to 0.
pub(crate) fn round_half_up(value: f64) -> i32 {
    if !value.is_finite() {
        return 0;
    }
    (value + 0.5).floor() as i32
}
