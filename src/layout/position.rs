//! Pixel <-> grid conversion for hosts that render the grid.

use serde::{Deserialize, Serialize};

use super::geometry::bottom;
use super::types::{GridPoint, GridSize, LayoutItem, Position, ResizeHandle};

/// Container geometry needed to convert between pixels and grid units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionParams {
    pub cols: i32,
    pub row_height: f64,
    pub margin: [f64; 2],
    pub container_padding: [f64; 2],
    pub container_width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rows: Option<i32>,
}

/// `Math.round` from JavaScript: halves go toward positive infinity.
pub(crate) fn js_round(value: f64) -> f64 {
    (value + 0.5).floor()
}

fn to_units(value: f64) -> i32 {
    if value.is_finite() {
        js_round(value) as i32
    } else {
        0
    }
}

/// `max(min(num, upper), lower)`; `lower` wins when the bounds cross.
pub fn clamp<T: PartialOrd>(num: T, lower: T, upper: T) -> T {
    let capped = if num < upper { num } else { upper };
    if capped > lower { capped } else { lower }
}

pub fn calc_grid_col_width(params: &PositionParams) -> f64 {
    let cols = f64::from(params.cols);
    (params.container_width - params.margin[0] * (cols - 1.0) - params.container_padding[0] * 2.0)
        / cols
}

/// Pixel length of `grid_units` cells of `size` with `margin` between them.
pub fn calc_grid_item_wh_px(grid_units: i32, size: f64, margin: f64) -> f64 {
    let units = f64::from(grid_units);
    js_round(size * units + (units - 1.0).max(0.0) * margin)
}

pub fn calc_grid_item_position(params: &PositionParams, x: i32, y: i32, w: i32, h: i32) -> Position {
    let col_width = calc_grid_col_width(params);
    Position {
        width: calc_grid_item_wh_px(w, col_width, params.margin[0]),
        height: calc_grid_item_wh_px(h, params.row_height, params.margin[1]),
        top: js_round(
            (params.row_height + params.margin[1]) * f64::from(y) + params.container_padding[1],
        ),
        left: js_round((col_width + params.margin[0]) * f64::from(x) + params.container_padding[0]),
    }
}

/// Grid cell under a pixel offset, clamped so a `w x h` item stays on the grid.
pub fn calc_xy(params: &PositionParams, top: f64, left: f64, w: i32, h: i32) -> GridPoint {
    let col_width = calc_grid_col_width(params);
    let x = to_units((left - params.margin[0]) / (col_width + params.margin[0]));
    let y = to_units((top - params.margin[1]) / (params.row_height + params.margin[1]));
    let max_y = params.max_rows.map_or(i32::MAX, |rows| rows - h);
    GridPoint::new(clamp(x, 0, params.cols - w), clamp(y, 0, max_y))
}

/// Grid size for a pixel size. West/north handles may span the whole grid because
/// the origin moves with them.
pub fn calc_wh(
    params: &PositionParams,
    width: f64,
    height: f64,
    x: i32,
    y: i32,
    handle: ResizeHandle,
) -> GridSize {
    let col_width = calc_grid_col_width(params);
    let w = to_units((width + params.margin[0]) / (col_width + params.margin[0]));
    let h = to_units((height + params.margin[1]) / (params.row_height + params.margin[1]));
    let max_rows = params.max_rows.unwrap_or(i32::MAX);

    let w = if handle.moves_west_edge() {
        clamp(w, 0, params.cols)
    } else {
        clamp(w, 0, params.cols - x)
    };
    let h = if handle.moves_north_edge() {
        clamp(h, 0, max_rows)
    } else {
        clamp(h, 0, max_rows.saturating_sub(y))
    };
    GridSize::new(w, h)
}

/// Pixel height of a container holding `layout`.
pub fn calc_container_height(layout: &[LayoutItem], params: &PositionParams) -> f64 {
    let rows = f64::from(bottom(layout));
    rows * params.row_height + (rows - 1.0) * params.margin[1] + params.container_padding[1] * 2.0
}

fn constrain_width(left: f64, current_width: f64, new_width: f64, container_width: f64) -> f64 {
    if left + new_width > container_width {
        current_width
    } else {
        new_width
    }
}

fn constrain_height(top: f64, current_height: f64, new_height: f64) -> f64 {
    if top < 0.0 { current_height } else { new_height }
}

fn resize_north(current: &Position, next: Position) -> Position {
    let top = current.top - (next.height - current.height);
    Position {
        height: constrain_height(top, current.height, next.height),
        top: top.max(0.0),
        ..next
    }
}

fn resize_south(current: &Position, next: Position) -> Position {
    Position {
        height: constrain_height(next.top, current.height, next.height),
        top: next.top.max(0.0),
        ..next
    }
}

fn resize_east(current: &Position, next: Position, container_width: f64) -> Position {
    Position {
        width: constrain_width(current.left, current.width, next.width, container_width),
        left: next.left.max(0.0),
        ..next
    }
}

fn resize_west(current: &Position, next: Position, container_width: f64) -> Position {
    let left = current.left - (next.width - current.width);
    let width = if left < 0.0 {
        current.width
    } else {
        constrain_width(current.left, current.width, next.width, container_width)
    };
    Position {
        width,
        left: left.max(0.0),
        top: next.top.max(0.0),
        ..next
    }
}

/// Keep a pixel-space resize inside the container for the given handle.
pub fn resize_item_in_direction(
    handle: ResizeHandle,
    current: Position,
    next: Position,
    container_width: f64,
) -> Position {
    let current = &current;
    match handle {
        ResizeHandle::N => resize_north(current, next),
        ResizeHandle::S => resize_south(current, next),
        ResizeHandle::E => resize_east(current, next, container_width),
        ResizeHandle::W => resize_west(current, next, container_width),
        ResizeHandle::Ne => resize_north(current, resize_east(current, next, container_width)),
        ResizeHandle::Nw => resize_north(current, resize_west(current, next, container_width)),
        ResizeHandle::Se => resize_south(current, resize_east(current, next, container_width)),
        ResizeHandle::Sw => resize_south(current, resize_west(current, next, container_width)),
    }
}
