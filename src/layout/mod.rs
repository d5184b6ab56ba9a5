mod bounds;
mod compact;
mod fit;
mod geometry;
mod index;
mod movement;
mod position;
mod resize;
mod sync;
pub(crate) mod types;

pub use bounds::correct_bounds;
pub use compact::{compact, compact_in_place};
pub use fit::{DropStrategy, find_first_fit, find_nearest_fit, resolve_drop_position};
pub use geometry::{
    bottom, clone_layout, clone_layout_item, collides, get_all_collisions, get_first_collision,
    get_layout_item, get_statics, layout_changed, modify_layout, sort_layout_items,
    with_layout_item,
};
pub use movement::{move_element, move_element_away_from_collision, move_element_in_place};
pub use position::{
    PositionParams, calc_container_height, calc_grid_col_width, calc_grid_item_position,
    calc_grid_item_wh_px, calc_wh, calc_xy, clamp, resize_item_in_direction,
};
pub use resize::{ResizeOutcome, resize_element};
pub use sync::synchronize_layout_with_children;
pub use types::*;
