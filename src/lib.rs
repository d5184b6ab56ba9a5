#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod interaction;
pub mod ir;
pub mod layout;
pub mod layout_dump;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{DroppingItem, GridConfig, load_config, parse_config};
pub use error::{LayoutError, Result, parse_layout, parse_layout_str, validate_layout};
pub use interaction::{FrameCoalescer, GridSession, InteractionError, InteractionKind, LayoutFrame};
pub use ir::{ChildSpec, LayoutDocument, parse_document};
pub use layout::{
    CompactType, GridPoint, GridSize, LayoutItem, MoveOptions, Placeholder, ResizeHandle,
    compact, correct_bounds, move_element,
};
