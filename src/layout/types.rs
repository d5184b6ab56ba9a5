use serde::{Deserialize, Serialize};

/// Direction a resize handle drags from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    S,
    W,
    E,
    N,
    Sw,
    Nw,
    Se,
    Ne,
}

impl ResizeHandle {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "s" => Some(Self::S),
            "w" => Some(Self::W),
            "e" => Some(Self::E),
            "n" => Some(Self::N),
            "sw" => Some(Self::Sw),
            "nw" => Some(Self::Nw),
            "se" => Some(Self::Se),
            "ne" => Some(Self::Ne),
            _ => None,
        }
    }

    /// True for handles that drag the west edge (the east edge stays put).
    pub fn moves_west_edge(self) -> bool {
        matches!(self, Self::W | Self::Sw | Self::Nw)
    }

    /// True for handles that drag the north edge (the south edge stays put).
    pub fn moves_north_edge(self) -> bool {
        matches!(self, Self::N | Self::Ne | Self::Nw)
    }
}

/// Axis along which compaction removes gaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompactType {
    #[default]
    Vertical,
    Horizontal,
    None,
}

impl CompactType {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "vertical" | "v" => Some(Self::Vertical),
            "horizontal" | "h" => Some(Self::Horizontal),
            "none" | "null" | "off" => Some(Self::None),
            _ => None,
        }
    }

    pub fn is_vertical(self) -> bool {
        self == Self::Vertical
    }

    pub fn is_horizontal(self) -> bool {
        self == Self::Horizontal
    }
}

/// Legacy prop mapping: `verticalCompact: false` always disables compaction.
pub fn resolve_compact_type(
    vertical_compact: Option<bool>,
    compact_type: Option<CompactType>,
) -> CompactType {
    if vertical_compact == Some(false) {
        return CompactType::None;
    }
    compact_type.unwrap_or(CompactType::None)
}

/// One rectangle on the grid, in grid units.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutItem {
    #[serde(rename = "i", alias = "id", default)]
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_w: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_w: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_h: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_h: Option<i32>,
    #[serde(rename = "static", default, skip_serializing_if = "is_false")]
    pub is_static: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_draggable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_resizable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_bounded: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resize_handles: Option<Vec<ResizeHandle>>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl LayoutItem {
    pub fn new(id: impl Into<String>, x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            w,
            h,
            ..Default::default()
        }
    }

    pub fn pinned(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.w)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.h)
    }

    pub fn coord(&self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    pub fn extent(&self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.w,
            Axis::Y => self.h,
        }
    }

    pub fn set_coord(&mut self, axis: Axis, value: i32) {
        match axis {
            Axis::X => self.x = value,
            Axis::Y => self.y = value,
        }
    }

    /// Static items only move when explicitly marked draggable.
    pub fn is_pinned(&self) -> bool {
        self.is_static && self.is_draggable != Some(true)
    }

    /// Clamp a requested size into this item's min/max bounds.
    pub fn clamp_size(&self, w: i32, h: i32) -> (i32, i32) {
        let min_w = self.min_w.unwrap_or(1).max(1);
        let max_w = self.max_w.unwrap_or(i32::MAX);
        let min_h = self.min_h.unwrap_or(1);
        let max_h = self.max_h.unwrap_or(i32::MAX);
        (w.min(max_w).max(min_w), h.min(max_h).max(min_h))
    }

    pub fn same_geometry(&self, other: &LayoutItem) -> bool {
        self.id == other.id
            && self.x == other.x
            && self.y == other.y
            && self.w == other.w
            && self.h == other.h
            && self.is_static == other.is_static
    }
}

pub type Layout = Vec<LayoutItem>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

/// A grid cell address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Width and height of a box to be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub w: i32,
    pub h: i32,
}

impl GridSize {
    pub fn new(w: i32, h: i32) -> Self {
        Self { w, h }
    }
}

/// Pixel-space rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Parameters shared by every collision-resolving operation.
///
/// Moves never clamp to the column count; bounds are enforced by
/// `correct_bounds` and compaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOptions {
    pub compact_type: CompactType,
    pub allow_overlap: bool,
    pub is_user_action: bool,
    pub prevent_collision: bool,
}

impl MoveOptions {
    pub fn new(compact_type: CompactType) -> Self {
        Self {
            compact_type,
            allow_overlap: false,
            is_user_action: true,
            prevent_collision: false,
        }
    }

    pub fn allow_overlap(mut self, allow: bool) -> Self {
        self.allow_overlap = allow;
        self
    }

    pub fn prevent_collision(mut self, prevent: bool) -> Self {
        self.prevent_collision = prevent;
        self
    }

    pub fn user_action(mut self, user: bool) -> Self {
        self.is_user_action = user;
        self
    }
}

/// Ghost rectangle shown where the active item will land.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholder {
    pub i: String,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    #[serde(rename = "static")]
    pub is_static: bool,
}

impl Placeholder {
    pub fn of(item: &LayoutItem, is_static: bool) -> Self {
        Self {
            i: item.id.clone(),
            x: item.x,
            y: item.y,
            w: item.w,
            h: item.h,
            is_static,
        }
    }
}
