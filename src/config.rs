use crate::layout::{
    CompactType, DropStrategy, LayoutItem, MoveOptions, PositionParams, ResizeHandle,
    resolve_compact_type,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// Template for the ghost item shown while something is dragged in from outside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppingItem {
    pub i: String,
    pub w: i32,
    pub h: i32,
}

impl Default for DroppingItem {
    fn default() -> Self {
        Self {
            i: "__dropping-elem__".to_string(),
            w: 1,
            h: 1,
        }
    }
}

/// Container-level grid settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridConfig {
    pub cols: i32,
    pub row_height: f64,
    pub margin: [f64; 2],
    /// Falls back to `margin` when unset.
    pub container_padding: Option<[f64; 2]>,
    pub width: f64,
    pub max_rows: Option<i32>,
    pub compact_type: CompactType,
    /// Legacy switch; `false` disables compaction whatever `compact_type` says.
    pub vertical_compact: bool,
    pub allow_overlap: bool,
    pub prevent_collision: bool,
    pub is_draggable: bool,
    pub is_resizable: bool,
    pub is_bounded: bool,
    pub resize_handles: Vec<ResizeHandle>,
    pub drop_strategy: DropStrategy,
    pub dropping_item: DroppingItem,
    /// Layouts at least this large compact in place and coalesce frames.
    pub coalesce_threshold: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cols: 12,
            row_height: 150.0,
            margin: [10.0, 10.0],
            container_padding: None,
            width: 1200.0,
            max_rows: None,
            compact_type: CompactType::Vertical,
            vertical_compact: true,
            allow_overlap: false,
            prevent_collision: false,
            is_draggable: true,
            is_resizable: true,
            is_bounded: false,
            resize_handles: vec![ResizeHandle::Se],
            drop_strategy: DropStrategy::Cursor,
            dropping_item: DroppingItem::default(),
            coalesce_threshold: 200,
        }
    }
}

impl GridConfig {
    /// Compaction mode after applying the legacy `verticalCompact` flag.
    pub fn effective_compact_type(&self) -> CompactType {
        resolve_compact_type(Some(self.vertical_compact), Some(self.compact_type))
    }

    pub fn move_options(&self) -> MoveOptions {
        MoveOptions::new(self.effective_compact_type())
            .allow_overlap(self.allow_overlap)
            .prevent_collision(self.prevent_collision)
    }

    pub fn position_params(&self) -> PositionParams {
        PositionParams {
            cols: self.cols,
            row_height: self.row_height,
            margin: self.margin,
            container_padding: self.container_padding.unwrap_or(self.margin),
            container_width: self.width,
            max_rows: self.max_rows,
        }
    }

    /// Item override first; statics default to fixed.
    pub fn is_draggable(&self, item: &LayoutItem) -> bool {
        item.is_draggable.unwrap_or(!item.is_static && self.is_draggable)
    }

    pub fn is_resizable(&self, item: &LayoutItem) -> bool {
        item.is_resizable.unwrap_or(!item.is_static && self.is_resizable)
    }

    /// Bounded only when draggable, bounded at container level, and not opted out.
    pub fn is_bounded(&self, item: &LayoutItem) -> bool {
        self.is_draggable(item) && self.is_bounded && item.is_bounded != Some(false)
    }

    pub fn resize_handles<'a>(&'a self, item: &'a LayoutItem) -> &'a [ResizeHandle] {
        item.resize_handles
            .as_deref()
            .unwrap_or(&self.resize_handles)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DroppingItemFile {
    i: Option<String>,
    w: Option<i32>,
    h: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    cols: Option<i32>,
    row_height: Option<f64>,
    margin: Option<[f64; 2]>,
    container_padding: Option<[f64; 2]>,
    width: Option<f64>,
    max_rows: Option<i32>,
    #[serde(default, deserialize_with = "present")]
    compact_type: Option<Option<CompactType>>,
    vertical_compact: Option<bool>,
    allow_overlap: Option<bool>,
    prevent_collision: Option<bool>,
    is_draggable: Option<bool>,
    is_resizable: Option<bool>,
    is_bounded: Option<bool>,
    resize_handles: Option<Vec<ResizeHandle>>,
    drop_strategy: Option<DropStrategy>,
    dropping_item: Option<DroppingItemFile>,
    coalesce_threshold: Option<usize>,
}

// Keeps an explicit `null` distinct from a missing key.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn parse_config_file(contents: &str) -> anyhow::Result<ConfigFile> {
    match serde_json::from_str(contents) {
        Ok(parsed) => Ok(parsed),
        Err(json_err) => json5::from_str(contents)
            .map_err(|_| anyhow::anyhow!("invalid config: {json_err}")),
    }
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<GridConfig> {
    let Some(path) = path else {
        return Ok(GridConfig::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Apply a JSON/JSON5 override document on top of the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<GridConfig> {
    let mut config = GridConfig::default();
    let parsed = parse_config_file(contents)?;

    if let Some(v) = parsed.cols {
        anyhow::ensure!(v > 0, "cols must be positive, got {v}");
        config.cols = v;
    }
    if let Some(v) = parsed.row_height {
        config.row_height = v;
    }
    if let Some(v) = parsed.margin {
        config.margin = v;
    }
    if let Some(v) = parsed.container_padding {
        config.container_padding = Some(v);
    }
    if let Some(v) = parsed.width {
        config.width = v;
    }
    if let Some(v) = parsed.max_rows {
        config.max_rows = Some(v);
    }
    if let Some(v) = parsed.compact_type {
        // `null` means no compaction.
        config.compact_type = v.unwrap_or(CompactType::None);
    }
    if let Some(v) = parsed.vertical_compact {
        config.vertical_compact = v;
    }
    if let Some(v) = parsed.allow_overlap {
        config.allow_overlap = v;
    }
    if let Some(v) = parsed.prevent_collision {
        config.prevent_collision = v;
    }
    if let Some(v) = parsed.is_draggable {
        config.is_draggable = v;
    }
    if let Some(v) = parsed.is_resizable {
        config.is_resizable = v;
    }
    if let Some(v) = parsed.is_bounded {
        config.is_bounded = v;
    }
    if let Some(v) = parsed.resize_handles {
        config.resize_handles = v;
    }
    if let Some(v) = parsed.drop_strategy {
        config.drop_strategy = v;
    }
    if let Some(item) = parsed.dropping_item {
        if let Some(v) = item.i {
            config.dropping_item.i = v;
        }
        if let Some(v) = item.w {
            config.dropping_item.w = v;
        }
        if let Some(v) = item.h {
            config.dropping_item.h = v;
        }
    }
    if let Some(v) = parsed.coalesce_threshold {
        config.coalesce_threshold = v;
    }

    Ok(config)
}
