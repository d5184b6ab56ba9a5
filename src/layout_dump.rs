use crate::config::GridConfig;
use crate::layout::{
    LayoutItem, bottom, calc_container_height, calc_grid_item_position, collides,
};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub cols: i32,
    pub compact_type: String,
    pub rows: i32,
    pub height: f64,
    pub items: Vec<ItemDump>,
    pub collisions: Vec<[String; 2]>,
}

#[derive(Debug, Serialize)]
pub struct ItemDump {
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub is_static: bool,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl LayoutDump {
    pub fn from_layout(layout: &[LayoutItem], config: &GridConfig) -> Self {
        let params = config.position_params();
        let items = layout
            .iter()
            .map(|item| {
                let px = calc_grid_item_position(&params, item.x, item.y, item.w, item.h);
                ItemDump {
                    id: item.id.clone(),
                    x: item.x,
                    y: item.y,
                    w: item.w,
                    h: item.h,
                    is_static: item.is_static,
                    left: px.left,
                    top: px.top,
                    width: px.width,
                    height: px.height,
                }
            })
            .collect();

        let mut collisions = Vec::new();
        for (idx, a) in layout.iter().enumerate() {
            for b in &layout[idx + 1..] {
                if collides(a, b) {
                    collisions.push([a.id.clone(), b.id.clone()]);
                }
            }
        }

        LayoutDump {
            cols: config.cols,
            compact_type: format!("{:?}", config.effective_compact_type()).to_lowercase(),
            rows: bottom(layout),
            height: calc_container_height(layout, &params),
            items,
            collisions,
        }
    }
}

pub fn write_layout_dump(
    path: &Path,
    layout: &[LayoutItem],
    config: &GridConfig,
) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout, config);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
