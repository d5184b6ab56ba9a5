use grid_layout_rs::layout::{
    CompactType, GridSize, LayoutItem, correct_bounds, find_first_fit, find_nearest_fit,
    move_element,
};
use grid_layout_rs::{GridConfig, GridSession, parse_config, parse_document, parse_layout_str};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MoveRequest {
    id: String,
    x: Option<i32>,
    y: Option<i32>,
    #[serde(default = "default_user_action")]
    is_user_action: bool,
}

fn default_user_action() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FitRequest {
    w: i32,
    h: i32,
    target_x: Option<f64>,
    target_y: Option<f64>,
}

fn js_error(error: impl ToString) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn build_config(options_json: Option<String>) -> Result<GridConfig, String> {
    match options_json {
        Some(raw) => parse_config(&raw).map_err(|error| error.to_string()),
        None => Ok(GridConfig::default()),
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|error| error.to_string())
}

fn compact_json(layout_json: &str, options_json: Option<String>) -> Result<String, String> {
    let config = build_config(options_json)?;
    let layout = parse_layout_str(layout_json, "layout").map_err(|error| error.to_string())?;
    let session = GridSession::new(config, layout);
    to_json(session.layout())
}

fn move_json(
    layout_json: &str,
    request_json: &str,
    options_json: Option<String>,
) -> Result<String, String> {
    let config = build_config(options_json)?;
    let mut layout: Vec<LayoutItem> =
        parse_layout_str(layout_json, "layout").map_err(|error| error.to_string())?;
    let request: MoveRequest =
        serde_json::from_str(request_json).map_err(|error| error.to_string())?;
    correct_bounds(&mut layout, config.cols);
    let options = config.move_options().user_action(request.is_user_action);
    let moved = move_element(&layout, &request.id, request.x, request.y, &options);
    let settled = GridSession::new(config, moved.into_owned());
    to_json(settled.layout())
}

fn fit_json(layout_json: &str, request_json: &str, cols: i32) -> Result<String, String> {
    let layout = parse_layout_str(layout_json, "layout").map_err(|error| error.to_string())?;
    let request: FitRequest =
        serde_json::from_str(request_json).map_err(|error| error.to_string())?;
    let size = GridSize::new(request.w, request.h);
    let found = match (request.target_x, request.target_y) {
        (Some(x), Some(y)) => find_nearest_fit(&layout, size, cols, x, y, None),
        _ => find_first_fit(&layout, size, cols, None),
    };
    to_json(&found)
}

fn sync_json(document_json: &str, options_json: Option<String>) -> Result<String, String> {
    let config = build_config(options_json)?;
    let document = parse_document(document_json).map_err(|error| error.to_string())?;
    let mut session = GridSession::new(config, document.layout);
    if let Some(children) = document.children {
        session.sync_children(&children);
    }
    to_json(session.layout())
}

#[wasm_bindgen]
pub fn compact_layout(layout_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    compact_json(layout_json, options_json).map_err(js_error)
}

#[wasm_bindgen]
pub fn move_layout_item(
    layout_json: &str,
    request_json: &str,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    move_json(layout_json, request_json, options_json).map_err(js_error)
}

#[wasm_bindgen]
pub fn find_fit(layout_json: &str, request_json: &str, cols: i32) -> Result<String, JsValue> {
    fit_json(layout_json, request_json, cols).map_err(js_error)
}

#[wasm_bindgen]
pub fn synchronize_layout(
    document_json: &str,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    sync_json(document_json, options_json).map_err(js_error)
}

#[wasm_bindgen]
pub fn compact_type_of(token: &str) -> Option<String> {
    CompactType::from_token(token).map(|ct| format!("{ct:?}").to_lowercase())
}
