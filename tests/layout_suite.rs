use std::path::Path;

use grid_layout_rs::ir::parse_children;
use grid_layout_rs::layout::{
    CompactType, GridSize, LayoutItem, MoveOptions, compact, correct_bounds, find_first_fit,
    find_nearest_fit, move_element, synchronize_layout_with_children,
};
use grid_layout_rs::parse_layout;
use serde_json::Value;

const COLS: i32 = 12;

fn compact_type(fixture: &Value) -> CompactType {
    fixture
        .get("compactType")
        .and_then(Value::as_str)
        .and_then(CompactType::from_token)
        .unwrap_or(CompactType::Vertical)
}

fn arg_i32(args: &Value, key: &str) -> i32 {
    args[key].as_i64().unwrap_or_else(|| panic!("missing integer arg `{key}`")) as i32
}

fn run_layout_op(fixture: &Value, layout: Vec<LayoutItem>, rel: &str) -> Vec<LayoutItem> {
    let args = &fixture["args"];
    let compact_type = compact_type(fixture);
    match fixture["op"].as_str() {
        Some("compact") => compact(&layout, compact_type, COLS, false),
        Some("correctBounds") => {
            let mut layout = layout;
            correct_bounds(&mut layout, COLS);
            layout
        }
        Some("move") => {
            let options = MoveOptions::new(compact_type)
                .prevent_collision(args["preventCollision"].as_bool().unwrap_or(false));
            move_element(
                &layout,
                args["id"].as_str().expect("move needs an id"),
                Some(arg_i32(args, "x")),
                Some(arg_i32(args, "y")),
                &options,
            )
            .into_owned()
        }
        Some("sync") => {
            let children = parse_children(&args["children"]).expect("children parse");
            synchronize_layout_with_children(&layout, &children, COLS, compact_type, false, None)
        }
        other => panic!("{rel}: unsupported op {other:?}"),
    }
}

fn assert_layout(actual: &[LayoutItem], expected: &Value, rel: &str) {
    let expected = expected.as_array().expect("expected layout array");
    assert_eq!(actual.len(), expected.len(), "{rel}: item count");
    for want in expected {
        let id = want["i"].as_str().expect("expected item id");
        let got = actual
            .iter()
            .find(|item| item.id == id)
            .unwrap_or_else(|| panic!("{rel}: item {id} missing"));
        for (field, value) in [("x", got.x), ("y", got.y), ("w", got.w), ("h", got.h)] {
            if let Some(expected) = want.get(field).and_then(Value::as_i64) {
                assert_eq!(i64::from(value), expected, "{rel}: {id}.{field}");
            }
        }
    }
}

fn check_fixture(path: &Path, rel: &str) {
    let text = std::fs::read_to_string(path).expect("fixture read failed");
    let fixture: Value = serde_json::from_str(&text).expect("fixture is JSON");
    let layout = parse_layout(&fixture["layout"], "layout").expect("layout parse");
    let expect = &fixture["expect"];

    match fixture["op"].as_str() {
        Some("firstFit") | Some("nearestFit") => {
            let args = &fixture["args"];
            let size = GridSize::new(arg_i32(args, "w"), arg_i32(args, "h"));
            let found = if fixture["op"] == "firstFit" {
                find_first_fit(&layout, size, COLS, None)
            } else {
                let x = args["targetX"].as_f64().expect("targetX");
                let y = args["targetY"].as_f64().expect("targetY");
                find_nearest_fit(&layout, size, COLS, x, y, None)
            };
            let found = found.map(|point| (i64::from(point.x), i64::from(point.y)));
            let want = expect["point"]
                .as_object()
                .map(|point| (point["x"].as_i64().unwrap_or(-1), point["y"].as_i64().unwrap_or(-1)));
            assert_eq!(found, want, "{rel}: fit result");
        }
        _ => {
            let actual = run_layout_op(&fixture, layout, rel);
            assert_layout(&actual, &expect["layout"], rel);
        }
    }
}

#[test]
fn run_all_fixtures() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures");

    // Keep this list explicit so new scenarios must be added intentionally.
    let candidates = [
        "bounds/overflow_right.json",
        "compact/gaps.json",
        "compact/horizontal.json",
        "compact/static_anchor.json",
        "fit/full_row.json",
        "fit/nearest_right.json",
        "fit/too_wide.json",
        "move/prevent_collision.json",
        "move/push_down.json",
        "sync/append.json",
    ];

    for rel in candidates {
        let path = root.join(rel);
        assert!(path.exists(), "fixture missing: {}", rel);
        check_fixture(&path, rel);
    }
}
