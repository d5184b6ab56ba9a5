use serde_json::Value;

use crate::error::{LayoutError, Result, parse_layout, validate_layout};
use crate::layout::LayoutItem;

/// One entry of the collaborator's child list.
///
/// `key` is the child's identity (children without one are ignored by the
/// synchronizer); `grid` is an optional explicit geometry override.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildSpec {
    pub key: Option<String>,
    pub grid: Option<LayoutItem>,
}

impl ChildSpec {
    pub fn keyed(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            grid: None,
        }
    }

    pub fn with_grid(mut self, grid: LayoutItem) -> Self {
        self.grid = Some(grid);
        self
    }
}

/// Input accepted by the CLI and the WASM bindings: a bare layout array or an
/// object with `layout` and optional `children`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutDocument {
    pub layout: Vec<LayoutItem>,
    pub children: Option<Vec<ChildSpec>>,
}

pub fn parse_document(text: &str) -> Result<LayoutDocument> {
    let value: Value = serde_json::from_str(text)?;
    document_from_value(&value)
}

pub fn document_from_value(value: &Value) -> Result<LayoutDocument> {
    match value {
        Value::Array(_) => Ok(LayoutDocument {
            layout: parse_layout(value, "layout")?,
            children: None,
        }),
        Value::Object(fields) => {
            let layout = match fields.get("layout") {
                None | Some(Value::Null) => Vec::new(),
                Some(layout) => parse_layout(layout, "layout")?,
            };
            let children = match fields.get("children") {
                None | Some(Value::Null) => None,
                Some(children) => Some(parse_children(children)?),
            };
            Ok(LayoutDocument { layout, children })
        }
        _ => Err(LayoutError::NotAnArray {
            context: "layout".to_string(),
        }),
    }
}

fn child_key(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(key) => Some(key.clone()),
        Value::Number(key) => Some(key.to_string()),
        _ => None,
    }
}

/// Decode a child list. Each entry is a key (string or number) or an object
/// with `key` and an optional `grid` (alias `data-grid`).
pub fn parse_children(value: &Value) -> Result<Vec<ChildSpec>> {
    let Value::Array(entries) = value else {
        return Err(LayoutError::NotAnArray {
            context: "children".to_string(),
        });
    };

    let mut children = Vec::with_capacity(entries.len());
    for entry in entries {
        let child = match entry {
            Value::Object(fields) => {
                let key = child_key(fields.get("key"));
                let grid = fields
                    .get("grid")
                    .or_else(|| fields.get("data-grid"))
                    .filter(|grid| !grid.is_null());
                let grid = match grid {
                    Some(grid) => {
                        let single = Value::Array(vec![grid.clone()]);
                        validate_layout(&single, "children")?;
                        parse_layout(&single, "children")?.into_iter().next()
                    }
                    None => None,
                };
                ChildSpec { key, grid }
            }
            other => ChildSpec {
                key: child_key(Some(other)),
                grid: None,
            },
        };
        children.push(child);
    }
    Ok(children)
}
