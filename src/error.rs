use serde_json::Value;

use crate::layout::LayoutItem;

/// Structural problems found at the collaborator boundary.
///
/// The layout algebra itself never fails; these errors only come from
/// validating or decoding host-supplied data.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("{context} must be an array!")]
    NotAnArray { context: String },
    #[error("{context}[{index}].{field} must be a number! Received: {received} ({kind})")]
    InvalidField {
        context: String,
        index: usize,
        field: &'static str,
        received: String,
        kind: &'static str,
    },
    #[error("{context}[{index}].i must be a string! Received: {received} ({kind})")]
    InvalidId {
        context: String,
        index: usize,
        received: String,
        kind: &'static str,
    },
    #[error("invalid layout JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LayoutError>;

const GEOMETRY_FIELDS: [&str; 4] = ["x", "y", "w", "h"];
const INTEGER_FIELDS: [&str; 8] = ["x", "y", "w", "h", "minW", "maxW", "minH", "maxH"];

// Names as a JavaScript host would report them.
fn kind_of(value: Option<&Value>) -> &'static str {
    match value {
        None => "undefined",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Null | Value::Array(_) | Value::Object(_)) => "object",
    }
}

fn describe(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Object(_)) => "[object Object]".to_string(),
        Some(other) => other.to_string(),
    }
}

/// Check that `value` is an array of items with numeric `x`, `y`, `w`, `h` and,
/// when present, a string `i`.
pub fn validate_layout(value: &Value, context: &str) -> Result<()> {
    let Value::Array(items) = value else {
        return Err(LayoutError::NotAnArray {
            context: context.to_string(),
        });
    };
    for (index, item) in items.iter().enumerate() {
        for field in GEOMETRY_FIELDS {
            let found = item.get(field);
            if !matches!(found, Some(Value::Number(_))) {
                return Err(LayoutError::InvalidField {
                    context: context.to_string(),
                    index,
                    field,
                    received: describe(found),
                    kind: kind_of(found),
                });
            }
        }
        if let Some(id) = item.get("i") {
            if !id.is_string() {
                return Err(LayoutError::InvalidId {
                    context: context.to_string(),
                    index,
                    received: describe(Some(id)),
                    kind: kind_of(Some(id)),
                });
            }
        }
    }
    Ok(())
}

fn to_grid_unit(number: &serde_json::Number) -> Option<i64> {
    if let Some(value) = number.as_i64() {
        return Some(value);
    }
    if number.as_u64().is_some() {
        return Some(i64::MAX);
    }
    number.as_f64().map(|value| value.floor() as i64)
}

/// Validate then decode a layout. Fractional geometry is floored to whole grid
/// units and out-of-range numbers saturate at the `i32` limits.
pub fn parse_layout(value: &Value, context: &str) -> Result<Vec<LayoutItem>> {
    validate_layout(value, context)?;
    let mut value = value.clone();
    if let Value::Array(items) = &mut value {
        for item in items.iter_mut() {
            let Value::Object(fields) = item else {
                continue;
            };
            for field in INTEGER_FIELDS {
                let Some(Value::Number(number)) = fields.get(field) else {
                    continue;
                };
                if let Some(unit) = to_grid_unit(number) {
                    let unit = unit.clamp(i64::from(i32::MIN), i64::from(i32::MAX));
                    fields.insert(field.to_string(), Value::from(unit));
                }
            }
        }
    }
    Ok(serde_json::from_value(value)?)
}

pub fn parse_layout_str(text: &str, context: &str) -> Result<Vec<LayoutItem>> {
    let value: Value = serde_json::from_str(text)?;
    parse_layout(&value, context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_non_arrays() {
        let err = validate_layout(&json!({"i": "a"}), "Layout").unwrap_err();
        assert_eq!(err.to_string(), "Layout must be an array!");
    }

    #[test]
    fn reports_first_bad_field() {
        let value = json!([{"i": "a", "x": 0, "y": 0, "w": 1, "h": 1}, {"i": "b", "x": 0, "y": "2", "w": 1, "h": 1}]);
        let err = validate_layout(&value, "Layout").unwrap_err();
        assert_eq!(err.to_string(), "Layout[1].y must be a number! Received: 2 (string)");
    }

    #[test]
    fn reports_missing_field_as_undefined() {
        let err = validate_layout(&json!([{"x": 0, "y": 0, "w": 1}]), "children").unwrap_err();
        assert_eq!(
            err.to_string(),
            "children[0].h must be a number! Received: undefined (undefined)"
        );
    }

    #[test]
    fn rejects_non_string_id() {
        let err = validate_layout(&json!([{"i": 7, "x": 0, "y": 0, "w": 1, "h": 1}]), "Layout")
            .unwrap_err();
        assert!(matches!(err, LayoutError::InvalidId { index: 0, .. }));
        assert_eq!(err.to_string(), "Layout[0].i must be a string! Received: 7 (number)");
    }

    #[test]
    fn missing_id_is_allowed_by_validation() {
        assert!(validate_layout(&json!([{"x": 0, "y": 0, "w": 1, "h": 1}]), "Layout").is_ok());
    }

    #[test]
    fn parse_floors_fractional_units() {
        let value = json!([{"i": "a", "x": 1.7, "y": 2.2, "w": 3.0, "h": 1, "minW": 1.5, "static": true}]);
        let layout = parse_layout(&value, "Layout").expect("valid layout");
        assert_eq!((layout[0].x, layout[0].y, layout[0].w, layout[0].h), (1, 2, 3, 1));
        assert_eq!(layout[0].min_w, Some(1));
        assert!(layout[0].is_static);
    }

    #[test]
    fn parse_saturates_huge_numbers() {
        let value = json!([{"i": "a", "x": 0, "y": 1e300, "w": 1, "h": 1}]);
        let layout = parse_layout(&value, "Layout").expect("valid layout");
        assert_eq!(layout[0].y, i32::MAX);
    }

    #[test]
    fn parse_str_reports_bad_json() {
        assert!(matches!(parse_layout_str("[", "Layout"), Err(LayoutError::Decode(_))));
    }
}
