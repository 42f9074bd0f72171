//! Path lookups into JSON response bodies.
//!
//! Supports the subset of JSONPath that validators actually need: `$` for
//! the whole document, dotted field access like `$.user.name`, and array
//! indexing like `$.items[2].id`.

use serde_json::Value;

use crate::error::LookupError;

pub(crate) fn resolve(json: &Value, path: &str) -> Result<Value, LookupError> {
    let trimmed = path.trim();
    let Some(rest) = trimmed.strip_prefix('$') else {
        return Err(LookupError::Path {
            path: path.to_string(),
            reason: "path must start with `$`".to_string(),
        });
    };
    let rest = rest.strip_prefix('.').unwrap_or(rest);
    if rest.is_empty() {
        return Ok(json.clone());
    }

    let mut current = json;
    for segment in split_segments(rest) {
        current = match parse_index(&segment) {
            Some((name, index)) => {
                let array = if name.is_empty() {
                    current
                } else {
                    current
                        .get(name)
                        .ok_or_else(|| missing(path, name))?
                };
                let index: usize = index.parse().map_err(|_| LookupError::Path {
                    path: path.to_string(),
                    reason: format!("invalid array index `{index}`"),
                })?;
                array.get(index).ok_or_else(|| LookupError::Path {
                    path: path.to_string(),
                    reason: format!("index {index} out of bounds"),
                })?
            }
            None => current
                .get(segment.as_str())
                .ok_or_else(|| missing(path, &segment))?,
        };
    }
    Ok(current.clone())
}

fn missing(path: &str, segment: &str) -> LookupError {
    LookupError::Path {
        path: path.to_string(),
        reason: format!("no value named `{segment}`"),
    }
}

fn split_segments(path: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_bracket = false;
    for ch in path.chars() {
        match ch {
            '.' if !in_bracket => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
            '[' => {
                in_bracket = true;
                current.push(ch);
            }
            ']' => {
                in_bracket = false;
                current.push(ch);
            }
            _ => current.push(ch),
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// Split `items[2]` into `("items", "2")`; `None` when there is no bracket.
fn parse_index(segment: &str) -> Option<(&str, &str)> {
    let bracket = segment.find('[')?;
    if !segment.ends_with(']') {
        return None;
    }
    Some((&segment[..bracket], &segment[bracket + 1..segment.len() - 1]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolves_nested_fields() {
        let data = json!({"user": {"name": "ada", "id": 7}});
        assert_eq!(resolve(&data, "$.user.name").unwrap(), json!("ada"));
        assert_eq!(resolve(&data, "$.user.id").unwrap(), json!(7));
    }

    #[test]
    fn resolves_array_indices() {
        let data = json!({"items": [{"id": 1}, {"id": 2}]});
        assert_eq!(resolve(&data, "$.items[1].id").unwrap(), json!(2));
    }

    #[test]
    fn dollar_returns_whole_document() {
        let data = json!({"ok": true});
        assert_eq!(resolve(&data, "$").unwrap(), data);
    }

    #[test]
    fn missing_field_is_an_error() {
        let data = json!({"present": 1});
        let err = resolve(&data, "$.absent").unwrap_err();
        assert!(matches!(err, LookupError::Path { .. }));
    }

    #[test]
    fn out_of_bounds_index_is_an_error() {
        let data = json!({"items": [1]});
        assert!(resolve(&data, "$.items[3]").is_err());
    }

    #[test]
    fn path_must_start_with_dollar() {
        let data = json!({"field": 1});
        assert!(resolve(&data, "field").is_err());
    }
}
