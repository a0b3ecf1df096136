//! Recursive structural merge of layered JSON configuration.
//!
//! For every key of the override: when both sides hold an object the merge
//! recurses, otherwise the override value replaces the base value wholesale.
//! Arrays are atomic. Later layers win, so the operation is not commutative.
//!
//! ```
//! use serde_json::json;
//! use rsnap_config::merge;
//!
//! let base = json!({"a": {"x": 1, "y": 2}, "b": 5});
//! let merged = merge(&base, &json!({"a": {"y": 9}}));
//! assert_eq!(merged, json!({"a": {"x": 1, "y": 9}, "b": 5}));
//! ```

use serde_json::Value;

/// Merge `overlay` on top of `base`, returning a new value.
///
/// When either side is not an object the overlay is returned as-is.
pub fn merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            let mut out = base_map.clone();
            for (key, value) in overlay_map {
                let merged = match out.get(key) {
                    Some(existing @ Value::Object(_)) if value.is_object() => merge(existing, value),
                    _ => value.clone(),
                };
                out.insert(key.clone(), merged);
            }
            Value::Object(out)
        }
        _ => overlay.clone(),
    }
}

/// Fold a stack of layers left to right. An empty stack yields an empty object.
pub fn merge_all<'a, I>(layers: I) -> Value
where
    I: IntoIterator<Item = &'a Value>,
{
    layers
        .into_iter()
        .fold(Value::Object(Default::default()), |acc, layer| {
            merge(&acc, layer)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_merge() {
        let base = json!({"a": {"x": 1, "y": 2}, "b": 5});
        let over = json!({"a": {"y": 9}});
        assert_eq!(merge(&base, &over), json!({"a": {"x": 1, "y": 9}, "b": 5}));
    }

    #[test]
    fn test_override_replaces_mapping_with_scalar() {
        let base = json!({"legend": {"display": true}});
        let over = json!({"legend": false});
        assert_eq!(merge(&base, &over), json!({"legend": false}));
    }

    #[test]
    fn test_override_replaces_scalar_with_mapping() {
        let base = json!({"title": "CPU"});
        let over = json!({"title": {"text": "CPU", "display": true}});
        assert_eq!(merge(&base, &over), over);
    }

    #[test]
    fn test_arrays_are_atomic() {
        let base = json!({"colors": ["#111", "#222", "#333"]});
        let over = json!({"colors": ["#fff"]});
        assert_eq!(merge(&base, &over), json!({"colors": ["#fff"]}));
    }

    #[test]
    fn test_not_commutative() {
        let a = json!({"k": 1});
        let b = json!({"k": 2});
        assert_ne!(merge(&a, &b), merge(&b, &a));
    }

    #[test]
    fn test_null_override_wins() {
        let base = json!({"k": {"deep": 1}});
        assert_eq!(merge(&base, &json!({"k": null})), json!({"k": null}));
    }

    #[test]
    fn test_merge_all_later_layers_win() {
        let layers = [json!({"v": 1, "keep": true}), json!({"v": 2}), json!({"v": 3})];
        assert_eq!(merge_all(&layers), json!({"v": 3, "keep": true}));
        assert_eq!(merge_all(std::iter::empty()), json!({}));
    }
}
