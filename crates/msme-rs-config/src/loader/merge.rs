//! JSON merge helpers for layered configuration.

use serde_json::{Map, Value};

/// Fold layers (lowest precedence first) into one JSON object.
pub(super) fn merge_layers<'a>(layers: impl IntoIterator<Item = &'a Value>) -> Value {
    let mut merged = Value::Object(Map::new());
    for layer in layers {
        overlay(&mut merged, layer);
    }
    merged
}

/// Recursively overlay objects; arrays and scalars replace the base value.
fn overlay(base: &mut Value, top: &Value) {
    match (base, top) {
        (Value::Object(base_map), Value::Object(top_map)) => {
            for (key, value) in top_map {
                match base_map.get_mut(key) {
                    Some(existing) => overlay(existing, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (slot, value) => *slot = value.clone(),
    }
}
