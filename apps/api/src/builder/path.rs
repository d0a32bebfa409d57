//! Dot-separated path access over JSON objects (`personalInfo.name`).

use serde_json::{Map, Value};

/// Walks `root` along `path`. Any missing or non-object intermediate yields `None`.
pub fn get<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(root, |node, key| node.as_object()?.get(key))
}

/// Writes `value` at `path`, creating intermediate objects as needed.
///
/// Takes `root` by value and returns the updated tree, so no caller-held reference
/// can observe the write. Non-object intermediates (and a non-object root) are
/// replaced with empty objects.
pub fn set(root: Value, path: &str, value: Value) -> Value {
    let mut keys = path.split('.');
    match keys.next() {
        Some(first) => set_keys(root, first, keys, value),
        None => value,
    }
}

fn set_keys<'a>(
    node: Value,
    key: &str,
    mut rest: impl Iterator<Item = &'a str>,
    value: Value,
) -> Value {
    let mut map = match node {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    let child = match rest.next() {
        Some(next) => {
            let existing = map.remove(key).unwrap_or(Value::Null);
            set_keys(existing, next, rest, value)
        }
        None => value,
    };
    map.insert(key.to_string(), child);
    Value::Object(map)
}
