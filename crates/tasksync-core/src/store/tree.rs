//! JSON tree helpers
//!
//! The realtime database is one JSON tree addressed by slash-separated paths.
//! Writing `null` deletes a node, and objects left empty by a delete vanish
//! with it.

use serde_json::{Map, Value};

use super::segments;

/// Get the node at `path`, if present
pub fn get<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    segments(path).try_fold(root, |node, seg| node.get(seg))
}

/// Replace the node at `path`; `null` deletes it
pub fn set(root: &mut Value, path: &str, value: Value) {
    let parts: Vec<&str> = segments(path).collect();
    set_parts(root, &parts, value);
}

/// Merge `children` into the object at `path`, one `set` per child
pub fn merge(root: &mut Value, path: &str, children: Map<String, Value>) {
    let base: Vec<&str> = segments(path).collect();
    for (key, value) in children {
        // Patch keys may themselves be multi-segment paths
        let mut parts = base.clone();
        parts.extend(segments(&key));
        set_parts(root, &parts, value);
    }
}

fn set_parts(node: &mut Value, parts: &[&str], value: Value) {
    let Some((first, rest)) = parts.split_first() else {
        *node = value;
        return;
    };

    if value.is_null() {
        let Value::Object(map) = node else {
            return;
        };
        if rest.is_empty() {
            map.remove(*first);
        } else if let Some(child) = map.get_mut(*first) {
            set_parts(child, rest, Value::Null);
            if is_empty_node(child) {
                map.remove(*first);
            }
        }
        return;
    }

    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Value::Object(map) = node {
        let child = map.entry(first.to_string()).or_insert(Value::Null);
        set_parts(child, rest, value);
    }
}

fn is_empty_node(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_creates_intermediate_objects() {
        let mut root = Value::Null;
        set(&mut root, "tasks/a", json!({"title": "A"}));
        assert_eq!(root, json!({"tasks": {"a": {"title": "A"}}}));
        assert_eq!(get(&root, "tasks/a/title"), Some(&json!("A")));
    }

    #[test]
    fn test_set_root_replaces_everything() {
        let mut root = json!({"x": 1});
        set(&mut root, "/", json!({"y": 2}));
        assert_eq!(root, json!({"y": 2}));
    }

    #[test]
    fn test_null_deletes_and_prunes() {
        let mut root = json!({"tasks": {"a": {"title": "A"}}, "other": 1});
        set(&mut root, "tasks/a", Value::Null);
        assert_eq!(root, json!({"other": 1}));
        assert!(get(&root, "tasks").is_none());
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let mut root = json!({"tasks": {"a": 1}});
        set(&mut root, "tasks/b/c", Value::Null);
        assert_eq!(root, json!({"tasks": {"a": 1}}));
    }

    #[test]
    fn test_merge_updates_only_named_children() {
        let mut root = json!({"tasks": {"a": {"title": "A", "completed": false}}});
        let patch = json!({"completed": true}).as_object().cloned().unwrap();
        merge(&mut root, "tasks/a", patch);
        assert_eq!(root, json!({"tasks": {"a": {"title": "A", "completed": true}}}));
    }

    #[test]
    fn test_merge_with_nested_keys() {
        let mut root = json!({"a": {"title": "A"}});
        let patch = json!({"a/completed": true, "b": {"title": "B"}})
            .as_object()
            .cloned()
            .unwrap();
        merge(&mut root, "/", patch);
        assert_eq!(
            root,
            json!({"a": {"title": "A", "completed": true}, "b": {"title": "B"}})
        );
    }
}
