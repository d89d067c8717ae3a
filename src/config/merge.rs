//! Settings merge logic
//!
//! Layers are JSON values merged in precedence order:
//! - Objects: deep-merge by key
//! - Arrays: REPLACE (last wins, so exclude lists never accumulate)
//! - Scalars: override (last wins)

use serde_json::Value;

/// Deep merge two JSON values, `overlay` taking precedence.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }

        (Value::Array(_), overlay @ Value::Array(_)) => overlay,

        // An absent CLI value is encoded as null and must not erase a lower layer.
        (base, Value::Null) => base,

        (_, overlay) => overlay,
    }
}

/// Merge layers in order (first is base, last has highest precedence).
pub fn merge_layers(layers: Vec<Value>) -> Value {
    layers.into_iter().fold(Value::Null, deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_override() {
        let result = deep_merge(json!({"build": {"jobs": 2}}), json!({"build": {"jobs": 8}}));
        assert_eq!(result["build"]["jobs"], 8);
    }

    #[test]
    fn test_object_deep_merge() {
        let base = json!({
            "paths": {
                "source_dir": "/opentx",
                "build_dir": "/build"
            }
        });
        let overlay = json!({
            "paths": {
                "build_dir": "/tmp/build"
            }
        });
        let result = deep_merge(base, overlay);

        assert_eq!(result["paths"]["build_dir"], "/tmp/build");
        assert_eq!(result["paths"]["source_dir"], "/opentx");
    }

    #[test]
    fn test_array_replace() {
        let base = json!({"source": {"exclude": [".git"]}});
        let overlay = json!({"source": {"exclude": ["*.o"]}});
        let result = deep_merge(base, overlay);

        let exclude = result["source"]["exclude"].as_array().unwrap();
        assert_eq!(exclude.len(), 1);
        assert_eq!(exclude[0], "*.o");
    }

    #[test]
    fn test_null_keeps_base() {
        let result = deep_merge(json!({"board": "x9d"}), json!({"board": null}));
        assert_eq!(result["board"], "x9d");
    }

    #[test]
    fn test_merge_layers() {
        let builtin = json!({"build": {"jobs": 2, "clean": true}});
        let file = json!({"board": "x7", "build": {"jobs": 4}});
        let env = json!({"board": "t16"});
        let cli = json!({"build": {"clean": false}});

        let result = merge_layers(vec![builtin, file, env, cli]);

        assert_eq!(result["board"], "t16");
        assert_eq!(result["build"]["jobs"], 4);
        assert_eq!(result["build"]["clean"], false);
    }
}
