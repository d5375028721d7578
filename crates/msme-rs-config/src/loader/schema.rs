//! Structural checks applied to each raw JSON5 layer before merging.

use crate::ConfigError;
use serde_json::{Map, Value};

const ROOT_KEYS: &[&str] = &["$schema", "server", "chatlog", "admin", "chat", "versions"];

/// Validate a single config layer.
pub(super) fn validate_layer_schema(value: &Value, layer: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, "")?;
    ensure_allowed_keys(map, ROOT_KEYS, layer, "")?;

    if let Some(value) = map.get("$schema") {
        expect_string(value, layer, "$schema")?;
    }
    if let Some(value) = map.get("server") {
        validate_server(value, layer, "server")?;
    }
    if let Some(value) = map.get("chatlog") {
        validate_chatlog(value, layer, "chatlog")?;
    }
    if let Some(value) = map.get("admin") {
        validate_admin(value, layer, "admin")?;
    }
    if let Some(value) = map.get("chat") {
        validate_chat(value, layer, "chat")?;
    }
    if let Some(value) = map.get("versions") {
        validate_versions(value, layer, "versions")?;
    }
    Ok(())
}

fn validate_server(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["addr"], layer, path)?;
    check_strings(map, &["addr"], layer, path)
}

fn validate_chatlog(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["provider", "path"], layer, path)?;
    if let Some(value) = map.get("provider") {
        expect_one_of(value, &["file", "memory"], layer, &join_path(path, "provider"))?;
    }
    check_strings(map, &["path"], layer, path)
}

fn validate_admin(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(
        map,
        &["username", "password", "session_ttl_secs"],
        layer,
        path,
    )?;
    check_strings(map, &["username", "password"], layer, path)?;
    if let Some(value) = map.get("session_ttl_secs") {
        expect_u64(value, layer, &join_path(path, "session_ttl_secs"))?;
    }
    Ok(())
}

fn validate_chat(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    let strings = [
        "ollama_url",
        "default_model",
        "default_feature",
        "default_version",
    ];
    let mut allowed = vec!["engine", "timeout_secs"];
    allowed.extend(strings);
    ensure_allowed_keys(map, &allowed, layer, path)?;

    if let Some(value) = map.get("engine") {
        expect_one_of(value, &["echo", "ollama"], layer, &join_path(path, "engine"))?;
    }
    check_strings(map, &strings, layer, path)?;
    if let Some(value) = map.get("timeout_secs") {
        expect_u64(value, layer, &join_path(path, "timeout_secs"))?;
    }
    Ok(())
}

fn validate_versions(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["path"], layer, path)?;
    if let Some(value) = map.get("path").filter(|value| !value.is_null()) {
        expect_string(value, layer, &join_path(path, "path"))?;
    }
    Ok(())
}

/// Check that every listed key that is present holds a string.
fn check_strings(
    map: &Map<String, Value>,
    keys: &[&str],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    for key in keys {
        if let Some(value) = map.get(*key) {
            expect_string(value, layer, &join_path(path, key))?;
        }
    }
    Ok(())
}

fn expect_object<'a>(
    value: &'a Value,
    layer: &str,
    path: &str,
) -> Result<&'a Map<String, Value>, ConfigError> {
    value
        .as_object()
        .ok_or_else(|| invalid_field(layer, path, "expected object"))
}

fn expect_string(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    match value {
        Value::String(_) => Ok(()),
        _ => Err(invalid_field(layer, path, "expected string")),
    }
}

fn expect_u64(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_u64() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected non-negative integer"))
    }
}

/// Expect a string drawn from a fixed vocabulary.
fn expect_one_of(
    value: &Value,
    options: &[&str],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    match value.as_str() {
        Some(found) if options.contains(&found) => Ok(()),
        _ => Err(invalid_field(
            layer,
            path,
            &format!("expected one of: {}", options.join(", ")),
        )),
    }
}

fn ensure_allowed_keys(
    map: &Map<String, Value>,
    allowed: &[&str],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    match map.keys().find(|key| !allowed.contains(&key.as_str())) {
        Some(key) => Err(invalid_field(layer, &join_path(path, key), "unknown key")),
        None => Ok(()),
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn invalid_field(layer: &str, path: &str, message: &str) -> ConfigError {
    let path = if path.is_empty() { "root" } else { path };
    ConfigError::InvalidField {
        path: format!("{layer}:{path}"),
        message: message.to_string(),
    }
}
