//! Typed access to tool call arguments.

use crate::error::MaestroError;

/// Wrapper around tool call arguments providing typed extraction.
///
/// Models are loose about types, so numeric accessors also accept numbers
/// encoded as strings and list accessors accept a comma-separated string.
#[derive(Debug, Clone)]
pub struct ToolArguments {
    value: serde_json::Value,
}

impl ToolArguments {
    pub fn new(value: serde_json::Value) -> Self {
        Self { value }
    }

    /// Parse arguments that may arrive as a JSON-encoded string.
    ///
    /// An empty string or `null` becomes an empty object.
    pub fn normalize(value: serde_json::Value) -> Result<serde_json::Value, String> {
        match value {
            serde_json::Value::Null => Ok(serde_json::json!({})),
            serde_json::Value::String(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    Ok(serde_json::json!({}))
                } else {
                    serde_json::from_str(trimmed)
                        .map_err(|e| format!("arguments are not valid JSON: {e}"))
                }
            }
            other => Ok(other),
        }
    }

    /// Get a string argument by key.
    pub fn get_str(&self, key: &str) -> Result<&str, MaestroError> {
        self.value
            .get(key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| MaestroError::InvalidArgument(format!("Missing string argument: {key}")))
    }

    /// Get an optional string argument.
    pub fn get_str_opt(&self, key: &str) -> Option<&str> {
        self.value.get(key).and_then(|v| v.as_str())
    }

    /// Get an optional non-negative integer, accepting `"5"` as well as `5`.
    pub fn get_u64_opt(&self, key: &str) -> Result<Option<u64>, MaestroError> {
        match self.value.get(key) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(serde_json::Value::Number(n)) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
                .map(Some)
                .ok_or_else(|| {
                    MaestroError::InvalidArgument(format!("{key} must be a non-negative integer"))
                }),
            Some(serde_json::Value::String(s)) => s.trim().parse().map(Some).map_err(|_| {
                MaestroError::InvalidArgument(format!("{key} must be an integer, got '{s}'"))
            }),
            Some(other) => Err(MaestroError::InvalidArgument(format!(
                "{key} must be an integer, got {other}"
            ))),
        }
    }

    /// Get an optional list of strings. `null` counts as absent.
    pub fn get_string_list_opt(&self, key: &str) -> Result<Option<Vec<String>>, MaestroError> {
        match self.value.get(key) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(_) => self.get_string_list(key).map(Some),
        }
    }

    /// Get a list of strings from an array or a comma-separated string.
    pub fn get_string_list(&self, key: &str) -> Result<Vec<String>, MaestroError> {
        let missing = || MaestroError::InvalidArgument(format!("Missing list argument: {key}"));
        match self.value.get(key).ok_or_else(missing)? {
            serde_json::Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    serde_json::Value::String(s) => Ok(s.trim().to_string()),
                    other => Err(MaestroError::InvalidArgument(format!(
                        "{key} must contain strings, got {other}"
                    ))),
                })
                .filter(|item| !matches!(item, Ok(s) if s.is_empty()))
                .collect(),
            serde_json::Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.starts_with('[') {
                    let parsed: Vec<String> = serde_json::from_str(trimmed).map_err(|e| {
                        MaestroError::InvalidArgument(format!("{key} is not a valid list: {e}"))
                    })?;
                    return Ok(parsed);
                }
                Ok(trimmed
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect())
            }
            _ => Err(missing()),
        }
    }
}
