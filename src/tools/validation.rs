//! Validate tool call arguments against a schema before execution.
//!
//! Only shape and presence are checked: arguments must be an object when the
//! schema says so, and every `required` field must be present. Value types
//! are left to the handler, which reads them leniently.

/// Returns `Err(message)` describing the first violation found.
pub fn validate_arguments(
    args: &serde_json::Value,
    schema: &serde_json::Value,
) -> Result<(), String> {
    if let Some(schema_type) = schema.get("type").and_then(|v| v.as_str()) {
        if schema_type == "object" && !args.is_object() {
            return Err(format!(
                "expected object arguments, got {}",
                json_type_name(args)
            ));
        }
    }

    if let Some(required) = schema.get("required").and_then(|v| v.as_array()) {
        let Some(obj) = args.as_object() else {
            return Ok(());
        };
        for name in required.iter().filter_map(|v| v.as_str()) {
            match obj.get(name) {
                None | Some(serde_json::Value::Null) => {
                    return Err(format!("missing required field '{name}'"));
                }
                _ => {}
            }
        }
    }

    Ok(())
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
