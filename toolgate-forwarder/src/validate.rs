//! Argument checks applied before a call leaves the process.

use serde_json::{Map, Value};
use toolgate_catalog::OperationDescriptor;
use tracing::debug;

use crate::error::{ForwardError, ForwardResult};

/// Normalizes and checks call arguments against the operation's inputs.
///
/// `null` is treated as an empty object. Unknown arguments are kept but
/// ignored by request assembly.
///
/// # Errors
///
/// Returns [`ForwardError::InvalidArguments`] when the arguments are not an
/// object, a required argument is missing or `null`, or a supplied value
/// does not match the declared primitive type.
pub fn validate_arguments(
    operation: &OperationDescriptor,
    arguments: &Value,
) -> ForwardResult<Map<String, Value>> {
    let arguments = match arguments {
        Value::Null => Map::new(),
        Value::Object(map) => map.clone(),
        other => {
            return Err(ForwardError::invalid_arguments(
                "arguments",
                format!("expected an object, got {}", type_name(other)),
            ));
        }
    };

    for parameter in operation.parameters() {
        match arguments.get(parameter.argument()) {
            None | Some(Value::Null) if parameter.required() => {
                return Err(ForwardError::invalid_arguments(
                    parameter.argument(),
                    "required argument is missing",
                ));
            }
            Some(value) if !value.is_null() => {
                if let Some(expected) = declared_types(parameter.schema()) {
                    if !expected.iter().any(|kind| matches_type(value, kind)) {
                        return Err(ForwardError::invalid_arguments(
                            parameter.argument(),
                            format!(
                                "expected {}, got {}",
                                expected.join(" or "),
                                type_name(value)
                            ),
                        ));
                    }
                }
            }
            _ => {}
        }
    }

    for name in arguments.keys() {
        if !operation.parameters().iter().any(|p| p.argument() == name) {
            debug!(operation = %operation.id(), argument = %name, "ignoring unknown argument");
        }
    }

    Ok(arguments)
}

fn declared_types(schema: &Value) -> Option<Vec<&str>> {
    match schema.get("type")? {
        Value::String(kind) => Some(vec![kind.as_str()]),
        Value::Array(kinds) => {
            let kinds: Vec<&str> = kinds.iter().filter_map(Value::as_str).collect();
            (!kinds.is_empty()).then_some(kinds)
        }
        _ => None,
    }
}

fn matches_type(value: &Value, kind: &str) -> bool {
    match kind {
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(number) if number.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use toolgate_catalog::OperationCatalog;

    fn catalog() -> OperationCatalog {
        OperationCatalog::from_document(&json!({
            "openapi": "3.0.0",
            "info": {"title": "t", "version": "1"},
            "paths": {"/dags/{dag_id}": {
                "parameters": [{"name": "dag_id", "in": "path", "schema": {"type": "string"}}],
                "patch": {
                    "operationId": "patch_dag",
                    "parameters": [{"name": "update_mask", "in": "query", "schema": {"type": "array", "items": {"type": "string"}}}],
                    "requestBody": {"content": {"application/json": {"schema": {
                        "type": "object",
                        "properties": {"is_paused": {"type": "boolean"}, "retries": {"type": "integer", "nullable": true}}
                    }}}}
                }
            }}
        }))
        .unwrap()
    }

    #[test]
    fn accepts_well_typed_arguments() {
        let catalog = catalog();
        let op = catalog.get("patch_dag").unwrap();
        let args = validate_arguments(
            op,
            &json!({"dag_id": "etl", "is_paused": true, "retries": null, "extra": 1}),
        )
        .unwrap();
        assert_eq!(args.len(), 4);
    }

    #[test]
    fn missing_required_argument_named() {
        let catalog = catalog();
        let op = catalog.get("patch_dag").unwrap();
        let err = validate_arguments(op, &Value::Null).expect_err("dag_id required");
        assert!(matches!(
            err,
            ForwardError::InvalidArguments { ref argument, .. } if argument == "dag_id"
        ));
    }

    #[test]
    fn wrong_type_rejected() {
        let catalog = catalog();
        let op = catalog.get("patch_dag").unwrap();
        let err = validate_arguments(op, &json!({"dag_id": "etl", "retries": 1.5}))
            .expect_err("integer expected");
        assert!(err.to_string().contains("retries"));

        let err = validate_arguments(op, &json!(["etl"])).expect_err("not an object");
        assert!(err.to_string().contains("expected an object"));
    }
}
