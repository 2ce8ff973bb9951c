//! Operation descriptors derived from an API description.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::{Map, Value, json};
use thiserror::Error;
use toolgate_primitives::{HttpMethod, OperationId, SafetyClass};
use tracing::debug;

use crate::classifier::classify;
use crate::resolver::{RefError, RefResolver};

/// Header parameters that the forwarder always controls itself.
const RESERVED_HEADERS: [&str; 3] = ["authorization", "accept", "content-type"];

/// Where an argument travels on the outbound request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterLocation {
    /// Substituted into the path template.
    Path,
    /// Appended to the query string.
    Query,
    /// Sent as a request header.
    Header,
    /// Part of the JSON request body.
    Body,
}

impl ParameterLocation {
    fn prefix(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
            Self::Body => "body",
        }
    }
}

/// One declared input of an operation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ParameterSpec {
    argument: String,
    wire_name: String,
    location: ParameterLocation,
    required: bool,
    schema: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl ParameterSpec {
    /// Name of the argument in the tool input schema.
    #[must_use]
    pub fn argument(&self) -> &str {
        &self.argument
    }

    /// Name used on the wire. Empty for a whole-body argument.
    #[must_use]
    pub fn wire_name(&self) -> &str {
        &self.wire_name
    }

    /// Where the value is placed on the outbound request.
    #[must_use]
    pub const fn location(&self) -> ParameterLocation {
        self.location
    }

    /// Whether the caller must supply the argument.
    #[must_use]
    pub const fn required(&self) -> bool {
        self.required
    }

    /// JSON schema of the argument with references inlined.
    #[must_use]
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Optional human-readable description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn schema_for_listing(&self) -> Value {
        let mut schema = self.schema.clone();
        if let (Some(description), Value::Object(map)) = (&self.description, &mut schema) {
            map.entry("description")
                .or_insert_with(|| Value::from(description.clone()));
        }
        schema
    }
}

/// How the request body is assembled from arguments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyShape {
    /// Object body whose properties are individual arguments.
    Fields,
    /// Any other body, passed through as a single argument.
    Whole,
}

/// Request body declaration of an operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RequestBodySpec {
    shape: BodyShape,
    required: bool,
    content_type: String,
}

impl RequestBodySpec {
    /// Returns how the body is assembled.
    #[must_use]
    pub const fn shape(&self) -> BodyShape {
        self.shape
    }

    /// Returns whether the description marks the body as required.
    #[must_use]
    pub const fn required(&self) -> bool {
        self.required
    }

    /// Returns the media type the body is sent as.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }
}

/// One described remote operation. Immutable once loaded.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OperationDescriptor {
    id: OperationId,
    method: HttpMethod,
    path: String,
    parameters: Vec<ParameterSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<RequestBodySpec>,
    input_schema: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    safety: SafetyClass,
}

impl OperationDescriptor {
    /// Stable identifier, also used as the tool name.
    #[must_use]
    pub fn id(&self) -> &OperationId {
        &self.id
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    /// Path template, e.g. `/dags/{dag_id}`.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path, query, header, and body-field parameters.
    #[must_use]
    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    /// Request body declaration, if any.
    #[must_use]
    pub fn body(&self) -> Option<&RequestBodySpec> {
        self.body.as_ref()
    }

    /// Flat JSON object schema accepted by the tool.
    #[must_use]
    pub fn input_schema(&self) -> &Value {
        &self.input_schema
    }

    /// JSON schema of the successful response, when declared.
    #[must_use]
    pub fn response_schema(&self) -> Option<&Value> {
        self.response_schema.as_ref()
    }

    /// Declared tags in declaration order.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// First non-blank tag with surrounding whitespace removed, used as the
    /// primary category.
    #[must_use]
    pub fn primary_tag(&self) -> Option<&str> {
        self.tags
            .iter()
            .map(String::as_str)
            .map(str::trim)
            .find(|tag| !tag.is_empty())
    }

    /// Short summary.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Long description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Text shown to agents: description, then summary, then method and path.
    #[must_use]
    pub fn display_description(&self) -> String {
        self.description
            .as_deref()
            .or(self.summary.as_deref())
            .map_or_else(|| format!("{} {}", self.method, self.path), str::to_owned)
    }

    /// One-line label used in category listings: summary, then description.
    #[must_use]
    pub fn display_summary(&self) -> String {
        self.summary
            .as_deref()
            .or(self.description.as_deref())
            .map_or_else(|| format!("{} {}", self.method, self.path), |text| {
                text.lines().next().unwrap_or_default().trim().to_owned()
            })
    }

    /// Safety class computed from the method.
    #[must_use]
    pub const fn safety(&self) -> SafetyClass {
        self.safety
    }
}

/// Reasons a single operation could not be described.
#[derive(Debug, Error)]
pub(crate) enum DescriptorError {
    #[error(transparent)]
    Reference(#[from] RefError),
    #[error(transparent)]
    Identifier(#[from] toolgate_primitives::Error),
    #[error("{0}")]
    Malformed(String),
}

/// Builds the descriptor for one `(method, path)` entry of the document.
pub(crate) fn describe(
    resolver: &RefResolver<'_>,
    method: HttpMethod,
    path: &str,
    path_item: &Value,
    operation: &Value,
) -> Result<OperationDescriptor, DescriptorError> {
    if !operation.is_object() {
        return Err(DescriptorError::Malformed(
            "operation must be an object".into(),
        ));
    }

    let id = match operation.get("operationId") {
        Some(Value::String(id)) => OperationId::new(id.clone())?,
        Some(_) => {
            return Err(DescriptorError::Malformed(
                "`operationId` must be a string".into(),
            ));
        }
        None => OperationId::fallback(method.as_str(), path),
    };

    let mut parameters = collect_parameters(resolver, path_item, operation)?;
    check_path_template(path, &parameters)?;

    let body = match describe_body(resolver, operation, &parameters)? {
        Some((spec, fields)) => {
            parameters.extend(fields);
            Some(spec)
        }
        None => None,
    };

    let response_schema = response_schema(resolver, operation)?;
    let tags = operation
        .get("tags")
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();

    Ok(OperationDescriptor {
        input_schema: input_schema(&parameters),
        id,
        method,
        path: path.to_owned(),
        parameters,
        body,
        response_schema,
        tags,
        summary: text_field(operation, "summary"),
        description: text_field(operation, "description"),
        safety: classify(method),
    })
}

fn text_field(operation: &Value, key: &str) -> Option<String> {
    operation
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

fn collect_parameters(
    resolver: &RefResolver<'_>,
    path_item: &Value,
    operation: &Value,
) -> Result<Vec<ParameterSpec>, DescriptorError> {
    let mut merged: Vec<ParameterSpec> = Vec::new();

    for source in [path_item.get("parameters"), operation.get("parameters")]
        .into_iter()
        .flatten()
    {
        let Some(list) = source.as_array() else {
            return Err(DescriptorError::Malformed(
                "`parameters` must be a list".into(),
            ));
        };

        for (index, raw) in list.iter().enumerate() {
            let raw = resolver.follow(raw)?;
            let Some(spec) = parameter_spec(resolver, raw, index)? else {
                continue;
            };
            match merged
                .iter_mut()
                .find(|p| p.wire_name == spec.wire_name && p.location == spec.location)
            {
                Some(existing) => *existing = spec,
                None => merged.push(spec),
            }
        }
    }

    let mut taken = HashSet::new();
    for spec in &mut merged {
        if !taken.insert(spec.argument.clone()) {
            spec.argument = format!("{}_{}", spec.location.prefix(), spec.wire_name);
            taken.insert(spec.argument.clone());
        }
    }

    Ok(merged)
}

fn parameter_spec(
    resolver: &RefResolver<'_>,
    raw: &Value,
    index: usize,
) -> Result<Option<ParameterSpec>, DescriptorError> {
    let name = raw.get("name").and_then(Value::as_str).ok_or_else(|| {
        DescriptorError::Malformed(format!("parameter #{index} is missing `name`"))
    })?;
    let location = raw.get("in").and_then(Value::as_str).ok_or_else(|| {
        DescriptorError::Malformed(format!("parameter `{name}` is missing `in`"))
    })?;

    let location = match location {
        "path" => ParameterLocation::Path,
        "query" => ParameterLocation::Query,
        "header" if RESERVED_HEADERS.contains(&name.to_ascii_lowercase().as_str()) => {
            debug!(parameter = name, "ignoring reserved header parameter");
            return Ok(None);
        }
        "header" => ParameterLocation::Header,
        "cookie" => {
            debug!(parameter = name, "ignoring cookie parameter");
            return Ok(None);
        }
        other => {
            return Err(DescriptorError::Malformed(format!(
                "parameter `{name}` has unknown location `{other}`"
            )));
        }
    };

    let schema = match raw.get("schema") {
        Some(schema) => resolver.inline(schema)?,
        None => raw
            .get("content")
            .and_then(Value::as_object)
            .and_then(|content| content.values().next())
            .and_then(|media| media.get("schema"))
            .map(|schema| resolver.inline(schema))
            .transpose()?
            .unwrap_or_else(|| json!({"type": "string"})),
    };

    Ok(Some(ParameterSpec {
        argument: name.to_owned(),
        wire_name: name.to_owned(),
        location,
        required: location == ParameterLocation::Path
            || raw.get("required").and_then(Value::as_bool).unwrap_or(false),
        schema: widen_nullable(schema),
        description: text_field(raw, "description"),
    }))
}

fn check_path_template(path: &str, parameters: &[ParameterSpec]) -> Result<(), DescriptorError> {
    let mut rest = path;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            return Err(DescriptorError::Malformed(format!(
                "unterminated template in path `{path}`"
            )));
        };
        let name = &rest[start + 1..start + len];
        let declared = parameters
            .iter()
            .any(|p| p.location == ParameterLocation::Path && p.wire_name == name);
        if !declared {
            return Err(DescriptorError::Malformed(format!(
                "path parameter `{name}` is not declared"
            )));
        }
        rest = &rest[start + len + 1..];
    }
    Ok(())
}

fn describe_body(
    resolver: &RefResolver<'_>,
    operation: &Value,
    parameters: &[ParameterSpec],
) -> Result<Option<(RequestBodySpec, Vec<ParameterSpec>)>, DescriptorError> {
    let Some(raw) = operation.get("requestBody") else {
        return Ok(None);
    };
    let body = resolver.follow(raw)?;
    let required = body.get("required").and_then(Value::as_bool).unwrap_or(false);
    let Some(content) = body.get("content").and_then(Value::as_object) else {
        return Ok(None);
    };

    let chosen = content
        .get_key_value("application/json")
        .or_else(|| content.iter().find(|(media, _)| media.contains("json")))
        .or_else(|| content.iter().next());
    let Some((content_type, media)) = chosen else {
        return Ok(None);
    };

    let schema = media
        .get("schema")
        .map(|schema| resolver.inline(schema))
        .transpose()?
        .unwrap_or_else(|| json!({}));
    let schema = merge_all_of(&schema);

    let spec = RequestBodySpec {
        shape: BodyShape::Whole,
        required,
        content_type: content_type.clone(),
    };

    let taken: HashSet<&str> = parameters.iter().map(ParameterSpec::argument).collect();

    let properties = schema.get("properties").and_then(Value::as_object);
    let is_object = schema.get("type").and_then(Value::as_str) == Some("object");
    if let Some(properties) = properties.filter(|props| is_object || !props.is_empty()) {
        let required_fields: HashSet<&str> = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let fields = properties
            .iter()
            .map(|(name, field_schema)| ParameterSpec {
                argument: if taken.contains(name.as_str()) {
                    format!("body_{name}")
                } else {
                    name.clone()
                },
                wire_name: name.clone(),
                location: ParameterLocation::Body,
                required: required_fields.contains(name.as_str()),
                schema: widen_nullable(field_schema.clone()),
                description: None,
            })
            .collect();

        return Ok(Some((
            RequestBodySpec {
                shape: BodyShape::Fields,
                ..spec
            },
            fields,
        )));
    }

    let argument = if taken.contains("body") {
        "request_body".to_owned()
    } else {
        "body".to_owned()
    };
    let whole = ParameterSpec {
        argument,
        wire_name: String::new(),
        location: ParameterLocation::Body,
        required,
        schema,
        description: Some(format!("Request body ({content_type})")),
    };
    Ok(Some((spec, vec![whole])))
}

/// Flattens `allOf` compositions into a single object schema.
fn merge_all_of(schema: &Value) -> Value {
    let Some(parts) = schema.get("allOf").and_then(Value::as_array) else {
        return schema.clone();
    };

    let mut merged = schema.as_object().cloned().unwrap_or_default();
    merged.remove("allOf");
    let mut properties = merged
        .remove("properties")
        .and_then(|p| p.as_object().cloned())
        .unwrap_or_default();
    let mut required: Vec<Value> = merged
        .remove("required")
        .and_then(|r| r.as_array().cloned())
        .unwrap_or_default();

    for part in parts {
        let part = merge_all_of(part);
        if let Some(part_properties) = part.get("properties").and_then(Value::as_object) {
            for (name, field) in part_properties {
                properties.insert(name.clone(), field.clone());
            }
        }
        if let Some(part_required) = part.get("required").and_then(Value::as_array) {
            for name in part_required {
                if !required.contains(name) {
                    required.push(name.clone());
                }
            }
        }
        if let Some(kind) = part.get("type") {
            merged.entry("type").or_insert_with(|| kind.clone());
        }
    }

    merged.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        merged.insert("required".into(), Value::Array(required));
    }
    Value::Object(merged)
}

/// Rewrites OpenAPI 3.0 `nullable: true` into a JSON schema type union.
fn widen_nullable(mut schema: Value) -> Value {
    if let Value::Object(map) = &mut schema {
        if map.remove("nullable") == Some(Value::Bool(true)) {
            if let Some(Value::String(kind)) = map.get("type").cloned() {
                map.insert("type".into(), json!([kind, "null"]));
            }
        }
    }
    schema
}

fn response_schema(
    resolver: &RefResolver<'_>,
    operation: &Value,
) -> Result<Option<Value>, DescriptorError> {
    let Some(responses) = operation.get("responses").and_then(Value::as_object) else {
        return Ok(None);
    };
    let chosen = responses.get("200").or_else(|| {
        responses
            .iter()
            .find(|(code, _)| code.starts_with('2'))
            .map(|(_, response)| response)
    });
    let Some(response) = chosen else {
        return Ok(None);
    };

    let response = resolver.follow(response)?;
    let schema = response
        .get("content")
        .and_then(|content| content.get("application/json"))
        .and_then(|media| media.get("schema"));

    schema.map(|schema| resolver.inline(schema)).transpose().map_err(Into::into)
}

fn input_schema(parameters: &[ParameterSpec]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for parameter in parameters {
        properties.insert(parameter.argument.clone(), parameter.schema_for_listing());
        if parameter.required {
            required.push(Value::from(parameter.argument.clone()));
        }
    }

    let mut schema = Map::new();
    schema.insert("type".into(), Value::from("object"));
    schema.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".into(), Value::Array(required));
    }
    Value::Object(schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn describe_in(doc: &Value, method: HttpMethod, path: &str) -> Result<OperationDescriptor, DescriptorError> {
        let resolver = RefResolver::new(doc);
        let path_item = &doc["paths"][path];
        let operation = &path_item[method.as_str().to_ascii_lowercase()];
        describe(&resolver, method, path, path_item, operation)
    }

    fn items_document() -> Value {
        json!({
            "paths": {
                "/items/{item_id}": {
                    "parameters": [
                        {"name": "item_id", "in": "path", "required": true, "schema": {"type": "string"}}
                    ],
                    "get": {
                        "operationId": "get_item",
                        "summary": "Get one item",
                        "parameters": [
                            {"name": "limit", "in": "query", "schema": {"type": "integer"}},
                            {"name": "tags_match_mode", "in": "query", "schema": {"type": "string", "nullable": true}},
                            {"name": "Authorization", "in": "header", "schema": {"type": "string"}}
                        ],
                        "responses": {"200": {"description": "ok"}}
                    },
                    "post": {
                        "operationId": "create_item",
                        "requestBody": {
                            "required": true,
                            "content": {"application/json": {"schema": {"$ref": "#/components/schemas/NewItem"}}}
                        },
                        "responses": {
                            "201": {
                                "description": "created",
                                "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Item"}}}
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Base": {"type": "object", "properties": {"name": {"type": "string"}}, "required": ["name"]},
                    "NewItem": {"allOf": [
                        {"$ref": "#/components/schemas/Base"},
                        {"type": "object", "properties": {"item_id": {"type": "string"}, "value": {"type": "integer"}}}
                    ]},
                    "Item": {"type": "object", "properties": {"item_id": {"type": "string"}}}
                }
            }
        })
    }

    #[test]
    fn merges_path_level_and_operation_parameters() {
        let doc = items_document();
        let op = describe_in(&doc, HttpMethod::Get, "/items/{item_id}").unwrap();

        let names: Vec<_> = op.parameters().iter().map(ParameterSpec::argument).collect();
        assert_eq!(names, ["item_id", "limit", "tags_match_mode"]);
        assert_eq!(op.input_schema()["required"], json!(["item_id"]));
        assert_eq!(
            op.input_schema()["properties"]["tags_match_mode"]["type"],
            json!(["string", "null"])
        );
        assert_eq!(op.safety(), SafetyClass::Safe);
        assert_eq!(op.display_description(), "Get one item");
    }

    #[test]
    fn object_body_fields_become_arguments() {
        let doc = items_document();
        let op = describe_in(&doc, HttpMethod::Post, "/items/{item_id}").unwrap();

        let body = op.body().expect("body");
        assert_eq!(body.shape(), BodyShape::Fields);
        assert!(body.required());

        let collided = op
            .parameters()
            .iter()
            .find(|p| p.wire_name() == "item_id" && p.location() == ParameterLocation::Body)
            .expect("body item_id");
        assert_eq!(collided.argument(), "body_item_id");

        let name = op.parameters().iter().find(|p| p.argument() == "name").unwrap();
        assert!(name.required());
        assert_eq!(op.safety(), SafetyClass::Unsafe);
        assert_eq!(
            op.response_schema().unwrap()["properties"]["item_id"],
            json!({"type": "string"})
        );
    }

    #[test]
    fn array_body_passed_whole() {
        let doc = json!({
            "paths": {"/bulk": {"patch": {
                "requestBody": {"content": {"application/json": {"schema": {"type": "array", "items": {"type": "string"}}}}}
            }}}
        });
        let op = describe_in(&doc, HttpMethod::Patch, "/bulk").unwrap();
        assert_eq!(op.id().as_str(), "patch_bulk");
        assert_eq!(op.body().unwrap().shape(), BodyShape::Whole);
        assert_eq!(op.parameters()[0].argument(), "body");
    }

    #[test]
    fn undeclared_path_parameter_rejected() {
        let doc = json!({"paths": {"/dags/{dag_id}": {"get": {"operationId": "get_dag"}}}});
        let err = describe_in(&doc, HttpMethod::Get, "/dags/{dag_id}").expect_err("undeclared");
        assert!(err.to_string().contains("dag_id"));
    }

    #[test]
    fn dangling_response_reference_rejected() {
        let doc = json!({"paths": {"/dags": {"get": {
            "operationId": "get_dags",
            "responses": {"200": {"content": {"application/json": {"schema": {"$ref": "#/components/schemas/Gone"}}}}}
        }}}});
        let err = describe_in(&doc, HttpMethod::Get, "/dags").expect_err("dangling");
        assert!(matches!(err, DescriptorError::Reference(RefError::Dangling(_))));
    }

    #[test]
    fn description_falls_back_to_method_and_path() {
        let doc = json!({"paths": {"/health": {"get": {}}}});
        let op = describe_in(&doc, HttpMethod::Get, "/health").unwrap();
        assert_eq!(op.display_description(), "GET /health");
        assert_eq!(op.primary_tag(), None);
    }

    #[test]
    fn primary_tag_is_trimmed() {
        let doc = json!({"paths": {"/dags": {"get": {"tags": ["  ", " DAG "]}}}});
        let op = describe_in(&doc, HttpMethod::Get, "/dags").unwrap();
        assert_eq!(op.primary_tag(), Some("DAG"));
        assert_eq!(op.tags()[1], " DAG ");
    }
}
