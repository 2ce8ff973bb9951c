//! Translation of validated tool calls into upstream HTTP requests.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use toolgate_catalog::{BodyShape, OperationDescriptor, ParameterLocation, RequestBodySpec};
use toolgate_primitives::Credential;
use tracing::{debug, info};
use url::Url;

use crate::encoding::{query_pairs, scalar_text};
use crate::error::{ForwardError, ForwardResult};
use crate::traits::{HttpTransport, InboundResponse, OutboundRequest};
use crate::validate::validate_arguments;

/// Response payload, structured when the upstream sent JSON.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    /// Parsed JSON document.
    Json(Value),
    /// Anything else, decoded lossily as UTF-8.
    Text(String),
}

/// Upstream response returned to the caller for every HTTP status.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ForwardedResponse {
    status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_type: Option<String>,
    body: ResponseBody,
}

impl ForwardedResponse {
    /// Interprets a raw response.
    #[must_use]
    pub fn from_inbound(response: &InboundResponse) -> Self {
        let is_json = response
            .content_type()
            .is_some_and(|content_type| content_type.to_ascii_lowercase().contains("json"));

        let body = if is_json {
            serde_json::from_slice(response.body()).map_or_else(
                |_| ResponseBody::Text(String::from_utf8_lossy(response.body()).into_owned()),
                ResponseBody::Json,
            )
        } else {
            ResponseBody::Text(String::from_utf8_lossy(response.body()).into_owned())
        };

        Self {
            status: response.status(),
            content_type: response.content_type().map(str::to_owned),
            body,
        }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// `Content-Type` of the response, if sent.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Decoded body.
    #[must_use]
    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    /// Whether the status is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Forwards operation calls to the upstream API.
#[derive(Clone)]
pub struct RequestForwarder {
    transport: Arc<dyn HttpTransport>,
    base_url: Url,
    credential: Option<Credential>,
}

impl fmt::Debug for RequestForwarder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestForwarder")
            .field("base_url", &self.base_url.as_str())
            .field("credential", &self.credential)
            .finish_non_exhaustive()
    }
}

impl RequestForwarder {
    /// Creates a forwarder targeting `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ForwardError::Configuration`] if the URL is not an absolute
    /// `http`/`https` URL.
    pub fn new(transport: Arc<dyn HttpTransport>, base_url: &str) -> ForwardResult<Self> {
        Ok(Self {
            transport,
            base_url: parse_base_url(base_url)?,
            credential: None,
        })
    }

    /// Sets the process-wide credential used when a call brings none.
    #[must_use]
    pub fn with_credential(mut self, credential: Option<Credential>) -> Self {
        self.credential = credential;
        self
    }

    /// Base URL that operation paths are appended to.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Assembles the outbound request without sending it.
    ///
    /// # Errors
    ///
    /// Returns [`ForwardError::CredentialRejectedLocally`] when no credential
    /// is available and [`ForwardError::InvalidArguments`] when validation
    /// fails or a path argument is missing.
    pub fn build_request(
        &self,
        operation: &OperationDescriptor,
        arguments: &Value,
        credential: Option<&Credential>,
    ) -> ForwardResult<OutboundRequest> {
        let credential = credential
            .or(self.credential.as_ref())
            .ok_or(ForwardError::CredentialRejectedLocally)?;
        let arguments = validate_arguments(operation, arguments)?;

        let mut url = self.operation_url(operation, &arguments)?;
        let query = query_pairs(
            operation
                .parameters()
                .iter()
                .filter(|p| p.location() == ParameterLocation::Query)
                .filter_map(|p| arguments.get(p.argument()).map(|v| (p.wire_name(), v))),
        );
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(&query);
        }

        let mut request = OutboundRequest::new(operation.method(), url)
            .with_header("Authorization", credential.header_value())
            .with_header("Accept", "application/json");

        for parameter in operation
            .parameters()
            .iter()
            .filter(|p| p.location() == ParameterLocation::Header)
        {
            if let Some(text) = arguments.get(parameter.argument()).and_then(scalar_text) {
                request = request.with_header(parameter.wire_name(), text);
            }
        }

        if let Some(body) = assemble_body(operation, &arguments) {
            // The payload is always JSON; only a JSON media type may be echoed.
            let content_type = operation
                .body()
                .map(RequestBodySpec::content_type)
                .filter(|declared| declared.to_ascii_lowercase().contains("json"))
                .unwrap_or("application/json");
            let encoded = serde_json::to_vec(&body)
                .map_err(|err| ForwardError::invalid_arguments("body", err.to_string()))?;
            request = request
                .with_header("Content-Type", content_type)
                .with_body(encoded);
        }

        Ok(request)
    }

    /// Appends the operation's path to the base URL, one encoded segment
    /// per template segment.
    fn operation_url(
        &self,
        operation: &OperationDescriptor,
        arguments: &Map<String, Value>,
    ) -> ForwardResult<Url> {
        let mut url = self.base_url.clone();
        let mut segments = url.path_segments_mut().map_err(|()| ForwardError::Configuration {
            reason: format!("base URL `{}` cannot carry a path", self.base_url),
        })?;
        segments.pop_if_empty();
        for template in operation.path().split('/').filter(|segment| !segment.is_empty()) {
            segments.push(&expand_segment(operation, template, arguments)?);
        }
        drop(segments);
        Ok(url)
    }

    /// Validates, sends, and decodes one call. No retries are attempted.
    ///
    /// # Errors
    ///
    /// Propagates [`RequestForwarder::build_request`] failures and returns
    /// [`ForwardError::UpstreamUnreachable`] on timeout or network failure.
    /// Non-2xx statuses are returned as ordinary responses.
    pub async fn forward(
        &self,
        operation: &OperationDescriptor,
        arguments: &Value,
        credential: Option<&Credential>,
    ) -> ForwardResult<ForwardedResponse> {
        let request = self.build_request(operation, arguments, credential)?;
        debug!(operation = %operation.id(), request = ?request, "forwarding call");

        let response = self.transport.send(request).await?;
        let forwarded = ForwardedResponse::from_inbound(&response);
        info!(
            operation = %operation.id(),
            method = %operation.method(),
            status = forwarded.status(),
            "upstream call completed"
        );
        Ok(forwarded)
    }
}

/// Substitutes every `{name}` in one path segment with its argument.
fn expand_segment(
    operation: &OperationDescriptor,
    template: &str,
    arguments: &Map<String, Value>,
) -> ForwardResult<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        let name = &rest[start + 1..start + len];
        let value = operation
            .parameters()
            .iter()
            .find(|p| p.location() == ParameterLocation::Path && p.wire_name() == name)
            .and_then(|p| arguments.get(p.argument()))
            .and_then(scalar_text)
            .ok_or_else(|| ForwardError::invalid_arguments(name, "path argument is missing"))?;
        out.push_str(&value);
        rest = &rest[start + len + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn assemble_body(operation: &OperationDescriptor, arguments: &Map<String, Value>) -> Option<Value> {
    let spec = operation.body()?;
    let mut fields = operation
        .parameters()
        .iter()
        .filter(|p| p.location() == ParameterLocation::Body);

    match spec.shape() {
        BodyShape::Whole => fields
            .next()
            .and_then(|p| arguments.get(p.argument()))
            .cloned(),
        BodyShape::Fields => {
            let body: Map<String, Value> = fields
                .filter_map(|p| {
                    arguments
                        .get(p.argument())
                        .map(|value| (p.wire_name().to_owned(), value.clone()))
                })
                .collect();
            (!body.is_empty() || spec.required()).then_some(Value::Object(body))
        }
    }
}

fn parse_base_url(input: &str) -> ForwardResult<Url> {
    let url = Url::parse(input.trim()).map_err(|err| ForwardError::Configuration {
        reason: format!("invalid base URL `{input}`: {err}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(ForwardError::Configuration {
            reason: format!("base URL `{input}` must be an absolute http:// or https:// URL"),
        });
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::json;
    use toolgate_catalog::OperationCatalog;
    use toolgate_primitives::HttpMethod;

    use crate::traits::{TransportError, TransportResult};

    struct Canned {
        response: Option<InboundResponse>,
        sent: Mutex<Vec<OutboundRequest>>,
    }

    impl Canned {
        fn new(response: Option<InboundResponse>) -> Arc<Self> {
            Arc::new(Self {
                response,
                sent: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl HttpTransport for Canned {
        async fn send(&self, request: OutboundRequest) -> TransportResult<InboundResponse> {
            self.sent.lock().unwrap().push(request);
            self.response.clone().ok_or(TransportError::Timeout {
                after: Duration::from_secs(30),
            })
        }
    }

    fn catalog() -> OperationCatalog {
        OperationCatalog::from_document(&json!({
            "openapi": "3.0.0",
            "info": {"title": "t", "version": "1"},
            "paths": {
                "/items/{item_id}": {
                    "get": {
                        "operationId": "get_item",
                        "parameters": [
                            {"name": "item_id", "in": "path", "required": true, "schema": {"type": "string"}},
                            {"name": "limit", "in": "query", "schema": {"type": "string"}},
                            {"name": "exclude_stale", "in": "query", "schema": {"type": "string"}},
                            {"name": "order_by", "in": "query", "schema": {"type": "array"}},
                            {"name": "X-Request-Id", "in": "header", "schema": {"type": "string"}}
                        ]
                    }
                },
                "/dags/{dag_id}/dagRuns": {
                    "post": {
                        "operationId": "post_dag_run",
                        "parameters": [{"name": "dag_id", "in": "path", "schema": {"type": "string"}}],
                        "requestBody": {"content": {"application/json": {"schema": {
                            "type": "object",
                            "properties": {"dag_id": {"type": "string"}, "conf": {"type": "object"}}
                        }}}}
                    }
                }
            }
        }))
        .unwrap()
    }

    fn forwarder(transport: Arc<dyn HttpTransport>) -> RequestForwarder {
        RequestForwarder::new(transport, "http://localhost:8080/api/v1/")
            .unwrap()
            .with_credential(Some(Credential::bearer("process-token").unwrap()))
    }

    #[tokio::test]
    async fn builds_path_query_and_headers() {
        let transport = Canned::new(Some(InboundResponse::new(
            200,
            Some("application/json".into()),
            r#"{"ok": true}"#,
        )));
        let catalog = catalog();
        let response = forwarder(transport.clone())
            .forward(
                catalog.get("get_item").unwrap(),
                &json!({
                    "item_id": "alpha beta",
                    "limit": "5",
                    "exclude_stale": "true",
                    "order_by": ["dag_id"],
                    "X-Request-Id": "abc"
                }),
                None,
            )
            .await
            .unwrap();

        assert_eq!(response.body(), &ResponseBody::Json(json!({"ok": true})));

        let sent = transport.sent.lock().unwrap();
        let request = &sent[0];
        assert_eq!(request.method(), HttpMethod::Get);
        assert_eq!(
            request.url(),
            "http://localhost:8080/api/v1/items/alpha%20beta?limit=5&exclude_stale=true&order_by=dag_id"
        );
        assert_eq!(request.header("authorization"), Some("Bearer process-token"));
        assert_eq!(request.header("x-request-id"), Some("abc"));
        assert!(request.body().is_none());
    }

    #[tokio::test]
    async fn per_call_credential_wins_and_body_uses_wire_names() {
        let transport = Canned::new(Some(InboundResponse::new(409, Some("text/plain".into()), "conflict")));
        let catalog = catalog();
        let caller = Credential::bearer("caller-token").unwrap();
        let response = forwarder(transport.clone())
            .forward(
                catalog.get("post_dag_run").unwrap(),
                &json!({"dag_id": "etl", "body_dag_id": "run-1", "conf": {"a": 1}}),
                Some(&caller),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), 409);
        assert_eq!(response.body(), &ResponseBody::Text("conflict".into()));

        let sent = transport.sent.lock().unwrap();
        let request = &sent[0];
        assert_eq!(request.url(), "http://localhost:8080/api/v1/dags/etl/dagRuns");
        assert_eq!(request.header("Authorization"), Some("Bearer caller-token"));
        assert_eq!(request.header("Content-Type"), Some("application/json"));
        let body: Value = serde_json::from_slice(request.body().unwrap()).unwrap();
        assert_eq!(body, json!({"dag_id": "run-1", "conf": {"a": 1}}));
    }

    #[tokio::test]
    async fn missing_credential_fails_before_io() {
        let transport = Canned::new(None);
        let catalog = catalog();
        let forwarder = RequestForwarder::new(transport.clone(), "https://airflow.example").unwrap();
        let err = forwarder
            .forward(catalog.get("get_item").unwrap(), &json!({"item_id": "a"}), None)
            .await
            .expect_err("no credential");
        assert!(matches!(err, ForwardError::CredentialRejectedLocally));
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn timeout_is_upstream_unreachable() {
        let transport = Canned::new(None);
        let catalog = catalog();
        let err = forwarder(transport.clone())
            .forward(catalog.get("get_item").unwrap(), &json!({"item_id": "a"}), None)
            .await
            .expect_err("timeout");
        assert!(matches!(err, ForwardError::UpstreamUnreachable(_)));
        assert_eq!(transport.sent.lock().unwrap().len(), 1);
    }

    #[test]
    fn rejects_relative_base_url() {
        let err = RequestForwarder::new(Canned::new(None), "localhost:8080").expect_err("scheme");
        assert!(matches!(err, ForwardError::Configuration { .. }));
        let err = RequestForwarder::new(Canned::new(None), "ftp://files.example").expect_err("ftp");
        assert!(matches!(err, ForwardError::Configuration { .. }));
    }

    #[test]
    fn reserved_characters_stay_inside_their_component() {
        let catalog = catalog();
        let request = forwarder(Canned::new(None))
            .build_request(
                catalog.get("get_item").unwrap(),
                &json!({"item_id": "a/b?c#d", "limit": "5 & more", "order_by": ["x=y"]}),
                None,
            )
            .unwrap();

        assert_eq!(
            request.url(),
            "http://localhost:8080/api/v1/items/a%2Fb%3Fc%23d?limit=5+%26+more&order_by=x%3Dy"
        );
    }

    #[test]
    fn base_url_without_path_gets_operation_path() {
        let catalog = catalog();
        let forwarder = RequestForwarder::new(Canned::new(None), "https://airflow.example")
            .unwrap()
            .with_credential(Some(Credential::bearer("t").unwrap()));
        let request = forwarder
            .build_request(catalog.get("post_dag_run").unwrap(), &json!({"dag_id": "etl"}), None)
            .unwrap();
        assert_eq!(request.url(), "https://airflow.example/dags/etl/dagRuns");
    }

    #[test]
    fn non_json_body_type_is_sent_as_json() {
        let catalog = OperationCatalog::from_document(&json!({
            "openapi": "3.0.0",
            "info": {"title": "t", "version": "1"},
            "paths": {
                "/forms": {"post": {
                    "operationId": "post_form",
                    "requestBody": {"content": {"application/x-www-form-urlencoded": {"schema": {
                        "type": "object",
                        "properties": {"name": {"type": "string"}}
                    }}}}
                }},
                "/patches": {"patch": {
                    "operationId": "patch_merge",
                    "requestBody": {"content": {"application/merge-patch+json": {"schema": {
                        "type": "object",
                        "properties": {"name": {"type": "string"}}
                    }}}}
                }}
            }
        }))
        .unwrap();
        let forwarder = forwarder(Canned::new(None));

        let form = forwarder
            .build_request(catalog.get("post_form").unwrap(), &json!({"name": "n"}), None)
            .unwrap();
        assert_eq!(form.header("Content-Type"), Some("application/json"));
        let body: Value = serde_json::from_slice(form.body().unwrap()).unwrap();
        assert_eq!(body, json!({"name": "n"}));

        let patch = forwarder
            .build_request(catalog.get("patch_merge").unwrap(), &json!({"name": "n"}), None)
            .unwrap();
        assert_eq!(patch.header("Content-Type"), Some("application/merge-patch+json"));
    }

    #[test]
    fn malformed_json_falls_back_to_text() {
        let response = ForwardedResponse::from_inbound(&InboundResponse::new(
            500,
            Some("application/json".into()),
            "<html>oops</html>",
        ));
        assert_eq!(response.body(), &ResponseBody::Text("<html>oops</html>".into()));
        assert!(!response.is_success());
    }
}
