use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hyper::body::to_bytes;
use hyper::client::HttpConnector;
use hyper::header::CONTENT_TYPE;
use hyper::{Body, Client, Method, Request};
use hyper_rustls::HttpsConnector;
use rustls::{ClientConfig, OwnedTrustAnchor, RootCertStore};
use tokio::time::timeout;
use tracing::debug;
use webpki_roots::TLS_SERVER_ROOTS;

use crate::traits::{HttpTransport, InboundResponse, OutboundRequest, TransportError, TransportResult};

type HyperClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

fn build_https_client() -> HyperClient {
    let mut roots = RootCertStore::empty();
    roots.add_trust_anchors(TLS_SERVER_ROOTS.iter().map(|anchor| {
        OwnedTrustAnchor::from_subject_spki_name_constraints(
            anchor.subject,
            anchor.spki,
            anchor.name_constraints,
        )
    }));

    let config = ClientConfig::builder()
        .with_safe_defaults()
        .with_root_certificates(roots)
        .with_no_client_auth();

    let mut http = HttpConnector::new();
    http.enforce_http(false);

    let connector = HttpsConnector::from((http, Arc::new(config)));

    Client::builder().build::<_, Body>(connector)
}

/// [`HttpTransport`] backed by a pooled hyper client with rustls.
#[derive(Clone)]
pub struct HyperTransport {
    client: HyperClient,
    timeout: Duration,
}

impl fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HyperTransport")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl HyperTransport {
    /// Creates a transport whose requests expire after `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: build_https_client(),
            timeout,
        }
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl HttpTransport for HyperTransport {
    async fn send(&self, request: OutboundRequest) -> TransportResult<InboundResponse> {
        let method = Method::from_bytes(request.method().as_str().as_bytes())
            .map_err(|err| TransportError::invalid_request(err.to_string()))?;

        let mut builder = Request::builder().method(method).uri(request.url());
        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let body = request.body().cloned().map_or_else(Body::empty, Body::from);
        let req = builder
            .body(body)
            .map_err(|err| TransportError::invalid_request(err.to_string()))?;

        debug!(method = %request.method(), url = request.url(), "sending upstream request");

        let response = timeout(self.timeout, self.client.request(req))
            .await
            .map_err(|_| TransportError::Timeout { after: self.timeout })?
            .map_err(|err| TransportError::connect(err.to_string()))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        let bytes = timeout(self.timeout, to_bytes(response.into_body()))
            .await
            .map_err(|_| TransportError::Timeout { after: self.timeout })?
            .map_err(|err| TransportError::connect(format!("failed to read response: {err}")))?;

        Ok(InboundResponse::new(status, content_type, bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolgate_primitives::HttpMethod;

    #[tokio::test]
    async fn malformed_url_is_rejected_before_io() {
        let transport = HyperTransport::new(Duration::from_secs(1));
        let err = transport
            .send(OutboundRequest::new(HttpMethod::Get, "not a url"))
            .await
            .expect_err("bad uri");
        assert!(matches!(err, TransportError::InvalidRequest { .. }));
    }

    #[tokio::test]
    async fn refused_connection_is_connect_error() {
        let transport = HyperTransport::new(Duration::from_secs(5));
        let err = transport
            .send(OutboundRequest::new(HttpMethod::Get, "http://127.0.0.1:9/health"))
            .await
            .expect_err("nothing listens on the discard port");
        assert!(matches!(
            err,
            TransportError::Connect { .. } | TransportError::Timeout { .. }
        ));
    }
}
