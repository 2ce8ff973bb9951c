//! Remote retrieval of the API description over the shared transport.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use toolgate_catalog::{CatalogError, CatalogResult, DocumentFetcher};
use toolgate_primitives::{Credential, HttpMethod};
use tracing::debug;

use crate::traits::{HttpTransport, OutboundRequest};

/// Fetches description documents, authenticating like the forwarder does.
#[derive(Clone)]
pub struct HttpDocumentFetcher {
    transport: Arc<dyn HttpTransport>,
    credential: Option<Credential>,
}

impl std::fmt::Debug for HttpDocumentFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpDocumentFetcher")
            .field("credential", &self.credential)
            .finish_non_exhaustive()
    }
}

impl HttpDocumentFetcher {
    /// Creates a fetcher that sends `credential` as a bearer token when set.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>, credential: Option<Credential>) -> Self {
        Self {
            transport,
            credential,
        }
    }
}

#[async_trait]
impl DocumentFetcher for HttpDocumentFetcher {
    async fn fetch(&self, url: &str) -> CatalogResult<Bytes> {
        let mut request = OutboundRequest::new(HttpMethod::Get, url)
            .with_header("Accept", "application/json, application/yaml;q=0.9");
        if let Some(credential) = &self.credential {
            request = request.with_header("Authorization", credential.header_value());
        }

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|err| CatalogError::unavailable(url, err.to_string()))?;

        if !response.is_success() {
            return Err(CatalogError::unavailable(
                url,
                format!("server answered with status {}", response.status()),
            ));
        }

        debug!(url, bytes = response.body().len(), "api description fetched");
        Ok(response.body().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::traits::{InboundResponse, TransportResult};

    struct Fixed {
        status: u16,
        seen: Mutex<Vec<OutboundRequest>>,
    }

    #[async_trait]
    impl HttpTransport for Fixed {
        async fn send(&self, request: OutboundRequest) -> TransportResult<InboundResponse> {
            self.seen.lock().unwrap().push(request);
            Ok(InboundResponse::new(self.status, None, "{}"))
        }
    }

    #[tokio::test]
    async fn sends_bearer_token() {
        let transport = Arc::new(Fixed {
            status: 200,
            seen: Mutex::new(Vec::new()),
        });
        let fetcher = HttpDocumentFetcher::new(
            transport.clone(),
            Some(Credential::bearer("secret").unwrap()),
        );
        let bytes = fetcher.fetch("http://localhost/openapi.json").await.unwrap();
        assert_eq!(&bytes[..], b"{}");
        assert_eq!(
            transport.seen.lock().unwrap()[0].header("Authorization"),
            Some("Bearer secret")
        );
    }

    #[tokio::test]
    async fn error_status_is_unavailable() {
        let transport = Arc::new(Fixed {
            status: 401,
            seen: Mutex::new(Vec::new()),
        });
        let err = HttpDocumentFetcher::new(transport, None)
            .fetch("http://localhost/openapi.json")
            .await
            .expect_err("unauthorized");
        assert!(err.to_string().contains("401"));
    }
}
