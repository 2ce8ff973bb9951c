//! Outbound HTTP for toolgate.
//!
//! [`RequestForwarder`] turns a validated tool call into one upstream
//! request and hands it to an [`HttpTransport`]. The production transport
//! is [`HyperTransport`]; tests substitute their own. The same transport
//! backs [`HttpDocumentFetcher`], which retrieves the API description.

#![warn(missing_docs, clippy::pedantic)]

pub mod encoding;
pub mod error;
pub mod fetcher;
pub mod forwarder;
pub mod traits;
pub mod validate;

mod http_client;

pub use error::{ForwardError, ForwardResult};
pub use fetcher::HttpDocumentFetcher;
pub use forwarder::{ForwardedResponse, RequestForwarder, ResponseBody};
pub use http_client::{DEFAULT_TIMEOUT, HyperTransport};
pub use traits::{HttpTransport, InboundResponse, OutboundRequest, TransportError, TransportResult};
pub use validate::validate_arguments;
