//! HTTP transport layer.
//!
//! * `UreqBlocking` / `ReqwestAsync` never follow redirects; a `302` is handed
//!   back to the connection, which reports it as unhandled.
//! * Both keep idle connections alive for the configured keep-alive duration.

use http::{HeaderMap, HeaderValue, Method, StatusCode};
use std::time::Duration;
use url::Url;

#[cfg(feature = "async")]
pub mod async_transport;
#[cfg(feature = "blocking")]
pub mod blocking_transport;

#[cfg(feature = "metrics")]
pub(crate) mod metrics;

/// Settings shared by the default transports.
#[derive(Clone, Debug)]
pub struct TransportConfig {
    /// Accept invalid TLS certificates.
    pub insecure: bool,
    pub user_agent: String,
    /// Whole-request timeout.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    /// How long an idle pooled connection is kept for reuse.
    pub keep_alive: Duration,
    /// Ignore proxy environment variables.
    pub no_proxy: bool,
}

#[derive(Clone, Debug)]
pub struct TransportBody {
    pub bytes: Vec<u8>,
    pub content_type: Option<HeaderValue>,
}

#[derive(Clone, Debug)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<TransportBody>,
    pub timeout: Duration,
}

impl TransportRequest {
    /// Headers to put on the wire; a body content type replaces any
    /// `Content-Type` already present.
    pub fn wire_headers(&mut self) -> HeaderMap {
        let mut headers = std::mem::take(&mut self.headers);
        if let Some(content_type) = self.body.as_ref().and_then(|b| b.content_type.clone()) {
            headers.insert(http::header::CONTENT_TYPE, content_type);
        }
        headers
    }
}

#[derive(Clone, Debug)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}
