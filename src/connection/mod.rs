//! Connection implementations (blocking + optional async).

#[cfg(feature = "async")]
pub mod async_connection;
#[cfg(feature = "blocking")]
pub mod blocking_connection;

#[cfg(feature = "async")]
pub use async_connection::{AsyncConnection, AsyncConnectionBuilder};
#[cfg(feature = "blocking")]
pub use blocking_connection::{Connection, ConnectionBuilder};

use crate::transport::TransportBody;
use http::HeaderValue;
use std::time::Duration;

pub(crate) const DEFAULT_USER_AGENT: &str =
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Idle connections are kept this long so credentials are not renegotiated on
/// every request.
pub const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(60);

pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
pub(crate) const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(60);
pub(crate) const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(60);

pub(crate) fn xml_body(payload: Vec<u8>) -> TransportBody {
    TransportBody {
        bytes: payload,
        content_type: Some(HeaderValue::from_static("text/xml")),
    }
}
