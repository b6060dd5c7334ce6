//! HTTP transport for Exchange Web Services SOAP clients.
//!
//! A [`Connection`] (or [`AsyncConnection`] with the `async` feature) posts
//! XML documents to one endpoint and classifies the reply: `200` yields the
//! body, a `500` with an XML body becomes a typed [`SoapFault`], everything
//! else is a variant of [`Error`].
//!
//! ```no_run
//! # fn main() -> Result<(), ews_transport::Error> {
//! let mut conn = ews_transport::Connection::new("https://mail.example.com/EWS/Exchange.asmx")?;
//! conn.set_auth("alice", "secret");
//! let reply = conn.post("<soap:Envelope>...</soap:Envelope>")?;
//! # let _ = reply;
//! # Ok(())
//! # }
//! ```

// compile-time guard: enable at least one connection kind.
#[cfg(not(any(feature = "async", feature = "blocking")))]
compile_error!("Enable at least one of: `blocking` (default) or `async`.");

pub mod auth;
pub mod connection;
pub mod error;
pub mod soap;
pub mod transport;

mod response;
mod util;

pub use auth::{Auth, SecretString};
pub use connection::DEFAULT_KEEP_ALIVE;
#[cfg(feature = "async")]
pub use connection::{AsyncConnection, AsyncConnectionBuilder};
#[cfg(feature = "blocking")]
pub use connection::{Connection, ConnectionBuilder};
pub use error::{Error, ErrorKind, Result, TransportErrorKind};
pub use soap::{SoapFault, parse_fault};
