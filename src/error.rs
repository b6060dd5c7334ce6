use crate::soap::SoapFault;
use http::{Method, StatusCode};
use std::error::Error as StdError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    Redirect,
    SoapFault,
    InternalServer,
    Http,
    Transport,
    InvalidConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportErrorKind {
    Timeout,
    Connect,
    Other,
}

/// All errors returned by a connection.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// `302 Found`; redirects are not followed.
    #[error(
        "Unhandled HTTP redirect to {}",
        .location.as_deref().unwrap_or("<no location>")
    )]
    UnhandledRedirect { location: Option<Box<str>> },

    /// `500` with an XML body.
    #[error("{0}")]
    SoapFault(SoapFault),

    /// `500` with a non-XML body.
    #[error("Internal server error: {body}")]
    InternalServerError { body: String },

    /// Any other status that is not `200`.
    #[error("HTTP {status}: {body}")]
    Http { status: StatusCode, body: String },

    #[error("Transport error during {method} {path}: {source}")]
    Transport {
        method: Method,
        path: Box<str>,
        kind: TransportErrorKind,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        message: Box<str>,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnhandledRedirect { .. } => ErrorKind::Redirect,
            Self::SoapFault(_) => ErrorKind::SoapFault,
            Self::InternalServerError { .. } => ErrorKind::InternalServer,
            Self::Http { .. } => ErrorKind::Http,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::InvalidConfig { .. } => ErrorKind::InvalidConfig,
        }
    }

    /// HTTP status that produced this error, if a response was received.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::UnhandledRedirect { .. } => Some(StatusCode::FOUND),
            Self::SoapFault(_) | Self::InternalServerError { .. } => {
                Some(StatusCode::INTERNAL_SERVER_ERROR)
            }
            Self::Http { status, .. } => Some(*status),
            Self::Transport { .. } | Self::InvalidConfig { .. } => None,
        }
    }

    #[must_use]
    pub fn soap_fault(&self) -> Option<&SoapFault> {
        match self {
            Self::SoapFault(fault) => Some(fault),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_soap_fault(&self) -> bool {
        matches!(self, Self::SoapFault(_))
    }

    pub(crate) fn invalid_config(message: impl Into<Box<str>>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
            source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_reflects_classified_response() {
        let redirect = Error::UnhandledRedirect { location: None };
        assert_eq!(redirect.status(), Some(StatusCode::FOUND));
        assert_eq!(redirect.kind(), ErrorKind::Redirect);

        let fault = Error::SoapFault(SoapFault::new("Bad", "soap:Client"));
        assert_eq!(fault.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert_eq!(fault.soap_fault().map(|f| f.code.as_str()), Some("soap:Client"));
        assert!(fault.is_soap_fault());

        let config = Error::invalid_config("nope");
        assert_eq!(config.status(), None);
        assert!(config.soap_fault().is_none());
    }

    #[test]
    fn display_messages() {
        let redirect = Error::UnhandledRedirect {
            location: Some("https://mail.example.com/owa".into()),
        };
        assert_eq!(
            redirect.to_string(),
            "Unhandled HTTP redirect to https://mail.example.com/owa"
        );

        let http = Error::Http {
            status: StatusCode::NOT_FOUND,
            body: "missing".to_owned(),
        };
        assert_eq!(http.to_string(), "HTTP 404 Not Found: missing");
    }
}
