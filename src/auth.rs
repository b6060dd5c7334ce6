use crate::Error;
use base64::{Engine, engine::general_purpose::STANDARD as B64};
use http::{HeaderMap, HeaderValue, header::AUTHORIZATION};
use std::fmt;

/// A password or token that never shows up in `Debug`/`Display` output.
///
/// Use [`SecretString::expose`] to read the value when rendering headers.
#[derive(Clone, Default, Eq, PartialEq)]
pub struct SecretString(String);

impl SecretString {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// Credentials presented on every request to the endpoint.
///
/// The header is sent preemptively, without waiting for a `401` challenge.
/// On-premises Exchange usually has Basic authentication turned off on the
/// `/EWS` virtual directory and only offers NTLM or Negotiate. Those are
/// connection-oriented handshakes rather than a static header, so they are
/// not variants here; install a transport that performs them through
/// `ConnectionBuilder::transport` instead. Exchange Online takes an OAuth
/// access token via [`Auth::bearer`].
///
/// For Basic, `user` is whatever the server accepts as a logon name, usually
/// `DOMAIN\user` or a UPN such as `alice@contoso.com`.
///
/// ```
/// use ews_transport::Auth;
///
/// let auth = Auth::basic("CONTOSO\\alice", "hunter2");
/// assert!(!format!("{auth:?}").contains("hunter2"));
/// ```
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum Auth {
    Basic { user: String, password: SecretString },
    Bearer { token: SecretString },
}

impl Auth {
    #[must_use]
    pub fn basic(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            user: user.into(),
            password: SecretString::new(password),
        }
    }

    /// OAuth access token, e.g. for Exchange Online.
    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: SecretString::new(token),
        }
    }

    pub(crate) fn apply(&self, headers: &mut HeaderMap) -> Result<(), Error> {
        let raw = match self {
            Self::Basic { user, password } => {
                format!("Basic {}", B64.encode(format!("{user}:{}", password.expose())))
            }
            Self::Bearer { token } => format!("Bearer {}", token.expose()),
        };

        let mut value = HeaderValue::from_str(&raw).map_err(|err| Error::InvalidConfig {
            message: "invalid Authorization header value".into(),
            source: Some(Box::new(err)),
        })?;
        value.set_sensitive(true);

        headers.insert(AUTHORIZATION, value);
        Ok(())
    }
}
