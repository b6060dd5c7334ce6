//! Blocking connection to a SOAP endpoint.

use super::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_KEEP_ALIVE, DEFAULT_READ_TIMEOUT, DEFAULT_TIMEOUT,
    DEFAULT_USER_AGENT, xml_body,
};
use crate::{
    Auth, Error,
    response::check_response,
    transport::{
        TransportBody, TransportConfig, TransportRequest,
        blocking_transport::{BlockingTransport, DynBlockingTransport, UreqBlocking},
    },
    util::url::parse_endpoint,
};
use http::{HeaderMap, Method};
use std::time::Duration;
use url::Url;

#[cfg(feature = "tracing")]
use tracing::field;

/// Configures and constructs [`Connection`].
pub struct ConnectionBuilder {
    endpoint: Url,
    auth: Option<Auth>,
    insecure: bool,
    user_agent: String,
    timeout: Duration,
    connect_timeout: Duration,
    read_timeout: Duration,
    keep_alive: Duration,
    no_proxy: bool,
    default_headers: HeaderMap,
    transport: Option<DynBlockingTransport>,
    #[cfg(feature = "tracing")]
    dispatch: Option<tracing::Dispatch>,
}

impl ConnectionBuilder {
    fn try_new(endpoint: impl AsRef<str>) -> Result<Self, Error> {
        let endpoint = parse_endpoint(endpoint.as_ref())?;
        Ok(Self {
            endpoint,
            auth: None,
            insecure: false,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            keep_alive: DEFAULT_KEEP_ALIVE,
            no_proxy: false,
            default_headers: HeaderMap::new(),
            transport: None,
            #[cfg(feature = "tracing")]
            dispatch: None,
        })
    }

    pub fn auth(mut self, auth: Auth) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn auth_basic(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Some(Auth::basic(user, password));
        self
    }

    pub fn no_system_proxy(mut self) -> Self {
        self.no_proxy = true;
        self
    }

    /// Accept self-signed and otherwise invalid TLS certificates.
    pub fn danger_accept_invalid_certs(mut self, yes: bool) -> Self {
        self.insecure = yes;
        self
    }

    /// Override the default `User-Agent` header.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    pub fn timeout(mut self, value: Duration) -> Self {
        self.timeout = value;
        self
    }

    pub fn connect_timeout(mut self, value: Duration) -> Self {
        self.connect_timeout = value;
        self
    }

    pub fn read_timeout(mut self, value: Duration) -> Self {
        self.read_timeout = value;
        self
    }

    /// Idle timeout of kept-alive connections.
    pub fn keep_alive(mut self, value: Duration) -> Self {
        self.keep_alive = value;
        self
    }

    pub fn default_header(
        mut self,
        name: http::header::HeaderName,
        value: http::HeaderValue,
    ) -> Self {
        self.default_headers.insert(name, value);
        self
    }

    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers.extend(headers);
        self
    }

    /// Replace the `ureq` transport, e.g. with one that speaks NTLM.
    ///
    /// Transport settings on this builder are ignored when a custom transport
    /// is installed.
    pub fn transport<T: BlockingTransport>(mut self, transport: T) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    /// Route this connection's spans and events to `dispatch` instead of the
    /// process default subscriber.
    #[cfg(feature = "tracing")]
    pub fn log_dispatch(mut self, dispatch: impl Into<tracing::Dispatch>) -> Self {
        self.dispatch = Some(dispatch.into());
        self
    }

    /// Settings handed to the default transport.
    pub(crate) fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            insecure: self.insecure,
            user_agent: self.user_agent.clone(),
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            read_timeout: self.read_timeout,
            keep_alive: self.keep_alive,
            no_proxy: self.no_proxy,
        }
    }

    pub fn build(self) -> Result<Connection, Error> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Box::new(UreqBlocking::try_new(&self.transport_config())?),
        };

        Ok(Connection {
            endpoint: self.endpoint,
            auth: self.auth,
            timeout: self.timeout,
            default_headers: self.default_headers,
            transport,
            #[cfg(feature = "tracing")]
            dispatch: self.dispatch,
        })
    }
}

/// Blocking connection to one web service endpoint.
///
/// Calls are issued serially; the underlying agent keeps the connection alive
/// between them.
pub struct Connection {
    endpoint: Url,
    auth: Option<Auth>,
    timeout: Duration,
    default_headers: HeaderMap,
    transport: DynBlockingTransport,
    #[cfg(feature = "tracing")]
    dispatch: Option<tracing::Dispatch>,
}

impl Connection {
    pub fn builder(endpoint: impl AsRef<str>) -> Result<ConnectionBuilder, Error> {
        ConnectionBuilder::try_new(endpoint)
    }

    /// Connect to `endpoint`, e.g. `https://mail.example.com/EWS/Exchange.asmx`.
    pub fn new(endpoint: impl AsRef<str>) -> Result<Self, Error> {
        Self::builder(endpoint)?.build()
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Present Basic credentials on every following request.
    ///
    /// Nothing is validated here; bad credentials surface on the next call.
    pub fn set_auth(&mut self, user: impl Into<String>, password: impl Into<String>) {
        self.auth = Some(Auth::basic(user, password));
    }

    pub fn set_auth_method(&mut self, auth: Auth) {
        self.auth = Some(auth);
    }

    pub fn clear_auth(&mut self) {
        self.auth = None;
    }

    /// Issue a GET so credentials are checked up front.
    ///
    /// Doing this is optional: the first `get`/`post` authenticates as well.
    pub fn authenticate(&self) -> Result<bool, Error> {
        self.get().map(|_| true)
    }

    /// `GET` the endpoint and return the body of a `200` response.
    pub fn get(&self) -> Result<String, Error> {
        self.execute(Method::GET, None)
    }

    /// `POST` an XML document with `Content-Type: text/xml` and return the
    /// body of a `200` response.
    pub fn post(&self, xml: impl Into<Vec<u8>>) -> Result<String, Error> {
        self.execute(Method::POST, Some(xml_body(xml.into())))
    }

    fn execute(&self, method: Method, body: Option<TransportBody>) -> Result<String, Error> {
        #[cfg(feature = "tracing")]
        if let Some(dispatch) = &self.dispatch {
            return tracing::dispatcher::with_default(dispatch, || {
                self.execute_request(method, body)
            });
        }

        self.execute_request(method, body)
    }

    fn execute_request(&self, method: Method, body: Option<TransportBody>) -> Result<String, Error> {
        #[cfg(feature = "metrics")]
        let _inflight = crate::transport::metrics::InFlightGuard::new();

        let mut headers = self.default_headers.clone();
        if let Some(auth) = &self.auth {
            auth.apply(&mut headers)?;
        }

        #[cfg(any(feature = "tracing", feature = "metrics"))]
        let start = std::time::Instant::now();
        #[cfg(feature = "tracing")]
        let span = tracing::info_span!(
            "ews.request",
            http.method = %method,
            http.host = %self.endpoint.host_str().unwrap_or_default(),
            http.path = %self.endpoint.path(),
            http.status = field::Empty,
            latency_ms = field::Empty,
            error_kind = field::Empty,
        );
        #[cfg(feature = "tracing")]
        let _enter = span.enter();

        let resp = match self.transport.send(TransportRequest {
            method: method.clone(),
            url: self.endpoint.clone(),
            headers,
            body,
            timeout: self.timeout,
        }) {
            Ok(resp) => resp,
            Err(err) => {
                #[cfg(feature = "metrics")]
                crate::transport::metrics::record_outcome(
                    &method,
                    None,
                    start.elapsed(),
                    Some(err.kind()),
                );
                #[cfg(feature = "tracing")]
                {
                    span.record("error_kind", field::debug(err.kind()));
                    span.record("latency_ms", start.elapsed().as_millis() as i64);
                }
                return Err(err);
            }
        };

        let _status = resp.status;
        let result = check_response(resp.status, &resp.headers, resp.body);

        #[cfg(feature = "tracing")]
        {
            span.record("http.status", _status.as_u16() as i64);
            span.record("latency_ms", start.elapsed().as_millis() as i64);
            if let Err(err) = &result {
                span.record("error_kind", field::debug(err.kind()));
            }
        }

        #[cfg(feature = "metrics")]
        crate::transport::metrics::record_outcome(
            &method,
            Some(_status),
            start.elapsed(),
            result.as_ref().err().map(Error::kind),
        );

        result
    }
}
