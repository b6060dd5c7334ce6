//! Asynchronous connection to a SOAP endpoint.

use super::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_KEEP_ALIVE, DEFAULT_READ_TIMEOUT, DEFAULT_TIMEOUT,
    DEFAULT_USER_AGENT, xml_body,
};
use crate::{
    Auth, Error,
    response::check_response,
    transport::{
        TransportBody, TransportConfig, TransportRequest,
        async_transport::{AsyncTransport, DynAsyncTransport, ReqwestAsync},
    },
    util::url::parse_endpoint,
};
use http::{HeaderMap, Method};
use std::time::Duration;
use url::Url;

#[cfg(feature = "tracing")]
use tracing::{Instrument, field, instrument::WithSubscriber};

/// Configures and constructs [`AsyncConnection`].
pub struct AsyncConnectionBuilder {
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
    transport: Option<DynAsyncTransport>,
    #[cfg(feature = "tracing")]
    dispatch: Option<tracing::Dispatch>,
}

impl AsyncConnectionBuilder {
    /// Create a builder with opinionated defaults.
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

    /// Use a custom [`Auth`].
    pub fn auth(mut self, auth: Auth) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Convenience for HTTP Basic.
    pub fn auth_basic(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Some(Auth::basic(user, password));
        self
    }

    /// Ignore system proxy environment variables.
    pub fn no_system_proxy(mut self) -> Self {
        self.no_proxy = true;
        self
    }

    /// Accept invalid TLS certificates (**dangerous**).
    pub fn danger_accept_invalid_certs(mut self, yes: bool) -> Self {
        self.insecure = yes;
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    /// Whole-request timeout.
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

    /// Replace the `reqwest` transport.
    pub fn transport<T: AsyncTransport>(mut self, transport: T) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

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

    /// Finalise and build an [`AsyncConnection`].
    pub fn build(self) -> Result<AsyncConnection, Error> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Box::new(ReqwestAsync::try_new(&self.transport_config())?),
        };

        Ok(AsyncConnection {
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

/// Asynchronous connection to one web service endpoint.
pub struct AsyncConnection {
    endpoint: Url,
    auth: Option<Auth>,
    timeout: Duration,
    default_headers: HeaderMap,
    transport: DynAsyncTransport,
    #[cfg(feature = "tracing")]
    dispatch: Option<tracing::Dispatch>,
}

impl AsyncConnection {
    pub fn builder(endpoint: impl AsRef<str>) -> Result<AsyncConnectionBuilder, Error> {
        AsyncConnectionBuilder::try_new(endpoint)
    }

    pub fn new(endpoint: impl AsRef<str>) -> Result<Self, Error> {
        Self::builder(endpoint)?.build()
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn set_auth(&mut self, user: impl Into<String>, password: impl Into<String>) {
        self.auth = Some(Auth::basic(user, password));
    }

    pub fn set_auth_method(&mut self, auth: Auth) {
        self.auth = Some(auth);
    }

    pub fn clear_auth(&mut self) {
        self.auth = None;
    }

    pub async fn authenticate(&self) -> Result<bool, Error> {
        self.get().await.map(|_| true)
    }

    pub async fn get(&self) -> Result<String, Error> {
        self.execute(Method::GET, None).await
    }

    pub async fn post(&self, xml: impl Into<Vec<u8>>) -> Result<String, Error> {
        self.execute(Method::POST, Some(xml_body(xml.into()))).await
    }

    async fn execute(&self, method: Method, body: Option<TransportBody>) -> Result<String, Error> {
        #[cfg(feature = "tracing")]
        if let Some(dispatch) = &self.dispatch {
            return self
                .execute_request(method, body)
                .with_subscriber(dispatch.clone())
                .await;
        }

        self.execute_request(method, body).await
    }

    async fn execute_request(
        &self,
        method: Method,
        body: Option<TransportBody>,
    ) -> Result<String, Error> {
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

        let send = self.transport.send(TransportRequest {
            method: method.clone(),
            url: self.endpoint.clone(),
            headers,
            body,
            timeout: self.timeout,
        });
        #[cfg(feature = "tracing")]
        let send = send.instrument(span.clone());

        let resp = match send.await {
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
        #[cfg(feature = "tracing")]
        let result = span.in_scope(|| check_response(resp.status, &resp.headers, resp.body));
        #[cfg(not(feature = "tracing"))]
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
