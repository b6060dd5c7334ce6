use super::{TransportConfig, TransportRequest, TransportResponse};
use crate::error::{Error, TransportErrorKind};
use http::Method;
use ureq::{
    Agent,
    config::Config,
    tls::{TlsConfig, TlsProvider},
};

/// Trait implemented by any blocking HTTP layer.
pub trait BlockingTransport: Send + Sync + 'static {
    fn send(&self, req: TransportRequest) -> Result<TransportResponse, Error>;
}

pub type DynBlockingTransport = Box<dyn BlockingTransport>;

impl<T: BlockingTransport + ?Sized> BlockingTransport for Box<T> {
    fn send(&self, req: TransportRequest) -> Result<TransportResponse, Error> {
        (**self).send(req)
    }
}

/// Default blocking transport built on `ureq`.
#[derive(Clone)]
pub struct UreqBlocking {
    agent: Agent,
}

impl UreqBlocking {
    pub fn try_new(config: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            agent: Agent::new_with_config(agent_config(config)),
        })
    }
}

fn agent_config(config: &TransportConfig) -> Config {
    let mut builder = Agent::config_builder()
        .http_status_as_error(false)
        .max_redirects(0)
        .max_redirects_will_error(false)
        .max_idle_age(config.keep_alive)
        .timeout_global(Some(config.timeout))
        .timeout_connect(Some(config.connect_timeout))
        .timeout_recv_body(Some(config.read_timeout))
        .user_agent(config.user_agent.as_str())
        .tls_config(tls_config(config));

    if config.no_proxy {
        builder = builder.proxy(None);
    }

    builder.build()
}

/// The provider must match the enabled TLS feature; ureq otherwise assumes
/// rustls and panics on the first `https` request.
fn tls_config(config: &TransportConfig) -> TlsConfig {
    let builder = TlsConfig::builder();
    #[cfg(all(feature = "native-tls", not(feature = "rustls")))]
    let builder = builder.provider(TlsProvider::NativeTls);
    #[cfg(feature = "rustls")]
    let builder = builder.provider(TlsProvider::Rustls);

    builder.disable_verification(config.insecure).build()
}

fn transport_error(method: &Method, path: &str, err: ureq::Error) -> Error {
    let kind = match &err {
        ureq::Error::Timeout(_) => TransportErrorKind::Timeout,
        ureq::Error::HostNotFound | ureq::Error::ConnectionFailed => TransportErrorKind::Connect,
        ureq::Error::Io(io) if io.kind() == std::io::ErrorKind::TimedOut => {
            TransportErrorKind::Timeout
        }
        ureq::Error::Io(io)
            if matches!(
                io.kind(),
                std::io::ErrorKind::ConnectionRefused
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::NotConnected
            ) =>
        {
            TransportErrorKind::Connect
        }
        _ => TransportErrorKind::Other,
    };

    Error::Transport {
        method: method.clone(),
        path: path.into(),
        kind,
        source: Box::new(err),
    }
}

impl BlockingTransport for UreqBlocking {
    fn send(&self, mut req: TransportRequest) -> Result<TransportResponse, Error> {
        let headers = req.wire_headers();
        let TransportRequest {
            method,
            url,
            body,
            timeout,
            ..
        } = req;
        let path = url.path().to_owned();
        let map_err = |err: ureq::Error| transport_error(&method, &path, err);

        let mut response = match &method {
            &Method::GET => {
                let mut req = self.agent.get(url.as_str());
                for (name, value) in headers.iter() {
                    req = req.header(name, value);
                }
                req.config()
                    .timeout_global(Some(timeout))
                    .build()
                    .call()
                    .map_err(map_err)?
            }
            &Method::POST => {
                let mut req = self.agent.post(url.as_str());
                for (name, value) in headers.iter() {
                    req = req.header(name, value);
                }
                let req = req.config().timeout_global(Some(timeout)).build();
                match body {
                    Some(body) => req.send(body.bytes).map_err(map_err)?,
                    None => req.send_empty().map_err(map_err)?,
                }
            }
            other => {
                return Err(Error::invalid_config(format!(
                    "unsupported HTTP method for blocking transport: {other}"
                )));
            }
        };

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(map_err)?;

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}
