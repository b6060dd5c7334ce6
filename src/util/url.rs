use crate::Error;
use url::Url;

/// Parse the service endpoint. The path is kept verbatim: EWS endpoints such as
/// `/EWS/Exchange.asmx` must not gain a trailing slash.
pub(crate) fn parse_endpoint(raw: &str) -> Result<Url, Error> {
    let url = Url::parse(raw).map_err(|err| Error::InvalidConfig {
        message: "invalid endpoint".into(),
        source: Some(Box::new(err)),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::invalid_config(format!(
            "endpoint scheme must be http or https, got `{}`",
            url.scheme()
        )));
    }

    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(Error::invalid_config("endpoint must include a host"));
    }

    Ok(url)
}
