//! Status classification shared by the blocking and async connections.

use crate::{Error, soap};
use http::{
    HeaderMap, StatusCode,
    header::{CONTENT_TYPE, LOCATION},
};

/// Turn a raw response into the body text or one of the error kinds.
///
/// | status | outcome |
/// |---|---|
/// | 200 | body |
/// | 302 | [`Error::UnhandledRedirect`] |
/// | 500, XML content type | [`Error::SoapFault`] |
/// | 500, anything else | [`Error::InternalServerError`] |
/// | other | [`Error::Http`] |
pub(crate) fn check_response(
    status: StatusCode,
    headers: &HeaderMap,
    body: Vec<u8>,
) -> Result<String, Error> {
    match status {
        StatusCode::OK => Ok(body_text(body)),
        StatusCode::FOUND => Err(Error::UnhandledRedirect {
            location: headers
                .get(LOCATION)
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned().into_boxed_str()),
        }),
        StatusCode::INTERNAL_SERVER_ERROR => {
            let body = body_text(body);
            if is_xml(headers) {
                let fault = soap::parse_fault(&body);
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    fault.message = %fault.message,
                    fault.code = %fault.code,
                    "internal SOAP error"
                );
                Err(Error::SoapFault(fault))
            } else {
                Err(Error::InternalServerError { body })
            }
        }
        status => Err(Error::Http {
            status,
            body: body_text(body),
        }),
    }
}

fn is_xml(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.to_ascii_lowercase().contains("xml"))
}

fn body_text(body: Vec<u8>) -> String {
    String::from_utf8(body).unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned())
}
