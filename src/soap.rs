//! SOAP fault extraction from error response bodies.

use quick_xml::{Reader, events::Event};
use std::fmt;

/// Fault details carried by a SOAP `Fault` element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct SoapFault {
    /// Text of the first `faultstring` element.
    pub message: String,
    /// Text of the first `faultcode` element, e.g. `soap:Client`.
    pub code: String,
}

impl SoapFault {
    #[must_use]
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
        }
    }
}

impl fmt::Display for SoapFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SOAP fault (code: {}): {}", self.code, self.message)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    Message,
    Code,
}

struct Capture {
    field: Field,
    depth: usize,
    text: String,
}

/// Extract `faultstring` and `faultcode` from a SOAP envelope.
///
/// Elements are matched by local name, so `soap:faultstring` and an
/// unqualified `faultstring` are treated alike. Only the first occurrence of
/// each element counts; its text includes nested text and CDATA. Missing
/// elements leave the field empty. Malformed XML ends parsing early and keeps
/// whatever was extracted up to that point.
#[must_use]
pub fn parse_fault(xml: &str) -> SoapFault {
    let mut reader = Reader::from_str(xml);
    let mut message: Option<String> = None;
    let mut code: Option<String> = None;
    let mut capture: Option<Capture> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => match capture.as_mut() {
                Some(current) => current.depth += 1,
                None => {
                    capture = field_for(start.local_name().as_ref(), &message, &code).map(
                        |field| Capture {
                            field,
                            depth: 0,
                            text: String::new(),
                        },
                    );
                }
            },
            Ok(Event::Empty(empty)) => {
                if capture.is_none() {
                    match field_for(empty.local_name().as_ref(), &message, &code) {
                        Some(Field::Message) => message = Some(String::new()),
                        Some(Field::Code) => code = Some(String::new()),
                        None => {}
                    }
                }
            }
            Ok(Event::End(_)) => {
                if let Some(current) = capture.as_mut() {
                    if current.depth == 0 {
                        if let Some(done) = capture.take() {
                            store(done, &mut message, &mut code);
                        }
                    } else {
                        current.depth -= 1;
                    }
                }
            }
            Ok(Event::Text(text)) => {
                if let Some(current) = capture.as_mut() {
                    match text.unescape() {
                        Ok(value) => current.text.push_str(&value),
                        Err(_) => current.text.push_str(&String::from_utf8_lossy(&text)),
                    }
                }
            }
            Ok(Event::CData(cdata)) => {
                if let Some(current) = capture.as_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&cdata));
                }
            }
            Ok(Event::Eof) => break,
            Err(_err) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    error = %_err,
                    position = reader.buffer_position(),
                    "malformed SOAP fault body"
                );
                break;
            }
            Ok(_) => {}
        }

        if message.is_some() && code.is_some() {
            break;
        }
    }

    // An unterminated element still contributes the text read so far.
    if let Some(partial) = capture.take() {
        store(partial, &mut message, &mut code);
    }

    SoapFault {
        message: message.unwrap_or_default(),
        code: code.unwrap_or_default(),
    }
}

fn field_for(local: &[u8], message: &Option<String>, code: &Option<String>) -> Option<Field> {
    match local {
        b"faultstring" if message.is_none() => Some(Field::Message),
        b"faultcode" if code.is_none() => Some(Field::Code),
        _ => None,
    }
}

fn store(capture: Capture, message: &mut Option<String>, code: &mut Option<String>) {
    let value = capture.text.trim().to_owned();
    match capture.field {
        Field::Message => *message = Some(value),
        Field::Code => *code = Some(value),
    }
}
