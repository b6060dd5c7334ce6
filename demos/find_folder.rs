//! Blocking FindFolder round trip.
//!
//! ```bash
//! cargo run --example find_folder
//! ```
//!
//! Env vars:
//! - `EWS_ENDPOINT` (e.g. `https://mail.example.com/EWS/Exchange.asmx`)
//! - `EWS_USER`, `EWS_PASSWORD` (optional)
//! - `EWS_INSECURE=1` to accept self-signed certificates

use ews_transport::{Connection, Error};
use std::time::Duration;

const FIND_FOLDER: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"
               xmlns:t="http://schemas.microsoft.com/exchange/services/2006/types">
  <soap:Body>
    <FindFolder Traversal="Shallow" xmlns="http://schemas.microsoft.com/exchange/services/2006/messages">
      <FolderShape><t:BaseShape>Default</t:BaseShape></FolderShape>
      <ParentFolderIds><t:DistinguishedFolderId Id="msgfolderroot"/></ParentFolderIds>
    </FindFolder>
  </soap:Body>
</soap:Envelope>"#;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let endpoint = env_or("EWS_ENDPOINT", "https://mail.example.com/EWS/Exchange.asmx");

    let mut conn = Connection::builder(&endpoint)?
        .timeout(Duration::from_secs(30))
        .danger_accept_invalid_certs(env_opt("EWS_INSECURE").is_some())
        .build()?;

    if let (Some(user), Some(password)) = (env_opt("EWS_USER"), env_opt("EWS_PASSWORD")) {
        conn.set_auth(user, password);
        conn.authenticate()?;
    }

    match conn.post(FIND_FOLDER) {
        Ok(body) => println!("{body}"),
        Err(Error::SoapFault(fault)) => {
            eprintln!("server rejected request: {} ({})", fault.message, fault.code);
        }
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_owned())
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
