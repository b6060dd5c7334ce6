//! Async FindFolder round trip.
//!
//! ```bash
//! cargo run --features async --example async_find_folder
//! ```
//!
//! Env vars:
//! - `EWS_ENDPOINT`
//! - `EWS_TOKEN` (optional OAuth access token)

use ews_transport::{AsyncConnection, Auth};

const GET_INBOX: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"
               xmlns:t="http://schemas.microsoft.com/exchange/services/2006/types">
  <soap:Body>
    <GetFolder xmlns="http://schemas.microsoft.com/exchange/services/2006/messages">
      <FolderShape><t:BaseShape>IdOnly</t:BaseShape></FolderShape>
      <FolderIds><t:DistinguishedFolderId Id="inbox"/></FolderIds>
    </GetFolder>
  </soap:Body>
</soap:Envelope>"#;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let endpoint = std::env::var("EWS_ENDPOINT")
        .unwrap_or_else(|_| "https://outlook.office365.com/EWS/Exchange.asmx".to_owned());

    let mut builder = AsyncConnection::builder(&endpoint)?.no_system_proxy();
    if let Some(token) = std::env::var("EWS_TOKEN").ok().filter(|v| !v.trim().is_empty()) {
        builder = builder.auth(Auth::bearer(token));
    }

    let conn = builder.build()?;
    let body = conn.post(GET_INBOX).await?;
    println!("{body}");
    Ok(())
}
