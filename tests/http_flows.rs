use anyhow::Result;
#[cfg(feature = "async")]
use ews_transport::AsyncConnection;
#[cfg(feature = "blocking")]
use ews_transport::Connection;
use ews_transport::{Error, ErrorKind, SoapFault};
use http::StatusCode;
#[cfg(feature = "blocking")]
use tokio::task;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, header, method, path},
};

const EWS_PATH: &str = "/EWS/Exchange.asmx";

const FAULT_ENVELOPE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <soap:Fault>
      <faultstring>Bad</faultstring>
      <faultcode>soap:Client</faultcode>
    </soap:Fault>
  </soap:Body>
</soap:Envelope>"#;

const FIND_FOLDER: &str = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body><FindFolder Traversal="Shallow"/></soap:Body></soap:Envelope>"#;

fn endpoint(server: &MockServer) -> String {
    format!("{}{EWS_PATH}", server.uri())
}

async fn mock_any(server: &MockServer, verb: &str, response: ResponseTemplate) {
    Mock::given(method(verb))
        .and(path(EWS_PATH))
        .respond_with(response)
        .expect(1)
        .up_to_n_times(1)
        .mount(server)
        .await;
}

#[cfg(feature = "blocking")]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn blocking_post_sends_text_xml_and_returns_body() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(EWS_PATH))
        .and(header("Content-Type", "text/xml"))
        .and(body_string_contains("<FindFolder"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<m:FindFolderResponse>\n  ok </m:FindFolderResponse>",
            "text/xml; charset=utf-8",
        ))
        .expect(1)
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let endpoint = endpoint(&server);
    task::spawn_blocking(move || -> Result<()> {
        let conn = Connection::new(endpoint)?;
        let body = conn.post(FIND_FOLDER)?;
        assert_eq!(body, "<m:FindFolderResponse>\n  ok </m:FindFolderResponse>");
        Ok(())
    })
    .await??;

    server.verify().await;
    Ok(())
}

#[cfg(feature = "blocking")]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn blocking_authenticate_presents_credentials() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(EWS_PATH))
        .and(header("Authorization", "Basic dXNlcjp0b2tlbg=="))
        .respond_with(ResponseTemplate::new(200).set_body_string("wsdl"))
        .expect(1)
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let endpoint = endpoint(&server);
    task::spawn_blocking(move || -> Result<()> {
        let mut conn = Connection::new(endpoint)?;
        conn.set_auth("user", "token");
        assert!(conn.authenticate()?);
        Ok(())
    })
    .await??;

    server.verify().await;
    Ok(())
}

#[cfg(feature = "blocking")]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn blocking_redirect_is_not_followed() -> Result<()> {
    let server = MockServer::start().await;

    let target = format!("{}/elsewhere", server.uri());
    mock_any(
        &server,
        "GET",
        ResponseTemplate::new(302)
            .append_header("Location", target.as_str())
            .set_body_string("moved"),
    )
    .await;
    Mock::given(path("/elsewhere"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let endpoint = endpoint(&server);
    task::spawn_blocking(move || -> Result<()> {
        let conn = Connection::new(endpoint)?;
        match conn.get() {
            Err(Error::UnhandledRedirect { location }) => {
                assert_eq!(location.as_deref(), Some(target.as_str()));
            }
            other => panic!("expected unhandled redirect, got {other:?}"),
        }
        Ok(())
    })
    .await??;

    server.verify().await;
    Ok(())
}

#[cfg(feature = "blocking")]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn blocking_soap_fault_is_parsed() -> Result<()> {
    let server = MockServer::start().await;

    mock_any(
        &server,
        "POST",
        ResponseTemplate::new(500).set_body_raw(FAULT_ENVELOPE, "text/xml; charset=utf-8"),
    )
    .await;

    let endpoint = endpoint(&server);
    task::spawn_blocking(move || -> Result<()> {
        let conn = Connection::new(endpoint)?;
        let err = conn.post(FIND_FOLDER).unwrap_err();
        assert_eq!(err.soap_fault(), Some(&SoapFault::new("Bad", "soap:Client")));
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        Ok(())
    })
    .await??;

    server.verify().await;
    Ok(())
}

#[cfg(feature = "blocking")]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn blocking_server_error_without_xml_keeps_raw_body() -> Result<()> {
    let server = MockServer::start().await;

    mock_any(
        &server,
        "POST",
        ResponseTemplate::new(500).set_body_raw("<h1>Runtime Error</h1>", "text/html"),
    )
    .await;

    let endpoint = endpoint(&server);
    task::spawn_blocking(move || -> Result<()> {
        let conn = Connection::new(endpoint)?;
        match conn.post(FIND_FOLDER) {
            Err(Error::InternalServerError { body }) => {
                assert_eq!(body, "<h1>Runtime Error</h1>");
            }
            other => panic!("expected internal server error, got {other:?}"),
        }
        Ok(())
    })
    .await??;

    server.verify().await;
    Ok(())
}

#[cfg(feature = "blocking")]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn blocking_other_status_is_http_error() -> Result<()> {
    let server = MockServer::start().await;

    mock_any(
        &server,
        "GET",
        ResponseTemplate::new(404).set_body_string("no such endpoint"),
    )
    .await;

    let endpoint = endpoint(&server);
    task::spawn_blocking(move || -> Result<()> {
        let conn = Connection::new(endpoint)?;
        match conn.get() {
            Err(Error::Http { status, body }) => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(body, "no such endpoint");
            }
            other => panic!("expected HTTP error, got {other:?}"),
        }
        Ok(())
    })
    .await??;

    server.verify().await;
    Ok(())
}

#[cfg(feature = "blocking")]
#[test]
fn blocking_refused_connection_is_transport_error() -> Result<()> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let port = listener.local_addr()?.port();
    drop(listener);

    let conn = Connection::builder(format!("http://127.0.0.1:{port}{EWS_PATH}"))?
        .no_system_proxy()
        .build()?;
    let err = conn.get().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.status().is_none());
    Ok(())
}

#[cfg(feature = "async")]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn async_post_sends_text_xml_with_credentials() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(EWS_PATH))
        .and(header("Content-Type", "text/xml"))
        .and(header("Authorization", "Basic dXNlcjp0b2tlbg=="))
        .and(body_string_contains("<FindFolder"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<ok/>"))
        .expect(1)
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let conn = AsyncConnection::builder(endpoint(&server))?
        .auth_basic("user", "token")
        .build()?;
    assert_eq!(conn.post(FIND_FOLDER).await?, "<ok/>");

    server.verify().await;
    Ok(())
}

#[cfg(feature = "async")]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn async_soap_fault_is_parsed() -> Result<()> {
    let server = MockServer::start().await;

    mock_any(
        &server,
        "POST",
        ResponseTemplate::new(500).set_body_raw(FAULT_ENVELOPE, "text/xml"),
    )
    .await;

    let conn = AsyncConnection::new(endpoint(&server))?;
    let err = conn.post(FIND_FOLDER).await.unwrap_err();
    assert_eq!(err.soap_fault(), Some(&SoapFault::new("Bad", "soap:Client")));

    server.verify().await;
    Ok(())
}

#[cfg(feature = "async")]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn async_redirect_is_not_followed() -> Result<()> {
    let server = MockServer::start().await;

    mock_any(
        &server,
        "GET",
        ResponseTemplate::new(302).append_header("Location", "/elsewhere"),
    )
    .await;

    let conn = AsyncConnection::new(endpoint(&server))?;
    let err = conn.authenticate().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Redirect);

    server.verify().await;
    Ok(())
}

#[cfg(feature = "async")]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn async_other_status_is_http_error() -> Result<()> {
    let server = MockServer::start().await;

    mock_any(
        &server,
        "GET",
        ResponseTemplate::new(401).set_body_string("denied"),
    )
    .await;

    let conn = AsyncConnection::new(endpoint(&server))?;
    match conn.get().await {
        Err(Error::Http { status, body }) => {
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body, "denied");
        }
        other => panic!("expected HTTP error, got {other:?}"),
    }

    server.verify().await;
    Ok(())
}
