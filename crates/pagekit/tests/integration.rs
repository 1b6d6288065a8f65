//! Integration tests for PageKit using wiremock, raw TCP and TLS servers

use pagekit::{
    fetch, fetch_response, fetch_with_options, parse, strip_tags, FetchError, FetchOptions,
    Scheme, DEFAULT_USER_AGENT,
};
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::{ClientConfig, RootCertStore, ServerConfig};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_rustls::TlsAcceptor;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Accept one connection, capture the request head, reply with `response`
/// and close. Resolves to the captured request bytes.
async fn serve_once(response: &'static [u8]) -> (u16, JoinHandle<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        socket.write_all(response).await.unwrap();
        socket.shutdown().await.unwrap();
        request
    });

    (port, handle)
}

/// Accept one connection and immediately answer with plaintext, ignoring
/// whatever the client sends.
async fn serve_plaintext_to_anyone() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let _ = socket
            .write_all(b"HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\n\r\n")
            .await;
        let _ = socket.shutdown().await;
    });

    port
}

#[tokio::test]
async fn test_simple_get() {
    init_tracing();
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .and(header("user-agent", DEFAULT_USER_AGENT))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<p>Hello, World!</p>", "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let target = parse(&format!("{}/page", mock_server.uri()));
    assert_eq!(target.scheme, Scheme::Http);
    assert_eq!(target.host, "127.0.0.1");

    let resp = fetch_response(&target).await.unwrap();
    assert_eq!(resp.status_code, Some(200));
    assert_eq!(resp.reason.as_deref(), Some("OK"));
    assert_eq!(resp.content_type, Some("text/html".to_string()));
    assert_eq!(resp.content, "<p>Hello, World!</p>");
    assert_eq!(strip_tags(&resp.content), "Hello, World!");
}

#[tokio::test]
async fn test_custom_user_agent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "TestAgent/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let target = parse(&mock_server.uri());
    assert_eq!(target.path, "/");

    let options = FetchOptions::default().user_agent("TestAgent/1.0");
    let resp = fetch_with_options(&target, &options).await.unwrap();
    assert_eq!(resp.content, "ok");
}

#[tokio::test]
async fn test_4xx_status_returns_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/not-found"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_string("Not Found")
                .insert_header("content-type", "text/plain"),
        )
        .mount(&mock_server)
        .await;

    let target = parse(&format!("{}/not-found", mock_server.uri()));
    let resp = fetch_response(&target).await.unwrap();

    // 4xx is still a successful fetch
    assert_eq!(resp.status_code, Some(404));
    assert_eq!(resp.content, "Not Found");
}

#[tokio::test]
async fn test_content_encoding_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![0x1f, 0x8b, 0x08, 0x00])
                .insert_header("content-encoding", "gzip"),
        )
        .mount(&mock_server)
        .await;

    let target = parse(&format!("{}/", mock_server.uri()));
    let err = fetch(&target).await.unwrap_err();

    assert!(err.is_encoding_error());
    assert!(err.to_string().contains("content-encoding: gzip"));
}

#[tokio::test]
async fn test_request_is_byte_exact() {
    let (port, server) =
        serve_once(b"HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n<p>ok</p>").await;

    let target = parse(&format!("http://localhost:{port}/some/path?q=1"));
    let body = fetch(&target).await.unwrap();
    assert_eq!(body, "<p>ok</p>");
    assert_eq!(strip_tags(&body), "ok");

    let request = server.await.unwrap();
    assert_eq!(
        String::from_utf8(request).unwrap(),
        format!(
            "GET /some/path?q=1 HTTP/1.1\r\n\
             Host: localhost\r\n\
             User-Agent: {DEFAULT_USER_AGENT}\r\n\
             Connection: close\r\n\
             \r\n"
        )
    );
}

#[tokio::test]
async fn test_chunked_response_rejected() {
    let (port, server) = serve_once(
        b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n0\r\n\r\n",
    )
    .await;

    let target = parse(&format!("http://127.0.0.1:{port}/"));
    let err = fetch(&target).await.unwrap_err();

    match err {
        FetchError::UnsupportedEncoding { header, value } => {
            assert_eq!(header, "transfer-encoding");
            assert_eq!(value, "chunked");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    server.await.unwrap();
}

#[tokio::test]
async fn test_body_read_until_close() {
    // No Content-Length: the body ends when the server closes
    let (port, server) =
        serve_once(b"HTTP/1.0 200 OK\r\nServer: raw\r\n\r\nfirst line\r\nsecond line").await;

    let target = parse(&format!("127.0.0.1:{port}/"));
    let resp = fetch_response(&target).await.unwrap();

    assert_eq!(resp.status_code, Some(200));
    assert_eq!(resp.content, "first line\r\nsecond line");
    server.await.unwrap();
}

#[tokio::test]
async fn test_malformed_status_line() {
    let (port, server) = serve_once(b"SSH-2.0-OpenSSH_9.6\r\n").await;

    let target = parse(&format!("http://127.0.0.1:{port}/"));
    let err = fetch(&target).await.unwrap_err();

    assert!(matches!(err, FetchError::InvalidResponse(_)));
    server.await.unwrap();
}

/// Self-signed certificate for `localhost`, as server config plus its DER
fn self_signed_localhost() -> (Arc<ServerConfig>, CertificateDer<'static>) {
    let key_pair = rcgen::KeyPair::generate().unwrap();
    let cert = rcgen::CertificateParams::new(vec!["localhost".to_string()])
        .unwrap()
        .self_signed(&key_pair)
        .unwrap();
    let cert_der = cert.der().clone();
    let key_der = PrivateKeyDer::try_from(key_pair.serialize_der()).unwrap();

    let server_config =
        ServerConfig::builder_with_provider(rustls::crypto::ring::default_provider().into())
            .with_safe_default_protocol_versions()
            .unwrap()
            .with_no_client_auth()
            .with_single_cert(vec![cert_der.clone()], key_der)
            .unwrap();

    (Arc::new(server_config), cert_der)
}

fn trusting(cert: CertificateDer<'static>) -> Arc<ClientConfig> {
    let mut roots = RootCertStore::empty();
    roots.add(cert).unwrap();
    let config =
        ClientConfig::builder_with_provider(rustls::crypto::ring::default_provider().into())
            .with_safe_default_protocol_versions()
            .unwrap()
            .with_root_certificates(roots)
            .with_no_client_auth();
    Arc::new(config)
}

/// Accept one TLS connection, read the request head, reply with `response`
/// and close with close_notify. Handshake failures end the task quietly.
async fn serve_tls_once(config: Arc<ServerConfig>, response: &'static [u8]) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let acceptor = TlsAcceptor::from(config);

    tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let Ok(mut tls) = acceptor.accept(socket).await else {
            return;
        };
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match tls.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
        }
        let _ = tls.write_all(response).await;
        let _ = tls.shutdown().await;
    });

    port
}

#[tokio::test]
async fn test_https_fetch_with_trusted_certificate() {
    init_tracing();
    let (server_config, cert) = self_signed_localhost();
    let port = serve_tls_once(
        server_config,
        b"HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n<p>secure</p>",
    )
    .await;

    let target = parse(&format!("https://localhost:{port}/"));
    assert_eq!(target.scheme, Scheme::Https);

    let options = FetchOptions::default().tls_config(trusting(cert));
    let resp = fetch_with_options(&target, &options).await.unwrap();
    assert_eq!(resp.status_code, Some(200));
    assert_eq!(resp.content, "<p>secure</p>");
    assert_eq!(strip_tags(&resp.content), "secure");
}

#[tokio::test]
async fn test_https_rejects_untrusted_certificate() {
    let (server_config, _) = self_signed_localhost();
    let port = serve_tls_once(server_config, b"HTTP/1.1 200 OK\r\n\r\nleaked").await;

    let target = parse(&format!("https://localhost:{port}/"));
    let err = fetch(&target).await.unwrap_err();

    assert!(matches!(err, FetchError::TlsHandshake(_)), "got {err:?}");
}

#[tokio::test]
async fn test_tls_handshake_failure_against_plaintext_server() {
    init_tracing();
    let port = serve_plaintext_to_anyone().await;

    let target = parse(&format!("https://127.0.0.1:{port}/"));
    assert_eq!(target.scheme, Scheme::Https);

    let err = fetch(&target).await.unwrap_err();
    assert!(matches!(err, FetchError::TlsHandshake(_)), "got {err:?}");
    assert!(err.is_connection_error());
}

#[tokio::test]
async fn test_connection_refused() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let target = parse(&format!("http://127.0.0.1:{port}/"));
    let err = fetch(&target).await.unwrap_err();

    assert!(matches!(err, FetchError::Connect { .. }));
    assert!(err.to_string().contains(&format!("127.0.0.1:{port}")));
}

#[tokio::test]
async fn test_data_scheme_end_to_end() {
    let target = parse("data:text/html,<b>hi</b>");
    assert_eq!(target.scheme, Scheme::Data);

    let body = fetch(&target).await.unwrap();
    assert_eq!(body, "<b>hi</b>");
    assert_eq!(strip_tags(&body), "hi");
}

#[tokio::test]
async fn test_file_scheme_end_to_end() {
    let path = std::env::temp_dir().join(format!("pagekit-it-{}.html", std::process::id()));
    std::fs::write(&path, "<h1>Local</h1>").unwrap();

    let target = pagekit::Locator::with_default_file(&path).parse("");
    assert_eq!(target.scheme, Scheme::File);

    let body = fetch(&target).await.unwrap();
    assert_eq!(strip_tags(&body), "Local");
    std::fs::remove_file(&path).unwrap();
}

#[tokio::test]
async fn test_unparsable_input_uses_fallback() {
    let target = parse("not a url");
    assert_eq!(target, pagekit::Target::fallback());
    assert_eq!(target.scheme, Scheme::Https);
    assert_eq!(target.port, 443);
}
