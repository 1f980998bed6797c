use std::{
    io::{self, BufRead, BufReader, Read, Write},
    net::{TcpListener, TcpStream},
    sync::Arc,
    thread,
};

use cribl_session::{
    lib::errors::AuthError,
    session::{
        auth::TokenExchange,
        transport::{build_http_client, TlsPolicy},
    },
};
use rustls::{
    pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer},
    ServerConfig, ServerConnection, StreamOwned,
};
use url::Url;

use crate::common::{onprem_env, run_captured, worker_groups_profile};

const GROUPS_BODY: &str = r#"{"count":1,"items":[{"id":"tlsgroup","workerCount":1}]}"#;

/// Leader stand-in served over TLS with a freshly generated self-signed certificate.
struct TlsLeader {
    port: u16,
}

impl TlsLeader {
    fn start() -> Self {
        let certified = rcgen::generate_simple_self_signed(vec!["localhost".to_string()])
            .expect("self-signed certificate");
        let cert = CertificateDer::from(certified.cert.der().to_vec());
        let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(
            certified.key_pair.serialize_der(),
        ));
        let config = ServerConfig::builder_with_provider(Arc::new(
            rustls::crypto::ring::default_provider(),
        ))
        .with_safe_default_protocol_versions()
        .expect("default protocol versions")
        .with_no_client_auth()
        .with_single_cert(vec![cert], key)
        .expect("server certificate accepted");
        let config = Arc::new(config);

        let listener = TcpListener::bind("127.0.0.1:0").expect("can bind an ephemeral port");
        let port = listener
            .local_addr()
            .expect("bound listener has an address")
            .port();
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let config = Arc::clone(&config);
                // Rejected handshakes end the connection; nothing to report.
                thread::spawn(move || serve(config, stream).ok());
            }
        });

        Self { port }
    }

    fn url(&self) -> String {
        format!("https://127.0.0.1:{}", self.port)
    }
}

/// One request per connection, answered with `connection: close`.
fn serve(config: Arc<ServerConfig>, stream: TcpStream) -> io::Result<()> {
    let conn = ServerConnection::new(config).map_err(io::Error::other)?;
    let mut tls = StreamOwned::new(conn, stream);

    let request_line = {
        let mut reader = BufReader::new(&mut tls);
        let mut request_line = String::new();
        reader.read_line(&mut request_line)?;

        let mut content_length = 0;
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap_or(0);
                }
            }
        }
        let mut body = vec![0; content_length];
        reader.read_exact(&mut body)?;
        request_line
    };

    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default();
    let path = parts.next().unwrap_or_default();
    let (status, body) = match (method, path.split('?').next().unwrap_or_default()) {
        ("POST", "/api/v1/auth/login") => ("200 OK", r#"{"token":"tok"}"#),
        ("GET", "/api/v1/products/stream/groups") => ("200 OK", GROUPS_BODY),
        _ => ("404 Not Found", "{}"),
    };

    write!(
        tls,
        "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    )?;
    tls.conn.send_close_notify();
    tls.flush()
}

#[tokio::test]
async fn self_signed_leader_is_listed_by_default() {
    let leader = TlsLeader::start();

    let printed = run_captured(worker_groups_profile(), onprem_env(&leader.url(), &[])).await;

    assert!(printed.contains("Accepting self-signed certificates (insecure mode)\n"));
    assert!(printed.contains("Authenticated with on-prem server\n"), "{printed}");
    assert!(printed.contains("Worker Group: tlsgroup\n"), "{printed}");
}

#[tokio::test]
async fn self_signed_leader_fails_verification_when_opted_out() {
    let leader = TlsLeader::start();

    let printed = run_captured(
        worker_groups_profile(),
        onprem_env(&leader.url(), &[("CRIBL_INSECURE_TLS", "FALSE")]),
    )
    .await;

    assert!(!printed.contains("insecure mode"));
    assert!(printed.contains("TLS certificate verification failed"), "{printed}");
    assert!(printed.contains("CRIBL_INSECURE_TLS=true"), "{printed}");
    assert!(!printed.contains("Worker Group"));
}

#[tokio::test]
async fn verifying_client_classifies_the_handshake_as_a_certificate_error() {
    let leader = TlsLeader::start();
    let base = Url::parse(&format!("{}/api/v1", leader.url())).expect("valid url");
    let http = build_http_client(TlsPolicy::Verify, &base).expect("client builds");

    let mut exchange = TokenExchange::new(http, &base).expect("valid base");
    match exchange.request_token("admin", "admin").await {
        Err(AuthError::Certificate { url, .. }) => assert!(url.ends_with("/api/v1/auth/login")),
        other => panic!("Unexpected result: {other:?}"),
    }
}
