//! WikidataClient against a local one-shot HTTP server
//!
//! The server accepts a single connection, records the raw request and
//! answers with a canned status and body.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use osm_wikidata_labels::{EntityId, LabelSource, ResolveError, ResolverConfig, WikidataClient};

/// Request as seen by the server
struct CapturedRequest {
    head: String,
    body: String,
}

async fn serve_once(status: &'static str, body: &'static str) -> (url::Url, JoinHandle<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];
        let head_end = loop {
            let n = socket.read(&mut buf).await.unwrap();
            assert!(n > 0, "client closed before sending headers");
            raw.extend_from_slice(&buf[..n]);
            if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&raw[..head_end]).to_string();
        let content_length = head
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);

        while raw.len() < head_end + content_length {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
        }
        let request_body = String::from_utf8_lossy(&raw[head_end..]).to_string();

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/sparql-results+json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();

        CapturedRequest {
            head,
            body: request_body,
        }
    });

    let endpoint = url::Url::parse(&format!("http://{}/sparql", addr)).unwrap();
    (endpoint, handle)
}

fn client_for(endpoint: url::Url) -> WikidataClient {
    WikidataClient::new(&ResolverConfig {
        endpoint,
        user_agent: "osm-wikidata-labels tests".to_string(),
        timeout: Duration::from_secs(10),
    })
    .unwrap()
}

fn qids(values: &[i64]) -> Vec<EntityId> {
    values.iter().filter_map(|v| EntityId::new(*v)).collect()
}

#[tokio::test]
async fn test_fetch_labels_posts_form_query() {
    let body = r#"{"head":{"vars":["id","label"]},"results":{"bindings":[
        {"id":{"type":"uri","value":"http://www.wikidata.org/entity/Q42"},
         "label":{"type":"literal","xml:lang":"en","value":"Douglas Adams"}},
        {"id":{"type":"uri","value":"http://www.wikidata.org/entity/Q42"},
         "label":{"type":"literal","xml:lang":"ru","value":"Дуглас Адамс"}}
    ]}}"#;
    let (endpoint, server) = serve_once("200 OK", body).await;
    let client = client_for(endpoint);

    let labels = client.fetch_labels(&qids(&[42, 43])).await.unwrap();
    let request = server.await.unwrap();

    assert!(request.head.starts_with("POST /sparql HTTP/1.1"));
    let head = request.head.to_ascii_lowercase();
    assert!(head.contains("accept: application/sparql-results+json"));
    assert!(head.contains("user-agent: osm-wikidata-labels tests"));
    assert!(head.contains("content-type: application/x-www-form-urlencoded"));
    assert!(request.body.starts_with("query=SELECT"));
    assert!(request.body.contains("wd%3AQ42+wd%3AQ43"));

    assert_eq!(labels.len(), 1);
    let record = &labels[&EntityId::new(42).unwrap()];
    assert_eq!(record.get("name:en"), Some("Douglas Adams"));
    assert_eq!(record.get("name:ru"), Some("Дуглас Адамс"));
}

#[tokio::test]
async fn test_error_status_is_fatal_and_carries_query() {
    let (endpoint, server) = serve_once("503 Service Unavailable", "overloaded").await;
    let client = client_for(endpoint);

    let err = client.fetch_labels(&qids(&[42])).await.unwrap_err();
    server.await.unwrap();

    match &err {
        ResolveError::Status {
            status,
            reason,
            body,
            query,
        } => {
            assert_eq!(*status, 503);
            assert_eq!(reason, "Service Unavailable");
            assert_eq!(body, "overloaded");
            assert!(query.contains("wd:Q42"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let (endpoint, server) = serve_once("200 OK", r#"{"results":{}}"#).await;
    let client = client_for(endpoint);

    let err = client.fetch_labels(&qids(&[42])).await.unwrap_err();
    server.await.unwrap();

    assert!(matches!(err, ResolveError::Decode { .. }));
    assert!(err.query().contains("VALUES ?id { wd:Q42 }"));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    // Bind then drop to get a port nobody listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(url::Url::parse(&format!("http://{}/sparql", addr)).unwrap());
    let err = client.fetch_labels(&qids(&[42])).await.unwrap_err();

    assert!(matches!(err, ResolveError::Transport { .. }));
}
