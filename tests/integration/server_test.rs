// HTTP server tests over a real socket
// Binds an ephemeral port, serves from an in-memory store and talks raw HTTP/1

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_util::rt::TokioIo;
use mockup_forge::config::Config;
use mockup_forge::mockup::MockupService;
use mockup_forge::storage::MockObjectStore;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};

async fn start_server(max_request_bytes: usize) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().unwrap();

    let service = MockupService::new(Arc::new(Config::default()), Arc::new(MockObjectStore::new()))
        .expect("service should build");

    tokio::spawn(async move {
        let _ = mockup_forge::server::run(listener, Arc::new(service), max_request_bytes).await;
    });

    addr
}

/// Send a single request and return status, headers and body
async fn send(
    addr: SocketAddr,
    method: &str,
    path: &str,
    body: &str,
) -> Result<(u16, hyper::HeaderMap, String), Box<dyn std::error::Error>> {
    let stream = TcpStream::connect(addr).await?;
    let io = TokioIo::new(stream);

    let (mut sender, conn) = hyper::client::conn::http1::handshake(io).await?;
    tokio::task::spawn(async move {
        if let Err(err) = conn.await {
            eprintln!("Connection failed: {:?}", err);
        }
    });

    let req = hyper::Request::builder()
        .method(method)
        .uri(path)
        .header("Host", addr.to_string())
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))?;

    let res = sender.send_request(req).await?;
    let status = res.status().as_u16();
    let headers = res.headers().clone();
    let body_bytes = res.into_body().collect().await?.to_bytes();

    Ok((status, headers, String::from_utf8_lossy(&body_bytes).to_string()))
}

#[tokio::test]
async fn test_health_endpoint() {
    let addr = start_server(1024).await;
    let (status, headers, body) = send(addr, "GET", "/health", "").await.unwrap();

    assert_eq!(status, 200);
    assert_eq!(headers["content-type"], "application/json");
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_missing_parameters_over_http() {
    let addr = start_server(1024).await;
    let (status, headers, body) = send(addr, "POST", "/mockup", r#"{"email":"a@b.com"}"#)
        .await
        .unwrap();

    assert_eq!(status, 400);
    assert_eq!(headers["access-control-allow-origin"], "*");
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(
        json["message"],
        "Missing required parameters: logoUrl and email are required"
    );
}

#[tokio::test]
async fn test_missing_background_over_http() {
    let addr = start_server(1024).await;
    let (status, _, body) = send(
        addr,
        "POST",
        "/mockup",
        r#"{"logoUrl":"logos/x.png","email":"a@b.com"}"#,
    )
    .await
    .unwrap();

    assert_eq!(status, 500);
    assert!(body.contains("Error creating mockup"));
}

#[tokio::test]
async fn test_oversized_request_rejected() {
    let addr = start_server(16).await;
    let payload = format!(r#"{{"logoUrl":"{}","email":"a@b.com"}}"#, "x".repeat(64));
    let (status, _, _) = send(addr, "POST", "/mockup", &payload).await.unwrap();

    assert_eq!(status, 413);
}
