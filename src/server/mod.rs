// Server module - HTTP/1 surface for the mockup handler
//
// Routes:
//   POST /mockup    body is a handler event, response mirrors the envelope
//   GET  /health    liveness probe
//   OPTIONS *       CORS preflight

use crate::config::ServerConfig;
use crate::handler::{self, default_headers, ResponseEnvelope};
use crate::mockup::MockupService;
use bytes::Bytes;
use http::{header, Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::net::TcpListener;

pub const MOCKUP_PATH: &str = "/mockup";
pub const HEALTH_PATH: &str = "/health";

/// Bind to the configured address and serve until the process exits
pub async fn serve(service: Arc<MockupService>, config: &ServerConfig) -> std::io::Result<()> {
    let listener = TcpListener::bind(config.listen_addr()).await?;
    tracing::info!(address = %listener.local_addr()?, "Starting mockup server");
    run(listener, service, config.max_request_bytes).await
}

/// Accept loop on an already bound listener. One task per connection.
pub async fn run(
    listener: TcpListener,
    service: Arc<MockupService>,
    max_request_bytes: usize,
) -> std::io::Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let service = service.clone();

        tokio::spawn(async move {
            let svc = service_fn(move |req| {
                let service = service.clone();
                async move { Ok::<_, Infallible>(route(&service, req, max_request_bytes).await) }
            });

            if let Err(e) = http1::Builder::new().serve_connection(io, svc).await {
                tracing::debug!(peer = %peer, error = %e, "Connection closed with error");
            }
        });
    }
}

/// Dispatch a single request
pub async fn route<B>(
    service: &MockupService,
    req: Request<B>,
    max_request_bytes: usize,
) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    tracing::debug!(method = %method, path = %path, "Request received");

    match (method, path.as_str()) {
        (Method::OPTIONS, _) => preflight(),
        (Method::GET, HEALTH_PATH) => health(),
        (Method::POST, MOCKUP_PATH) => create(service, req, max_request_bytes).await,
        (_, MOCKUP_PATH) | (_, HEALTH_PATH) => {
            plain(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
        }
        _ => plain(StatusCode::NOT_FOUND, "Not found"),
    }
}

async fn create<B>(
    service: &MockupService,
    req: Request<B>,
    max_request_bytes: usize,
) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let declared_length = req
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared_length.is_some_and(|len| len > max_request_bytes) {
        return too_large(max_request_bytes);
    }

    let body = match Limited::new(req.into_body(), max_request_bytes).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            return too_large(max_request_bytes)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read request body");
            return plain(StatusCode::BAD_REQUEST, "Failed to read request body");
        }
    };

    envelope_response(handler::handle_body(service, &body).await)
}

/// Convert a handler envelope into an HTTP response
pub fn envelope_response(envelope: ResponseEnvelope) -> Response<Full<Bytes>> {
    let status =
        StatusCode::from_u16(envelope.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    with_headers(status, &envelope.headers, Bytes::from(envelope.body))
}

fn health() -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    })
    .to_string();
    with_headers(StatusCode::OK, &default_headers(), Bytes::from(body))
}

fn preflight() -> Response<Full<Bytes>> {
    let mut response = with_headers(StatusCode::NO_CONTENT, &default_headers(), Bytes::new());
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        header::HeaderValue::from_static("POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        header::HeaderValue::from_static("Content-Type"),
    );
    response
}

fn too_large(limit: usize) -> Response<Full<Bytes>> {
    plain(
        StatusCode::PAYLOAD_TOO_LARGE,
        &format!("Request body exceeds {} bytes", limit),
    )
}

fn plain(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    let envelope = ResponseEnvelope::message(status.as_u16(), message);
    envelope_response(envelope)
}

fn with_headers(
    status: StatusCode,
    headers: &std::collections::BTreeMap<String, String>,
    body: Bytes,
) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;

    for (name, value) in headers {
        if let (Ok(name), Ok(value)) = (
            header::HeaderName::from_bytes(name.as_bytes()),
            header::HeaderValue::from_str(value),
        ) {
            response.headers_mut().insert(name, value);
        }
    }

    response
}
