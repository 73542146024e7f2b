//! HTTP front end.
//!
//! # Responsibilities
//! - Catch-all route: any method, any path, any body
//! - Drive the pipeline: translate → invoke → resolve → respond
//! - Map per-request failures to plain-text error responses
//! - Emit one access-log line per proxied request
//!
//! # Design Decisions
//! - One tokio task per request; no in-flight limit, no host-side pooling
//! - The payload format branch is taken per request from a value fixed at
//!   startup; configuration is shared read-only via Arc
//! - Errors never cross requests: a failed invocation leaves no state
//!   behind, the next request dials the host afresh

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderName, HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Local;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::{GatewayConfig, PayloadFormat};
use crate::error::GatewayError;
use crate::event::{self, response::resolve_v2, v1, v2, ProxyResponseEvent};
use crate::rpc;

/// Build the gateway router: one handler bound to `/` and every subpath.
pub fn router(config: Arc<GatewayConfig>) -> Router {
    Router::new()
        .route("/", any(handle))
        .route("/{*path}", any(handle))
        .with_state(config)
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until shutdown.
pub async fn serve(config: GatewayConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let config = Arc::new(config);
    let app = router(config.clone()).into_make_service_with_connect_info::<SocketAddr>();

    match &config.tls {
        Some(pair) => {
            let tls = RustlsConfig::from_pem_file(&pair.cert_path, &pair.key_path).await?;
            tracing::info!(
                cert = %pair.cert_path.display(),
                key = %pair.key_path.display(),
                "Serving HTTPS"
            );
            axum_server::bind_rustls(addr, tls).serve(app).await?;
        }
        None => {
            let listener = TcpListener::bind(addr).await?;
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
    }

    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn handle(
    State(config): State<Arc<GatewayConfig>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    match proxy(&config, peer, request).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// The full pipeline for one request.
async fn proxy(
    config: &GatewayConfig,
    peer: SocketAddr,
    request: Request<Body>,
) -> Result<Response, GatewayError> {
    // Captured once; the v2 event timestamps and the access log agree.
    let now = Local::now();

    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(GatewayError::ReadBody)?;

    let host = event::host_of(&parts.headers, &parts.uri);
    let path = event::decoded_path(&parts.uri);

    let payload = match config.format {
        PayloadFormat::V1 => serde_json::to_string(&v1::build_event(
            config,
            &parts.method,
            &parts.uri,
            &parts.headers,
            peer.ip(),
            &body,
        )),
        PayloadFormat::V2 => serde_json::to_string(&v2::build_event(
            config,
            &parts.method,
            &parts.uri,
            parts.version,
            &parts.headers,
            peer.ip(),
            now,
            &body,
        )),
    }
    .map_err(GatewayError::Serialize)?;

    let reply = rpc::invoke(&config.lambda_host, payload)
        .await
        .map_err(GatewayError::Invoke)?;

    let response_event = match config.format {
        PayloadFormat::V1 => serde_json::from_str::<ProxyResponseEvent>(&reply)
            .map_err(|e| GatewayError::Invoke(rpc::InvokeError::Decode(e)))?,
        PayloadFormat::V2 => {
            resolve_v2(&reply).map_err(|e| GatewayError::Invoke(rpc::InvokeError::Decode(e)))?
        }
    };

    let body_len = response_event.body.len();
    let response = into_http_response(response_event)?;

    // access log: host [timestamp] "METHOD path" body_len
    tracing::info!(
        host = %host,
        time = %now.format("%Y-%m-%d %H:%M:%S"),
        method = %parts.method,
        path = %path,
        body_len,
        "Request proxied"
    );

    Ok(response)
}

/// Map a proxy-response event onto an HTTP response.
///
/// Headers and status are set verbatim; nothing is added or suppressed
/// beyond what the event specifies. Binary bodies are base64-decoded.
fn into_http_response(event: ProxyResponseEvent) -> Result<Response, GatewayError> {
    let status =
        StatusCode::from_u16(event.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut builder = Response::builder().status(status);
    for (name, value) in &event.headers {
        match (
            HeaderName::try_from(name.as_str()),
            HeaderValue::try_from(value.as_str()),
        ) {
            (Ok(name), Ok(value)) => builder = builder.header(name, value),
            _ => tracing::warn!(header = %name, "Skipping invalid response header"),
        }
    }

    let body = if event.is_base64_encoded {
        Body::from(
            BASE64
                .decode(&event.body)
                .map_err(GatewayError::DecodeResponseBody)?,
        )
    } else {
        Body::from(event.body)
    };

    Ok(builder
        .body(body)
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()))
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::error!("Failed to install Ctrl+C handler");
        return;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn response_headers_and_status_are_verbatim() {
        let event = ProxyResponseEvent {
            status_code: 201,
            headers: HashMap::from([("x-custom".to_owned(), "yes".to_owned())]),
            body: "created".to_owned(),
            is_base64_encoded: false,
        };
        let response = into_http_response(event).unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers().get("x-custom").unwrap(), "yes");
    }

    #[test]
    fn invalid_status_code_falls_back_to_500() {
        let event = ProxyResponseEvent {
            status_code: 42,
            ..Default::default()
        };
        let response = into_http_response(event).unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn invalid_base64_body_is_an_error() {
        let event = ProxyResponseEvent {
            status_code: 200,
            headers: HashMap::new(),
            body: "!!! not base64 !!!".to_owned(),
            is_base64_encoded: true,
        };
        let err = into_http_response(event).unwrap_err();
        assert!(matches!(err, GatewayError::DecodeResponseBody(_)));
    }

    #[test]
    fn invalid_header_names_are_skipped() {
        let event = ProxyResponseEvent {
            status_code: 200,
            headers: HashMap::from([
                ("bad header name".to_owned(), "x".to_owned()),
                ("x-good".to_owned(), "ok".to_owned()),
            ]),
            body: String::new(),
            is_base64_encoded: false,
        };
        let response = into_http_response(event).unwrap();
        assert_eq!(response.headers().len(), 1);
        assert_eq!(response.headers().get("x-good").unwrap(), "ok");
    }
}
