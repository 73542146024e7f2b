//! Shared utilities for integration tests.
//!
//! Provides a programmable mock function host speaking the framed RPC
//! protocol, plus a helper that runs the gateway on an ephemeral port.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use lambda_dev_gateway::config::GatewayConfig;
use lambda_dev_gateway::rpc::client::{read_frame, write_frame};
use lambda_dev_gateway::rpc::{InvokeReply, RpcRequest};
use lambda_dev_gateway::server::router;

/// Start a mock function host; the closure decides each reply.
pub async fn start_mock_host<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(RpcRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = InvokeReply> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    serve_mock_host(listener, f);
    addr
}

/// Serve the mock host on an already-bound listener.
pub fn serve_mock_host<F, Fut>(listener: TcpListener, f: F)
where
    F: Fn(RpcRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = InvokeReply> + Send + 'static,
{
    let f = Arc::new(f);
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let f = f.clone();
            tokio::spawn(async move {
                let frame = read_frame(&mut socket).await.unwrap();
                let request: RpcRequest = serde_json::from_slice(&frame).unwrap();
                let reply = f(request).await;
                let bytes = serde_json::to_vec(&reply).unwrap();
                let _ = write_frame(&mut socket, &bytes).await;
            });
        }
    });
}

/// Start the gateway against the given host address and format version.
pub async fn start_gateway(lambda_host: SocketAddr, format: &str) -> SocketAddr {
    let config = GatewayConfig::from_values(
        Some(lambda_host.to_string()),
        Some("8002".into()),
        Some(format.into()),
        None,
    )
    .unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(Arc::new(config)).into_make_service_with_connect_info::<SocketAddr>();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}
