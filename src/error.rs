//! Per-request error taxonomy.
//!
//! Every failure on a request path is handled locally: it maps to one HTTP
//! status plus a fixed plain-text message, and the request is abandoned.
//! Nothing here is retried and nothing crashes the process.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::rpc::InvokeError;

/// Failure modes of a single proxied request.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The inbound request body could not be read.
    #[error("Error reading body")]
    ReadBody(#[source] axum::Error),

    /// The proxy-integration event could not be serialized.
    #[error("Error marshalling json")]
    Serialize(#[source] serde_json::Error),

    /// The RPC call failed, the host reported an error, or the reply
    /// payload did not decode. The host being unreachable and the host
    /// returning an application error are deliberately indistinguishable
    /// at the HTTP surface.
    #[error("Error invoking lambda")]
    Invoke(#[source] InvokeError),

    /// A binary-flagged response body was not valid base64.
    #[error("Error base64-decoding response body")]
    DecodeResponseBody(#[source] base64::DecodeError),
}

impl GatewayError {
    fn status(&self) -> StatusCode {
        match self {
            GatewayError::ReadBody(_) => StatusCode::BAD_REQUEST,
            GatewayError::Serialize(_)
            | GatewayError::Invoke(_)
            | GatewayError::DecodeResponseBody(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        tracing::error!(
            error = %self,
            source = ?std::error::Error::source(&self),
            "Request failed"
        );
        (self.status(), self.to_string()).into_response()
    }
}
