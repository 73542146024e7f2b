//! Local development gateway for function-style handlers.
//!
//! Accepts ordinary HTTP requests, translates each into a versioned
//! proxy-integration event ("1.0" or "2.0"), invokes a locally running
//! function host over a framed TCP RPC, and translates the JSON reply
//! back into an HTTP response.

pub mod config;
pub mod error;
pub mod event;
pub mod rpc;
pub mod server;

pub use config::{GatewayConfig, PayloadFormat};
pub use error::GatewayError;
pub use server::{router, serve};
