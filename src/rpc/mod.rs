//! Invocation RPC toward the function-execution host.
//!
//! # Data Flow
//! ```text
//! serialized event payload
//!     → envelope.rs (wrap with request id, trace placeholder, deadline)
//!     → client.rs (fresh TCP connection, one framed call, one framed reply)
//!     → InvokeReply (host error surfaced, or payload handed back)
//! ```
//!
//! # Design Decisions
//! - One connection per invocation; no pooling, no retries
//! - Frames are a 4-byte big-endian length prefix plus a JSON body
//! - The deadline is a liveness bound (now + 60 minutes), not a timeout
//!   the gateway enforces itself

pub mod client;
pub mod envelope;

pub use client::{invoke, InvokeError};
pub use envelope::{Deadline, InvokeEnvelope, InvokeReply, RpcRequest, INVOKE_METHOD};
