//! Framed RPC client.
//!
//! Each invocation dials the function host, writes one request frame,
//! reads one reply frame, and drops the connection. Concurrent requests
//! each carry their own connection; there is no shared transport state.

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use super::envelope::{InvokeEnvelope, InvokeReply, RpcRequest};

/// Upper bound on a single frame body.
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// Failure modes of one invocation.
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("failed to connect to function host: {0}")]
    Connect(#[source] std::io::Error),

    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),

    #[error("frame of {0} bytes exceeds the frame size limit")]
    FrameTooLarge(usize),

    #[error("malformed reply payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("function host returned an error: {0}")]
    Host(String),

    #[error("reply carried neither a payload nor an error")]
    EmptyReply,
}

/// Perform one synchronous "Function.Invoke" call.
///
/// Returns the reply payload text; interpreting it is the caller's job
/// (it depends on the configured payload format).
pub async fn invoke(lambda_host: &str, payload: String) -> Result<String, InvokeError> {
    let mut stream = TcpStream::connect(lambda_host)
        .await
        .map_err(InvokeError::Connect)?;

    let request = RpcRequest::invoke(InvokeEnvelope::new(payload));
    let frame = serde_json::to_vec(&request)?;
    write_frame(&mut stream, &frame).await?;

    let reply_frame = read_frame(&mut stream).await?;
    let reply: InvokeReply = serde_json::from_slice(&reply_frame)?;

    if let Some(record) = reply.error {
        return Err(InvokeError::Host(record.message));
    }
    reply.payload.ok_or(InvokeError::EmptyReply)
}

/// Write one length-prefixed frame.
pub async fn write_frame<W>(writer: &mut W, body: &[u8]) -> Result<(), InvokeError>
where
    W: AsyncWrite + Unpin,
{
    if body.len() > MAX_FRAME_LEN {
        return Err(InvokeError::FrameTooLarge(body.len()));
    }
    writer.write_u32(body.len() as u32).await?;
    writer.write_all(body).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one length-prefixed frame.
pub async fn read_frame<R>(reader: &mut R) -> Result<Vec<u8>, InvokeError>
where
    R: AsyncRead + Unpin,
{
    let len = reader.read_u32().await? as usize;
    if len > MAX_FRAME_LEN {
        return Err(InvokeError::FrameTooLarge(len));
    }
    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;
    Ok(body)
}
