//! One request, one response, then close.
//!
//! Each accepted stream goes through the same steps: bytes are accumulated
//! until the blank line ending the head shows up, the head is parsed into a
//! [`Request`], the router produces a [`Response`], the response is written
//! and the stream is shut down. Any failure along the way is turned into a
//! best-effort error response in a single place before the stream is closed.

use std::io;
use std::time::Duration;

use bytes::{Buf, Bytes, BytesMut};
use memchr::memmem;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::{Instant, timeout, timeout_at};
use tracing::debug;

use crate::http::{Headers, Protocol, Request, RequestError, Response, StatusCode};
use crate::limits::Limits;
use crate::router::{DispatchError, Router};

const HEAD_DELIMITER: &[u8] = b"\r\n\r\n";

/// Initial read buffer capacity per connection.
const INITIAL_BUF_SIZE: usize = 4096;

/// Everything that can cut a connection's request/response cycle short.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("peer closed the connection before sending a complete request")]
    Incomplete,

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("request head exceeds {limit} bytes")]
    HeadTooLarge { limit: usize },

    #[error("declared body of {declared} bytes exceeds {limit} bytes")]
    BodyTooLarge { declared: usize, limit: usize },

    #[error("malformed request: {0}")]
    Request(#[from] RequestError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ConnectionError {
    /// The reply sent before closing, or `None` when the connection is
    /// closed silently.
    ///
    /// Error replies carry a JSON body of the form `{"error": "..."}`.
    /// Handler failures are reported without internal detail.
    pub fn response(&self) -> Option<Response> {
        let (status, message) = match self {
            Self::Request(err) => (StatusCode::BadRequest, err.to_string()),
            Self::HeadTooLarge { .. } => (StatusCode::RequestHeaderFieldsTooLarge, self.to_string()),
            Self::BodyTooLarge { .. } => (StatusCode::PayloadTooLarge, self.to_string()),
            Self::Dispatch(_) => (
                StatusCode::InternalServerError,
                StatusCode::InternalServerError.canonical_reason().to_owned(),
            ),
            Self::Incomplete | Self::Timeout(_) | Self::Io(_) => return None,
        };

        let body = serde_json::json!({ "error": message }).to_string();
        let response = Response::for_protocol(
            Protocol::default(),
            status.as_u16(),
            status.canonical_reason(),
        )
        .header("content-type", "application/json")
        .header("content-length", body.len().to_string())
        .header("connection", "close")
        .body(body);

        Some(response)
    }
}

/// A request split at its head delimiter.
#[derive(Debug)]
pub(crate) struct Frame {
    /// Request line and header block, without the blank line.
    pub(crate) head: Bytes,
    /// Whatever followed the blank line; `None` when nothing did.
    pub(crate) data: Option<Bytes>,
}

/// Serves exactly one request on `stream` and then shuts it down.
///
/// The stream is shut down whatever the outcome. The returned error, if any,
/// is the one that ended the exchange; an error response has already been
/// attempted for it.
pub(crate) async fn serve<S>(
    mut stream: S,
    router: &Router,
    limits: &Limits,
) -> Result<(), ConnectionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let result = match exchange(&mut stream, router, limits).await {
        Ok(response) => write_response(&mut stream, &response, limits.write_timeout).await,
        Err(err) => {
            if let Some(response) = err.response() {
                if let Err(write_err) =
                    write_response(&mut stream, &response, limits.write_timeout).await
                {
                    debug!(error = %write_err, "failed to deliver error response");
                }
            }
            Err(err)
        }
    };

    if let Err(e) = stream.shutdown().await {
        debug!(error = %e, "shutdown failed");
    }

    result
}

async fn exchange<S>(
    stream: &mut S,
    router: &Router,
    limits: &Limits,
) -> Result<Response, ConnectionError>
where
    S: AsyncRead + Unpin,
{
    let frame = read_frame(stream, limits).await?;
    let request = Request::parse(&frame.head, frame.data)?;

    debug!(
        method = %request.method(),
        path = %request.url().pathname(),
        "dispatching request"
    );

    Ok(router.dispatch(request).await?)
}

/// Accumulates reads until the head delimiter arrives, then waits for any
/// declared body.
///
/// Bytes without a delimiter are never handed to the parser: the connection
/// keeps reading until the delimiter shows up, the head outgrows
/// [`Limits::max_head_size`], [`Limits::read_timeout`] passes, or the peer
/// closes.
pub(crate) async fn read_frame<S>(stream: &mut S, limits: &Limits) -> Result<Frame, ConnectionError>
where
    S: AsyncRead + Unpin,
{
    let deadline = Instant::now() + limits.read_timeout;
    let mut buf = BytesMut::with_capacity(INITIAL_BUF_SIZE);
    let mut scanned = 0;

    let head_len = loop {
        if let Some(pos) = memmem::find(&buf[scanned..], HEAD_DELIMITER) {
            break scanned + pos;
        }
        if buf.len() > limits.max_head_size {
            return Err(ConnectionError::HeadTooLarge {
                limit: limits.max_head_size,
            });
        }
        // The delimiter may straddle two reads.
        scanned = buf.len().saturating_sub(HEAD_DELIMITER.len() - 1);
        fill(stream, &mut buf, deadline, limits.read_timeout).await?;
    };

    if head_len > limits.max_head_size {
        return Err(ConnectionError::HeadTooLarge {
            limit: limits.max_head_size,
        });
    }

    let head = buf.split_to(head_len).freeze();
    buf.advance(HEAD_DELIMITER.len());

    if let Some(declared) = declared_length(&head) {
        if declared > limits.max_body_size {
            return Err(ConnectionError::BodyTooLarge {
                declared,
                limit: limits.max_body_size,
            });
        }
        buf.reserve(declared.saturating_sub(buf.len()));
        while buf.len() < declared {
            fill(stream, &mut buf, deadline, limits.read_timeout).await?;
        }
    }

    let data = (!buf.is_empty()).then(|| buf.freeze());
    Ok(Frame { head, data })
}

async fn fill<S>(
    stream: &mut S,
    buf: &mut BytesMut,
    deadline: Instant,
    read_timeout: Duration,
) -> Result<(), ConnectionError>
where
    S: AsyncRead + Unpin,
{
    match timeout_at(deadline, stream.read_buf(buf)).await {
        Err(_) => Err(ConnectionError::Timeout(read_timeout)),
        Ok(Ok(0)) => Err(ConnectionError::Incomplete),
        Ok(Ok(_)) => Ok(()),
        Ok(Err(e)) => Err(e.into()),
    }
}

// A digits-only `Content-Length` in the head, if there is one. Anything else
// means "no declared body" and the body is whatever came with the head.
fn declared_length(head: &[u8]) -> Option<usize> {
    let line_end = memmem::find(head, b"\r\n")?;
    Headers::parse(&head[line_end + 2..]).content_length()
}

async fn write_response<S>(
    stream: &mut S,
    response: &Response,
    write_timeout: Duration,
) -> Result<(), ConnectionError>
where
    S: AsyncWrite + Unpin,
{
    let bytes = response.to_bytes();
    let write = async {
        stream.write_all(&bytes).await?;
        stream.flush().await
    };

    match timeout(write_timeout, write).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(ConnectionError::Timeout(write_timeout)),
    }
}
