//! HTTP/1.1 response builder.
//!
//! Provides a fluent builder API for constructing HTTP responses and
//! serializing them to a byte buffer for transmission over TCP.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;

use super::{Headers, Protocol, Request, StatusCode};

/// An HTTP/1.1 response, ready to be serialized and sent.
///
/// The response answers a specific [`Request`] and borrows its protocol token
/// for the status line. Serialization is a plain wire writer: it never adds
/// `Content-Length`, `Content-Type` or `Connection` on its own, so handlers set
/// whatever framing headers they need.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use nethttp::http::{Request, Response};
///
/// let request = Request::parse(b"GET / HTTP/1.1\r\nHost: localhost", None).unwrap();
/// let response = Response::new(&request, 200, "OK")
///     .header("Content-Type", "text/plain")
///     .header("Content-Length", "2")
///     .body(Bytes::from_static(b"hi"));
///
/// assert_eq!(
///     &response.to_bytes()[..],
///     b"HTTP/1.1 200 OK\r\ncontent-type: text/plain\r\ncontent-length: 2\r\n\r\nhi"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Response {
    protocol: Protocol,
    status: u16,
    status_text: String,
    headers: Headers,
    data: Option<Bytes>,
}

impl Response {
    /// Creates a response to `request` with the given status code and reason phrase.
    pub fn new(request: &Request, status: u16, status_text: impl Into<String>) -> Self {
        Self::for_protocol(request.protocol(), status, status_text)
    }

    /// Creates a response to `request` using `status` and its canonical reason phrase.
    pub fn with_status(request: &Request, status: StatusCode) -> Self {
        Self::new(request, status.as_u16(), status.canonical_reason())
    }

    /// The canned reply for a request no route matched: `404 NOT FOUND`,
    /// no headers and no body.
    pub fn not_found(request: &Request) -> Self {
        Self::new(request, StatusCode::NotFound.as_u16(), "NOT FOUND")
    }

    /// Builds a response when no parsed request exists to borrow a protocol from.
    pub(crate) fn for_protocol(
        protocol: Protocol,
        status: u16,
        status_text: impl Into<String>,
    ) -> Self {
        Self {
            protocol,
            status,
            status_text: status_text.into(),
            headers: Headers::new(),
            data: None,
        }
    }

    /// Sets a response header, replacing any previous value for the same name.
    #[must_use]
    pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Replaces the header map wholesale.
    #[must_use]
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    /// Sets the response body from raw bytes.
    #[must_use]
    pub fn body(mut self, data: impl Into<Bytes>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Serializes `value` as the body and sets `content-type: application/json`
    /// and a matching `content-length`.
    pub fn json<T>(self, value: &T) -> Result<Self, serde_json::Error>
    where
        T: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(value)?;
        Ok(self
            .header("content-type", "application/json")
            .header("content-length", body.len().to_string())
            .body(body))
    }

    /// Returns the numeric status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns the reason phrase.
    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    /// Returns the protocol token written on the status line.
    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Returns the response headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the body bytes, if any.
    pub fn data(&self) -> Option<&Bytes> {
        self.data.as_ref()
    }

    /// Serializes the response into HTTP/1.1 wire format.
    ///
    /// Layout: `<protocol> <status> <reason>\r\n`, then each header line
    /// followed by `\r\n`, then `\r\n`, then the body bytes verbatim. Calling
    /// this repeatedly yields identical output.
    pub fn to_bytes(&self) -> Bytes {
        let head = self.head();
        let body = self.data.as_deref().unwrap_or_default();

        let mut buf = BytesMut::with_capacity(head.len() + body.len());
        buf.put(head.as_bytes());
        buf.put(body);
        buf.freeze()
    }

    fn head(&self) -> String {
        let mut head = format!("{} {} {}\r\n", self.protocol, self.status, self.status_text);
        if !self.headers.is_empty() {
            head.push_str(&self.headers.to_string());
            head.push_str("\r\n");
        }
        head.push_str("\r\n");
        head
    }
}

/// Renders the wire form with the body decoded as UTF-8 (lossily).
impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.head())?;
        if let Some(data) = &self.data {
            f.write_str(&String::from_utf8_lossy(data))?;
        }
        Ok(())
    }
}
