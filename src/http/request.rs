//! HTTP/1.1 request parsing.
//!
//! The connection layer splits the inbound bytes at the blank line; this
//! module turns the head half into a [`Request`] and attaches the body half
//! verbatim.

use bytes::Bytes;
use memchr::memmem;
use thiserror::Error;

use super::url::{Url, UrlError};
use super::{Headers, Method, Protocol};

const CRLF: &[u8] = b"\r\n";

/// Errors that can occur while parsing an HTTP/1.1 request head.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// The head has no CRLF, or the request line is not exactly three tokens.
    #[error("Invalid Request")]
    InvalidRequest,

    #[error("unsupported HTTP method: {0:?}")]
    UnsupportedMethod(String),

    #[error("unsupported protocol: {0:?}")]
    UnsupportedProtocol(String),

    /// The URL synthesized from `Host` and the request target did not parse.
    #[error(transparent)]
    Url(#[from] UrlError),
}

/// A fully parsed HTTP/1.1 request.
///
/// Created by [`Request::parse`] from a head buffer (request line plus header
/// block, without the terminating blank line) and the bytes that followed it.
///
/// # Examples
///
/// ```
/// use nethttp::http::{Method, Request};
///
/// let head = b"GET /hello?name=world HTTP/1.1\r\nHost: localhost";
/// let request = Request::parse(head, None).unwrap();
///
/// assert_eq!(request.method(), Method::Get);
/// assert_eq!(request.url().pathname(), "/hello");
/// assert_eq!(request.url().search(), "?name=world");
/// assert_eq!(request.headers().get("host"), Some("localhost"));
/// assert!(request.data().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    protocol: Protocol,
    headers: Headers,
    url: Url,
    data: Option<Bytes>,
}

impl Request {
    /// Parses a request head and attaches `data` as the body.
    ///
    /// The request line is split on single spaces into method, target and
    /// protocol. The target is split at its first `?`, and the request URL is
    /// rebuilt as `http://<Host header><path><?query>`, where a bare `/` path
    /// is left out and restored by the URL parser's default. `data` is not
    /// checked against `Content-Length`.
    ///
    /// # Errors
    ///
    /// - [`RequestError::InvalidRequest`]: no CRLF in `head`, or a malformed request line.
    /// - [`RequestError::UnsupportedMethod`]: a method other than GET, POST, PUT, DELETE.
    /// - [`RequestError::UnsupportedProtocol`]: a protocol other than `HTTP/1.1`.
    /// - [`RequestError::Url`]: the rebuilt URL is invalid, e.g. no `Host` header.
    pub fn parse(head: &[u8], data: Option<Bytes>) -> Result<Self, RequestError> {
        let line_end = memmem::find(head, CRLF).ok_or(RequestError::InvalidRequest)?;
        let request_line = String::from_utf8_lossy(&head[..line_end]);
        let headers = Headers::parse(&head[line_end + CRLF.len()..]);

        let mut tokens = request_line.split(' ');
        let (Some(method), Some(target), Some(protocol), None) =
            (tokens.next(), tokens.next(), tokens.next(), tokens.next())
        else {
            return Err(RequestError::InvalidRequest);
        };

        let method: Method = method.parse()?;
        let protocol: Protocol = protocol.parse()?;

        let (pathname, query) = match target.split_once('?') {
            Some((pathname, query)) => (pathname, Some(query)),
            None => (target, None),
        };
        let hostname = headers.get("host").unwrap_or_default();

        let mut raw_url = format!("{}://{hostname}", protocol.scheme());
        if pathname != "/" {
            raw_url.push_str(pathname);
        }
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            raw_url.push('?');
            raw_url.push_str(query);
        }
        let url = Url::parse(&raw_url)?;

        Ok(Self {
            method,
            protocol,
            headers,
            url,
            data,
        })
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// Returns the protocol token from the request line.
    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Returns the request headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the URL rebuilt from the `Host` header and request target.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the body bytes, if any arrived.
    pub fn data(&self) -> Option<&Bytes> {
        self.data.as_ref()
    }

    /// Returns the declared `Content-Length`; see [`Headers::content_length`].
    pub fn content_length(&self) -> Option<usize> {
        self.headers.content_length()
    }

    /// Deserializes the body as JSON. An absent body decodes as empty input.
    pub fn json<T>(&self) -> Result<T, serde_json::Error>
    where
        T: serde::de::DeserializeOwned,
    {
        serde_json::from_slice(self.data.as_deref().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn parse_simple_get() {
        let req = Request::parse(b"GET / HTTP/1.1\r\nHost: localhost", None).unwrap();
        assert_eq!(req.method(), Method::Get);
        assert_eq!(req.protocol(), Protocol::Http11);
        assert_eq!(req.url().hostname(), "localhost");
        assert_eq!(req.url().pathname(), "/");
        assert_eq!(req.url().search(), "");
        assert_eq!(req.headers().get("host"), Some("localhost"));
    }

    #[test]
    fn parse_query_string() {
        let head = b"GET /search?q=rust&page=2 HTTP/1.1\r\nHost: example.com";
        let req = Request::parse(head, None).unwrap();
        assert_eq!(req.url().pathname(), "/search");
        assert_eq!(req.url().search(), "?q=rust&page=2");
    }

    #[test]
    fn query_splits_on_first_question_mark() {
        let head = b"GET /a?b?c HTTP/1.1\r\nHost: h";
        let req = Request::parse(head, None).unwrap();
        assert_eq!(req.url().pathname(), "/a");
        assert_eq!(req.url().search(), "?b?c");
    }

    #[test]
    fn empty_query_is_dropped() {
        let req = Request::parse(b"GET /a? HTTP/1.1\r\nHost: h", None).unwrap();
        assert_eq!(req.url().search(), "");
    }

    #[test]
    fn root_path_normalization() {
        let root = Request::parse(b"GET / HTTP/1.1\r\nHost: h", None).unwrap();
        let with_query = Request::parse(b"GET /?x=1 HTTP/1.1\r\nHost: h", None).unwrap();
        assert_eq!(root.url().pathname(), "/");
        assert_eq!(with_query.url().pathname(), "/");
        assert_eq!(with_query.url().search(), "?x=1");
    }

    #[test]
    fn host_header_lookup_is_case_insensitive() {
        let req = Request::parse(b"GET /x HTTP/1.1\r\nHOST: example.org:8080", None).unwrap();
        assert_eq!(req.url().hostname(), "example.org:8080");
    }

    #[test]
    fn head_without_crlf_is_invalid() {
        let err = Request::parse(b"GET / HTTP/1.1", None).unwrap_err();
        assert_eq!(err, RequestError::InvalidRequest);
        assert_eq!(err.to_string(), "Invalid Request");
    }

    #[test]
    fn malformed_request_line_is_invalid() {
        for head in [
            &b"GET /\r\nHost: h"[..],
            b"GET  / HTTP/1.1\r\nHost: h",
            b"GET / HTTP/1.1 extra\r\nHost: h",
            b"\r\nHost: h",
        ] {
            assert!(Request::parse(head, None).is_err(), "{head:?}");
        }
        assert_eq!(
            Request::parse(b"GET / HTTP/1.1 extra\r\nHost: h", None).unwrap_err(),
            RequestError::InvalidRequest
        );
    }

    #[test]
    fn unsupported_method_fails() {
        let err = Request::parse(b"PATCH /r HTTP/1.1\r\nHost: h", None).unwrap_err();
        assert_eq!(err, RequestError::UnsupportedMethod("PATCH".into()));
    }

    #[test]
    fn unsupported_protocol_fails() {
        let err = Request::parse(b"GET / HTTP/1.0\r\nHost: h", None).unwrap_err();
        assert_eq!(err, RequestError::UnsupportedProtocol("HTTP/1.0".into()));
    }

    #[test]
    fn missing_host_fails_url_construction() {
        let err = Request::parse(b"GET /x HTTP/1.1\r\n", None).unwrap_err();
        assert_eq!(err, RequestError::Url(UrlError::Invalid));
        assert_eq!(err.to_string(), "Invalid URL");
    }

    #[test]
    fn data_is_attached_verbatim() {
        let head = b"POST /submit HTTP/1.1\r\nHost: h\r\nContent-Length: 99";
        let req = Request::parse(head, Some(Bytes::from_static(b"hello"))).unwrap();
        assert_eq!(req.data().map(|d| &d[..]), Some(&b"hello"[..]));
        assert_eq!(req.content_length(), Some(99));
    }

    #[test]
    fn json_body() {
        #[derive(Deserialize)]
        struct Payload {
            name: String,
        }

        let head = b"POST /users HTTP/1.1\r\nHost: h\r\nContent-Type: application/json";
        let req = Request::parse(head, Some(Bytes::from_static(br#"{"name":"ada"}"#))).unwrap();
        let payload: Payload = req.json().unwrap();
        assert_eq!(payload.name, "ada");

        let empty = Request::parse(b"POST /users HTTP/1.1\r\nHost: h", None).unwrap();
        assert!(empty.json::<Payload>().is_err());
    }
}
