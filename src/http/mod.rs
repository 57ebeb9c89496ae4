//! HTTP/1.1 protocol types and parsing.
//!
//! This module provides the core HTTP primitives:
//! [`Method`], [`Protocol`], [`StatusCode`], [`Headers`], [`Url`], [`Request`], and [`Response`].

use std::fmt;

pub mod headers;
pub mod request;
pub mod response;
pub mod url;

pub use headers::Headers;
pub use request::{Request, RequestError};
pub use response::Response;
pub use url::{Scheme, Url, UrlError};

/// An HTTP response status code.
///
/// Covers the codes the server produces itself plus the common success code
/// handlers reach for. Handlers that need anything else can pass a raw `u16`
/// and reason phrase to [`Response::new`].
///
/// # Examples
///
/// ```
/// use nethttp::http::StatusCode;
///
/// let status = StatusCode::Ok;
/// assert_eq!(status.as_u16(), 200);
/// assert_eq!(status.canonical_reason(), "OK");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum StatusCode {
    // 2xx Success
    Ok = 200,
    Created = 201,

    // 4xx Client Error
    BadRequest = 400,
    NotFound = 404,
    PayloadTooLarge = 413,
    RequestHeaderFieldsTooLarge = 431,

    // 5xx Server Error
    InternalServerError = 500,
}

impl StatusCode {
    /// Returns the numeric status code as a `u16`.
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns the canonical reason phrase for this status code.
    pub fn canonical_reason(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Created => "Created",
            Self::BadRequest => "Bad Request",
            Self::NotFound => "Not Found",
            Self::PayloadTooLarge => "Payload Too Large",
            Self::RequestHeaderFieldsTooLarge => "Request Header Fields Too Large",
            Self::InternalServerError => "Internal Server Error",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.canonical_reason())
    }
}

impl From<StatusCode> for u16 {
    fn from(code: StatusCode) -> u16 {
        code.as_u16()
    }
}

/// An HTTP request method.
///
/// Only the four methods the server routes on are recognized; anything else
/// fails request construction with [`RequestError::UnsupportedMethod`].
///
/// # Examples
///
/// ```
/// use nethttp::http::Method;
///
/// let method: Method = "GET".parse().unwrap();
/// assert_eq!(method, Method::Get);
/// assert_eq!(method.as_str(), "GET");
/// assert!("PATCH".parse::<Method>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET: retrieve a representation of the target resource.
    Get,
    /// POST: perform resource-specific processing on the request payload.
    Post,
    /// PUT: replace the target resource's current representation.
    Put,
    /// DELETE: remove the association between the target resource and its functionality.
    Delete,
}

impl Method {
    /// Returns the method as a string slice.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Method {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            other => Err(RequestError::UnsupportedMethod(other.to_owned())),
        }
    }
}

impl AsRef<str> for Method {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// The protocol token carried on request and status lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Protocol {
    /// `HTTP/1.1`
    #[default]
    Http11,
}

impl Protocol {
    /// Returns the wire token, e.g. `"HTTP/1.1"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http11 => "HTTP/1.1",
        }
    }

    /// The URL scheme used when synthesizing a request URL for this protocol.
    pub fn scheme(&self) -> Scheme {
        match self {
            Self::Http11 => Scheme::Http,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Protocol {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HTTP/1.1" => Ok(Self::Http11),
            other => Err(RequestError::UnsupportedProtocol(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_methods() {
        for (raw, method) in [
            ("GET", Method::Get),
            ("POST", Method::Post),
            ("PUT", Method::Put),
            ("DELETE", Method::Delete),
        ] {
            assert_eq!(raw.parse::<Method>().unwrap(), method);
            assert_eq!(method.to_string(), raw);
        }
    }

    #[test]
    fn rejects_other_methods() {
        assert!(matches!(
            "PATCH".parse::<Method>(),
            Err(RequestError::UnsupportedMethod(m)) if m == "PATCH"
        ));
        // Methods are case-sensitive.
        assert!("get".parse::<Method>().is_err());
    }

    #[test]
    fn protocol_token() {
        assert_eq!("HTTP/1.1".parse::<Protocol>().unwrap(), Protocol::Http11);
        assert!(matches!(
            "HTTP/1.0".parse::<Protocol>(),
            Err(RequestError::UnsupportedProtocol(p)) if p == "HTTP/1.0"
        ));
        assert_eq!(Protocol::Http11.scheme(), Scheme::Http);
    }

    #[test]
    fn status_display() {
        assert_eq!(StatusCode::NotFound.to_string(), "404 Not Found");
        assert_eq!(u16::from(StatusCode::InternalServerError), 500);
    }
}
