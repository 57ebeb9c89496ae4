//! Minimal absolute URL: scheme, host, path and raw query.
//!
//! Accepts `http://<host>[/<path>][?<query>]`. The host runs up to the first
//! `/`, `?`, `#` or whitespace and must be non-empty; the path runs up to the
//! first `?` or `#`; the query runs up to the first `#`. Anything after that
//! point is ignored.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors produced while parsing a [`Url`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    #[error("Invalid URL")]
    Invalid,
}

/// The URL schemes the parser recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scheme {
    #[default]
    Http,
}

impl Scheme {
    /// Returns the scheme name without the `://` separator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable parsed URL.
///
/// `pathname` is the routing key and is compared byte-for-byte: no
/// trailing-slash, case or percent-encoding normalization happens anywhere.
///
/// # Examples
///
/// ```
/// use nethttp::http::Url;
///
/// let url = Url::parse("http://localhost:3000/users?page=2").unwrap();
/// assert_eq!(url.hostname(), "localhost:3000");
/// assert_eq!(url.pathname(), "/users");
/// assert_eq!(url.search(), "?page=2");
///
/// let bare = Url::parse("http://localhost").unwrap();
/// assert_eq!(bare.pathname(), "/");
/// assert_eq!(bare.search(), "");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Url {
    protocol: Scheme,
    hostname: String,
    pathname: String,
    search: String,
}

impl Url {
    /// Builds a URL from already-separated parts without validating them.
    pub fn new(
        hostname: impl Into<String>,
        pathname: impl Into<String>,
        search: impl Into<String>,
    ) -> Self {
        Self {
            protocol: Scheme::Http,
            hostname: hostname.into(),
            pathname: pathname.into(),
            search: search.into(),
        }
    }

    /// Parses `input` against the `http://host[/path][?query]` grammar.
    ///
    /// # Errors
    ///
    /// [`UrlError::Invalid`] if the input does not start with `http://`
    /// followed by a non-empty host.
    pub fn parse(input: &str) -> Result<Self, UrlError> {
        let rest = input
            .strip_prefix(Scheme::Http.as_str())
            .and_then(|r| r.strip_prefix("://"))
            .ok_or(UrlError::Invalid)?;

        let host_end = rest
            .find(|c: char| matches!(c, '/' | '?' | '#') || c.is_whitespace())
            .unwrap_or(rest.len());
        if host_end == 0 {
            return Err(UrlError::Invalid);
        }
        let (hostname, rest) = rest.split_at(host_end);

        let (pathname, rest) = if rest.starts_with('/') {
            let end = rest.find(['?', '#']).unwrap_or(rest.len());
            rest.split_at(end)
        } else {
            ("/", rest)
        };

        let search = if rest.starts_with('?') {
            let end = rest.find('#').unwrap_or(rest.len());
            &rest[..end]
        } else {
            ""
        };

        Ok(Self {
            protocol: Scheme::Http,
            hostname: hostname.to_owned(),
            pathname: pathname.to_owned(),
            search: search.to_owned(),
        })
    }

    /// Returns the URL scheme.
    pub fn protocol(&self) -> Scheme {
        self.protocol
    }

    /// Returns the host, including the port when the source had one.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// The path component; `/` when the source had none.
    pub fn pathname(&self) -> &str {
        &self.pathname
    }

    /// The raw query including its leading `?`, or the empty string.
    pub fn search(&self) -> &str {
        &self.search
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}://{}{}{}",
            self.protocol, self.hostname, self.pathname, self.search
        )
    }
}

impl FromStr for Url {
    type Err = UrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full() {
        let url = Url::parse("http://example.com/a/b?x=1&y=2").unwrap();
        assert_eq!(url.protocol(), Scheme::Http);
        assert_eq!(url.hostname(), "example.com");
        assert_eq!(url.pathname(), "/a/b");
        assert_eq!(url.search(), "?x=1&y=2");
    }

    #[test]
    fn path_defaults_to_root() {
        let url = Url::parse("http://example.com?q=rust").unwrap();
        assert_eq!(url.pathname(), "/");
        assert_eq!(url.search(), "?q=rust");
    }

    #[test]
    fn fragment_is_ignored() {
        let url = Url::parse("http://example.com/docs#intro").unwrap();
        assert_eq!(url.pathname(), "/docs");
        assert_eq!(url.search(), "");
    }

    #[test]
    fn pathname_is_not_normalized() {
        let url = Url::parse("http://h/Users/").unwrap();
        assert_eq!(url.pathname(), "/Users/");
    }

    #[test]
    fn rejects_other_schemes() {
        assert_eq!(Url::parse("https://example.com/"), Err(UrlError::Invalid));
        assert_eq!(Url::parse("ftp://example.com/"), Err(UrlError::Invalid));
    }

    #[test]
    fn rejects_missing_host() {
        assert_eq!(Url::parse("http://"), Err(UrlError::Invalid));
        assert_eq!(Url::parse("http:///path"), Err(UrlError::Invalid));
        assert_eq!(Url::parse("http://?q"), Err(UrlError::Invalid));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(Url::parse("not a url"), Err(UrlError::Invalid));
        assert_eq!("".parse::<Url>(), Err(UrlError::Invalid));
    }

    #[test]
    fn display_round_trips() {
        for (host, path, search) in [
            ("127.0.0.1", "/", ""),
            ("localhost:8080", "/users/42", ""),
            ("example.com", "/search", "?q=a%20b&page=2"),
            ("example.com", "/", "?only=query"),
        ] {
            let url = Url::new(host, path, search);
            let reparsed = Url::parse(&url.to_string()).unwrap();
            assert_eq!(reparsed, url);
        }
    }
}
