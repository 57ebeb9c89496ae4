//! HTTP header map with case-insensitive name lookup.
//!
//! Names are normalized to lower-case on every store and lookup, so the map
//! holds at most one value per name.

use std::fmt;

use bytes::Bytes;

/// A case-insensitive, single-value, insertion-ordered HTTP header map.
///
/// Setting a name that is already present replaces its value in place, so the
/// entry keeps the position of its first insertion.
///
/// # Examples
///
/// ```
/// use nethttp::http::Headers;
///
/// let mut headers = Headers::new();
/// headers.set("Content-Type", "text/html; charset=utf-8");
/// headers.set("X-Custom", "first");
/// headers.set("x-custom", "second");
///
/// assert_eq!(headers.get("content-type"), Some("text/html; charset=utf-8"));
/// assert_eq!(headers.get("X-CUSTOM"), Some("second"));
/// assert_eq!(headers.to_string(), "content-type: text/html; charset=utf-8\r\nx-custom: second");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    inner: Vec<(String, String)>,
}

impl Headers {
    /// Creates an empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under the normalized `name`, overwriting any previous value.
    pub fn set(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        let name = normalize(name.as_ref());
        let value = value.into();

        match self.inner.iter_mut().find(|(k, _)| *k == name) {
            Some((_, existing)) => *existing = value,
            None => self.inner.push((name, value)),
        }
    }

    /// Returns the value for the given header name (case-insensitive), or `None`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns the `Content-Length` value when it is a plain run of ASCII
    /// digits. Signs, whitespace and overflowing values yield `None`.
    pub fn content_length(&self) -> Option<usize> {
        let value = self.get("content-length")?;
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        value.parse().ok()
    }

    /// Returns `true` if the map contains an entry with the given name.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns an iterator over all `(normalized name, value)` pairs in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serializes the map into its wire form (see the [`Display`](fmt::Display) impl).
    pub fn to_bytes(&self) -> Bytes {
        Bytes::from(self.to_string())
    }

    /// Decodes a CRLF-separated block of `name: value` lines.
    ///
    /// A line is split at its first `": "`. Lines without that separator, or
    /// with an empty name or value on either side of it, are skipped. Invalid
    /// UTF-8 is replaced rather than rejected.
    pub fn parse(buf: &[u8]) -> Self {
        let text = String::from_utf8_lossy(buf);
        let mut headers = Self::new();

        for line in text.split("\r\n") {
            let Some((name, value)) = line.split_once(": ") else {
                continue;
            };
            if name.is_empty() || value.is_empty() {
                continue;
            }
            headers.set(name, value);
        }

        headers
    }
}

/// Renders `name: value` lines joined by CRLF, with no trailing terminator.
/// An empty map renders as the empty string.
impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.inner.iter().enumerate() {
            if i > 0 {
                f.write_str("\r\n")?;
            }
            write!(f, "{name}: {value}")?;
        }
        Ok(())
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.set(name, value);
        }
        headers
    }
}

fn normalize(name: &str) -> String {
    name.to_ascii_lowercase()
}
