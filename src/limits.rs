//! Connection limits and timeouts.
//!
//! Every accepted connection is bounded in time and size so that a peer that
//! never finishes its request head cannot hold a connection slot forever.
//!
//! # Examples
//!
//! ```no_run
//! use std::time::Duration;
//! use nethttp::{Limits, Server, ServerAddress};
//!
//! let server = Server::with_limits(
//!     ServerAddress::new("127.0.0.1", 8080),
//!     Limits {
//!         read_timeout: Duration::from_secs(2),
//!         max_head_size: 4 * 1024,
//!         ..Limits::default()
//!     },
//! );
//! ```

use std::time::Duration;

/// Bounds applied to each connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Deadline for receiving the complete request, head plus declared body,
    /// measured from accept (default: `10s`).
    ///
    /// A connection that misses it is closed without a response.
    pub read_timeout: Duration,

    /// Upper bound on writing the response (default: `10s`).
    pub write_timeout: Duration,

    /// Maximum size of the request head, i.e. the bytes before the blank
    /// line (default: `16 KiB`).
    ///
    /// Larger heads get a `431 Request Header Fields Too Large`.
    pub max_head_size: usize,

    /// Maximum `Content-Length` the server will wait for (default: `8 MiB`).
    ///
    /// Larger declarations get a `413 Payload Too Large`.
    pub max_body_size: usize,

    /// Maximum number of connections served at once (default: `1024`).
    ///
    /// Once reached, the accept loop waits for a connection to finish before
    /// accepting the next one.
    /// `0` is raised to `1`, and values above Tokio's semaphore maximum are
    /// lowered to it.
    pub max_connections: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_secs(10),
            write_timeout: Duration::from_secs(10),
            max_head_size: 16 * 1024,
            max_body_size: 8 * 1024 * 1024,
            max_connections: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let limits = Limits::default();
        assert_eq!(limits.read_timeout, Duration::from_secs(10));
        assert_eq!(limits.max_head_size, 16_384);
        assert_eq!(limits.max_body_size, 8_388_608);
        assert!(limits.max_connections > 0);
    }
}
