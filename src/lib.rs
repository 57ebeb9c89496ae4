//! # nethttp
//!
//! A minimal HTTP/1.1 server written directly on top of Tokio TCP sockets.
//!
//! Each connection carries exactly one request: the head is parsed, matched
//! against an exact `(method, pathname)` route table, handed to an async
//! handler, and the handler's response is written before the connection is
//! closed.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nethttp::{Method, Response, Server, ServerAddress, StatusCode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut server = Server::new(ServerAddress::new("127.0.0.1", 3000));
//!     server.add_route("/", Method::Get, |req| async move {
//!         Ok(Response::with_status(&req, StatusCode::Ok)
//!             .json(&serde_json::json!({ "message": "Hello, World!" }))?)
//!     });
//!     server.listen().await?;
//!     Ok(())
//! }
//! ```

pub mod http;
pub mod limits;
pub mod router;
pub mod server;

// ── Convenience re-exports ────────────────────────────────────────────────────
pub use http::{Headers, Method, Protocol, Request, RequestError, Response, StatusCode, Url};
pub use limits::Limits;
pub use router::{DispatchError, HandlerError, Route, Router};
pub use server::{ConnectionError, Listener, Server, ServerAddress, ServerError};
