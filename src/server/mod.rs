//! Async TCP server using Tokio.
//!
//! Accepts TCP connections and answers exactly one HTTP/1.1 request on each,
//! then closes it. Routes are registered on a [`Server`] before it starts
//! listening; the route table is read-only from then on.

use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::http::{Method, Request, Response, Url};
use crate::limits::Limits;
use crate::router::{HandlerError, Route, Router};

pub mod connection;

pub use connection::ConnectionError;

/// Errors produced by the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

/// The host and port a [`Server`] binds to.
///
/// `hostname` is also used as the host of every registered route's URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerAddress {
    pub hostname: String,
    pub port: u16,
}

impl ServerAddress {
    pub fn new(hostname: impl Into<String>, port: u16) -> Self {
        Self {
            hostname: hostname.into(),
            port,
        }
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.hostname, self.port)
    }
}

/// An HTTP server that has not started listening yet.
///
/// Register routes with [`add_route`](Self::add_route) (or the per-method
/// shortcuts), then call [`listen`](Self::listen), or [`bind`](Self::bind)
/// when you need the bound address or a shutdown signal.
///
/// # Examples
///
/// ```rust,no_run
/// use nethttp::{Method, Response, Server, ServerAddress, StatusCode};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut server = Server::new(ServerAddress::new("127.0.0.1", 3000));
///     server.add_route("/", Method::Get, |req| async move {
///         Ok(Response::with_status(&req, StatusCode::Ok).body("Hello!"))
///     });
///     server.listen().await?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Server {
    address: ServerAddress,
    limits: Limits,
    router: Router,
}

impl Server {
    /// Creates a server for `address` with default [`Limits`].
    pub fn new(address: ServerAddress) -> Self {
        Self::with_limits(address, Limits::default())
    }

    /// Creates a server for `address` with custom [`Limits`].
    pub fn with_limits(address: ServerAddress, limits: Limits) -> Self {
        Self {
            address,
            limits,
            router: Router::new(),
        }
    }

    pub fn address(&self) -> &ServerAddress {
        &self.address
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Registers `handler` for requests whose method is `method` and whose
    /// URL pathname equals `pathname` exactly.
    ///
    /// Routes are tried in registration order and the first match wins, so
    /// registering the same pair twice leaves the second handler unreachable.
    pub fn add_route<H, F>(&mut self, pathname: &str, method: Method, handler: H) -> &mut Self
    where
        H: Fn(Request) -> F + Send + Sync + 'static,
        F: Future<Output = Result<Response, HandlerError>> + Send + 'static,
    {
        let url = Url::new(self.address.hostname.as_str(), pathname, "");
        self.router.push(Route::new(method, url, handler));
        self
    }

    /// Registers a `GET` handler for `pathname`.
    pub fn get<H, F>(&mut self, pathname: &str, handler: H) -> &mut Self
    where
        H: Fn(Request) -> F + Send + Sync + 'static,
        F: Future<Output = Result<Response, HandlerError>> + Send + 'static,
    {
        self.add_route(pathname, Method::Get, handler)
    }

    /// Registers a `POST` handler for `pathname`.
    pub fn post<H, F>(&mut self, pathname: &str, handler: H) -> &mut Self
    where
        H: Fn(Request) -> F + Send + Sync + 'static,
        F: Future<Output = Result<Response, HandlerError>> + Send + 'static,
    {
        self.add_route(pathname, Method::Post, handler)
    }

    /// Registers a `PUT` handler for `pathname`.
    pub fn put<H, F>(&mut self, pathname: &str, handler: H) -> &mut Self
    where
        H: Fn(Request) -> F + Send + Sync + 'static,
        F: Future<Output = Result<Response, HandlerError>> + Send + 'static,
    {
        self.add_route(pathname, Method::Put, handler)
    }

    /// Registers a `DELETE` handler for `pathname`.
    pub fn delete<H, F>(&mut self, pathname: &str, handler: H) -> &mut Self
    where
        H: Fn(Request) -> F + Send + Sync + 'static,
        F: Future<Output = Result<Response, HandlerError>> + Send + 'static,
    {
        self.add_route(pathname, Method::Delete, handler)
    }

    /// Binds the listening socket and freezes the route table.
    ///
    /// Logs the bound address once the socket is listening.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the address cannot be bound
    /// (e.g. port already in use, insufficient permissions).
    pub async fn bind(self) -> Result<Listener, ServerError> {
        let addr = self.address.to_string();
        let listener = TcpListener::bind((self.address.hostname.as_str(), self.address.port))
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        let local_addr = listener.local_addr()?;

        info!(
            address = %format!("http://{local_addr}"),
            routes = self.router.len(),
            "nethttp listening"
        );

        let permits = self.limits.max_connections.clamp(1, Semaphore::MAX_PERMITS);
        if permits != self.limits.max_connections {
            warn!(
                requested = self.limits.max_connections,
                permits, "max_connections out of range, clamped"
            );
        }

        Ok(Listener {
            listener,
            local_addr,
            connections: Arc::new(Semaphore::new(permits)),
            shared: Arc::new(Shared {
                router: self.router,
                limits: self.limits,
            }),
        })
    }

    /// Binds and serves until the process is terminated or the listener fails.
    ///
    /// # Errors
    ///
    /// See [`bind`](Self::bind).
    pub async fn listen(self) -> Result<(), ServerError> {
        self.bind().await?.run().await
    }
}

// State every connection task reads but never mutates.
#[derive(Debug)]
struct Shared {
    router: Router,
    limits: Limits,
}

/// A bound server, ready to accept connections.
#[derive(Debug)]
pub struct Listener {
    listener: TcpListener,
    local_addr: SocketAddr,
    connections: Arc<Semaphore>,
    shared: Arc<Shared>,
}

impl Listener {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accepts connections forever.
    ///
    /// # Errors
    ///
    /// See [`run_until`](Self::run_until).
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_until(std::future::pending::<()>()).await
    }

    /// Accepts connections until `shutdown` completes.
    ///
    /// Each connection is served on its own task. Connections already being
    /// served when `shutdown` fires are left to finish on their own. Accept
    /// failures are logged and the loop carries on.
    ///
    /// # Errors
    ///
    /// Currently infallible once bound; the `Result` leaves room for listener
    /// failures that cannot be recovered from.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            let permit = tokio::select! {
                _ = &mut shutdown => break,
                permit = Arc::clone(&self.connections).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let (stream, peer_addr) = tokio::select! {
                _ = &mut shutdown => break,
                accepted = self.listener.accept() => match accepted {
                    Ok(pair) => pair,
                    Err(e) => {
                        error!(error = %e, "failed to accept connection");
                        continue;
                    }
                },
            };

            debug!(peer = %peer_addr, "connection accepted");
            let shared = Arc::clone(&self.shared);

            tokio::spawn(async move {
                let _permit = permit;
                match connection::serve(stream, &shared.router, &shared.limits).await {
                    Ok(()) => debug!(peer = %peer_addr, "connection closed"),
                    Err(ConnectionError::Incomplete) => {
                        debug!(peer = %peer_addr, "peer closed before sending a complete request")
                    }
                    Err(e @ ConnectionError::Dispatch(_)) => {
                        error!(peer = %peer_addr, error = %e, "handler failed")
                    }
                    Err(e) => warn!(peer = %peer_addr, error = %e, "connection closed with error"),
                }
            });
        }

        info!(address = %self.local_addr, "nethttp stopped accepting connections");
        Ok(())
    }
}
