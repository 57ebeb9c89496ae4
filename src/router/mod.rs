//! Request routing: map `(method, pathname)` pairs to handler functions.
//!
//! Matching is exact: the request URL's pathname must equal the route's
//! pathname byte for byte, with no trailing-slash, case or parameter handling.
//! Routes are matched in registration order; the first route whose method and
//! pathname both match the incoming request wins.

use std::pin::Pin;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::http::{Method, Request, Response, Url};

/// The error type a handler may fail with.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The boxed future a type-erased handler returns.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Response, HandlerError>> + Send>>;

/// Type-erased, heap-allocated async handler that maps a [`Request`] to a
/// [`Response`].
///
/// Handlers are stored behind `Arc<dyn Fn(…)>` so they can be cloned and shared across
/// threads without copying the underlying closure. In practice you never construct this
/// type directly; pass a closure to [`Server::add_route`](crate::Server::add_route)
/// or [`Route::new`].
pub type Handler = Arc<dyn Fn(Request) -> HandlerFuture + Send + Sync + 'static>;

/// Ways a matched handler can fail to produce a response.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("handler failed: {0}")]
    Failed(HandlerError),

    #[error("handler panicked")]
    Panicked,
}

/// A single registered route binding a method + URL to a handler.
///
/// Only the URL's pathname takes part in matching.
#[derive(Clone)]
pub struct Route {
    method: Method,
    url: Url,
    handler: Handler,
}

impl Route {
    /// Erases the concrete handler type and builds the binding.
    pub fn new<H, F>(method: Method, url: Url, handler: H) -> Self
    where
        H: Fn(Request) -> F + Send + Sync + 'static,
        F: Future<Output = Result<Response, HandlerError>> + Send + 'static,
    {
        let handler: Handler =
            Arc::new(move |request| -> HandlerFuture { Box::pin(handler(request)) });
        Self {
            method,
            url,
            handler,
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    fn matches(&self, method: Method, pathname: &str) -> bool {
        self.method == method && self.url.pathname() == pathname
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

/// An ordered, append-only route table.
///
/// Populated before the server starts listening and read-only afterwards.
///
/// # Examples
///
/// ```rust,no_run
/// use nethttp::http::{Method, Response, Url};
/// use nethttp::router::{Route, Router};
///
/// let mut router = Router::new();
/// router.push(Route::new(
///     Method::Get,
///     Url::new("127.0.0.1", "/ping", ""),
///     |req| async move { Ok(Response::new(&req, 200, "OK")) },
/// ));
/// assert_eq!(router.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Create a new, empty `Router` with no registered routes.
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Append a route after every previously registered one.
    pub fn push(&mut self, route: Route) {
        self.routes.push(route);
    }

    /// Return the number of routes registered in this router.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Return `true` if no routes have been registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Iterate over the routes in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    /// Return the first route registered for `method` and `pathname`.
    pub fn find(&self, method: Method, pathname: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.matches(method, pathname))
    }

    /// Dispatch `request` to the first matching route and return its response.
    ///
    /// When no route matches, the canned [`Response::not_found`] is returned.
    /// The handler runs on its own task so that a panic surfaces as
    /// [`DispatchError::Panicked`] instead of tearing down the caller.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::Failed`]: the handler resolved to `Err`.
    /// - [`DispatchError::Panicked`]: the handler panicked.
    pub async fn dispatch(&self, request: Request) -> Result<Response, DispatchError> {
        let Some(route) = self.find(request.method(), request.url().pathname()) else {
            debug!(
                method = %request.method(),
                path = %request.url().pathname(),
                "no route matched"
            );
            return Ok(Response::not_found(&request));
        };

        let future = (route.handler)(request);
        match tokio::spawn(future).await {
            Ok(result) => result.map_err(DispatchError::Failed),
            Err(_) => Err(DispatchError::Panicked),
        }
    }
}
