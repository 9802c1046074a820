//! Route table.
//!
//! # Responsibilities
//! - Store compiled routes in registration order
//! - Pair each path pattern with its method and handler
//!
//! # Design Decisions
//! - Built once at startup, then moved behind an `Arc` (read-only, no locks)
//! - Registration order is match order; there are no priorities
//! - The same pattern may be registered under several methods

use std::fmt;
use std::sync::Arc;

use axum::http::request::Parts;
use axum::http::Method;
use axum::response::Response;

use super::matcher::{Params, PathPattern};
use super::RouteError;

/// Handles a request whose method and path matched a route.
pub trait RouteHandler: Send + Sync {
    fn handle(&self, request: &Parts, params: &Params) -> Response;
}

impl<F> RouteHandler for F
where
    F: Fn(&Parts, &Params) -> Response + Send + Sync,
{
    fn handle(&self, request: &Parts, params: &Params) -> Response {
        self(request, params)
    }
}

/// A single (method, pattern, handler) entry.
pub struct Route {
    method: Method,
    pattern: PathPattern,
    handler: Arc<dyn RouteHandler>,
}

impl Route {
    pub fn new(
        method: Method,
        pattern: &str,
        handler: impl RouteHandler + 'static,
    ) -> Result<Self, RouteError> {
        Ok(Self {
            method,
            pattern: PathPattern::new(pattern)?,
            handler: Arc::new(handler),
        })
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn handler(&self) -> &dyn RouteHandler {
        self.handler.as_ref()
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern.as_str())
            .finish()
    }
}

/// Ordered list of routes.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `pattern` and append it to the table.
    pub fn register(
        &mut self,
        method: Method,
        pattern: &str,
        handler: impl RouteHandler + 'static,
    ) -> Result<&mut Self, RouteError> {
        let route = Route::new(method, pattern, handler)?;
        tracing::debug!(
            method = %route.method,
            pattern = %route.pattern.as_str(),
            "Route registered"
        );
        self.routes.push(route);
        Ok(self)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
