//! Request dispatch over a route table.
//!
//! # Responsibilities
//! - Scan routes in order for a full path match
//! - Invoke the first route whose path and method both match
//! - Collect the methods of path-only matches for `Allow`
//!
//! # Design Decisions
//! - Path first, method second; a method mismatch keeps scanning
//! - 405 is only reported when no route matched both path and method
//! - Allowed methods are deduplicated in first-seen order

use std::sync::Arc;

use axum::http::header::{HeaderValue, ALLOW};
use axum::http::request::Parts;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};

use super::matcher::Params;
use super::router::{Route, RouteTable};
use crate::http::response;

/// Outcome of looking a request up in the route table.
#[derive(Debug)]
pub struct MatchResult<'a> {
    /// Route that matched both path and method.
    pub route: Option<&'a Route>,
    /// Captured values of the matched route.
    pub params: Params,
    /// Methods of routes whose path matched but whose method did not.
    pub allowed: Vec<Method>,
}

impl MatchResult<'_> {
    /// The path exists but not under the requested method.
    pub fn method_mismatch(&self) -> bool {
        self.route.is_none() && !self.allowed.is_empty()
    }
}

/// Result of dispatching a request.
#[derive(Debug)]
pub enum Dispatch {
    Handled(Response),
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

impl IntoResponse for Dispatch {
    fn into_response(self) -> Response {
        match self {
            Dispatch::Handled(response) => response,
            Dispatch::MethodNotAllowed(allowed) => {
                let allow = allowed
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                let mut response =
                    response::text_error(StatusCode::METHOD_NOT_ALLOWED, "405 method not allowed");
                if let Ok(value) = HeaderValue::from_str(&allow) {
                    response.headers_mut().insert(ALLOW, value);
                }
                response
            }
            Dispatch::NotFound => response::not_found(),
        }
    }
}

/// Dispatches requests against an injected, immutable route table.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    table: Arc<RouteTable>,
}

impl Dispatcher {
    pub fn new(table: RouteTable) -> Self {
        Self {
            table: Arc::new(table),
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Find the route for `method` and `path` without invoking it.
    pub fn find(&self, method: &Method, path: &str) -> MatchResult<'_> {
        let mut allowed: Vec<Method> = Vec::new();

        for route in self.table.routes() {
            if route.method() != method {
                if route.pattern().is_match(path) && !allowed.contains(route.method()) {
                    allowed.push(route.method().clone());
                }
                continue;
            }
            if let Some(params) = route.pattern().captures(path) {
                return MatchResult {
                    route: Some(route),
                    params,
                    allowed,
                };
            }
        }

        MatchResult {
            route: None,
            params: Params::default(),
            allowed,
        }
    }

    /// Route `request` and run the matching handler.
    pub fn dispatch(&self, request: &Parts) -> Dispatch {
        let path = request.uri.path();
        let found = self.find(&request.method, path);

        match found.route {
            Some(route) => {
                tracing::debug!(
                    method = %request.method,
                    path = %path,
                    pattern = %route.pattern().as_str(),
                    "Route matched"
                );
                Dispatch::Handled(route.handler().handle(request, &found.params))
            }
            None if found.method_mismatch() => {
                tracing::debug!(method = %request.method, path = %path, "Method not allowed");
                Dispatch::MethodNotAllowed(found.allowed)
            }
            None => Dispatch::NotFound,
        }
    }
}
