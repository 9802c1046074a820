use axum::http::request::Parts;
use axum::response::Response;

use crate::http::response;
use crate::routing::Params;

/// Route pattern for browser favicon probes.
pub const FAVICON_PATTERN: &str = r"/favicon\.ico";

/// Browsers ask for a favicon on every page; answer with an empty 204.
pub fn favicon(_request: &Parts, _params: &Params) -> Response {
    response::no_content()
}
