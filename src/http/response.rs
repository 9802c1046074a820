//! Response construction helpers.
//!
//! # Responsibilities
//! - Build plain-text error responses with a consistent shape
//! - Build the empty-bodied status responses (204, 304)
//!
//! # Design Decisions
//! - Error bodies are the message plus a trailing newline
//! - Error responses are `text/plain; charset=utf-8` and marked `nosniff`
//! - 304 carries no headers beyond what the server adds itself

use axum::http::header::{CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

/// Plain-text error response.
pub fn text_error(status: StatusCode, message: impl std::fmt::Display) -> Response {
    let mut response = (status, format!("{}\n", message)).into_response();
    let headers = response.headers_mut();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    response
}

pub fn bad_request(message: impl std::fmt::Display) -> Response {
    text_error(StatusCode::BAD_REQUEST, message)
}

pub fn not_found() -> Response {
    text_error(StatusCode::NOT_FOUND, "404 page not found")
}

pub fn internal_error() -> Response {
    text_error(StatusCode::INTERNAL_SERVER_ERROR, "500 internal server error")
}

pub fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

pub fn not_modified() -> Response {
    StatusCode::NOT_MODIFIED.into_response()
}
