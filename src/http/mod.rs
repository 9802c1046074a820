//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → routing::Dispatcher (method + regex path match)
//!     → handlers (barcode, favicon)
//!     → response.rs (status helpers)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestId, RequestIdExt, X_REQUEST_ID};
pub use server::{HttpServer, ServerError};
