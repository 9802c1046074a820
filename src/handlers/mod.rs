//! Request handlers and the default route table.
//!
//! # Routes
//! - `GET /favicon.ico` → 204
//! - `GET /barcode/{symbology}/{width}x{height}/{text}.{format}` → image
//!
//! # Data Flow
//! ```text
//! Params (positional captures) + query + If-None-Match
//!     → barcode.rs (ImageRequest)
//!     → etag.rs (CacheToken) → 304 on match
//!     → symbology::SymbolEncoder → BarModel::scale → raster::RasterEncoder
//!     → 200 with ETag / Cache-Control / Content-Type
//! ```

pub mod barcode;
pub mod etag;
pub mod favicon;
pub mod params;

use axum::http::Method;

use crate::config::CacheConfig;
use crate::routing::{RouteError, RouteTable};

pub use barcode::{BarcodeHandler, ImageRequest, RequestError};
pub use etag::CacheToken;
pub use params::parse_int_or_default;

/// Build the service's route table.
pub fn route_table(cache: &CacheConfig) -> Result<RouteTable, RouteError> {
    let mut table = RouteTable::new();
    table
        .register(Method::GET, favicon::FAVICON_PATTERN, favicon::favicon)?
        .register(Method::GET, barcode::BARCODE_PATTERN, BarcodeHandler::new(cache))?;
    Ok(table)
}
