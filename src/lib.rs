//! Barcode image HTTP service library

pub mod config;
pub mod handlers;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod raster;
pub mod routing;
pub mod symbology;

pub use config::schema::ServerConfig;
pub use http::{HttpServer, ServerError};
pub use lifecycle::Shutdown;
