//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → dispatcher.rs (ordered scan)
//!     → matcher.rs (anchored regex, positional captures)
//!     → Handled(response) | MethodNotAllowed(allow) | NotFound
//!
//! Route Compilation (at startup):
//!     (method, pattern, handler)[]
//!     → router.rs (compile patterns, keep registration order)
//!     → Freeze as immutable RouteTable inside a Dispatcher
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - The table is injected into the dispatcher, never global
//! - Captured values are handed to handlers as an explicit argument
//! - First route matching path and method wins

pub mod dispatcher;
pub mod matcher;
pub mod router;

use thiserror::Error;

pub use dispatcher::{Dispatch, Dispatcher, MatchResult};
pub use matcher::{Params, PathPattern};
pub use router::{Route, RouteHandler, RouteTable};

/// Errors raised while building a route table.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("invalid route pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
