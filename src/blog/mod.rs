//! Per-request blog resolution.
//!
//! # Data Flow
//! ```text
//! /<blogs-root>/<username>/...
//!     → resolver.rs (BlogDirectory lookup, enabled check)
//!     → context.rs (BlogContext { blog, owner, viewer })
//!     → attached to the request, read by dispatch and views
//! ```
//!
//! # Design Decisions
//! - A context is built once per request and never mutated
//! - Resolution failure ends the request before dispatch

pub mod context;
pub mod resolver;

pub use context::{BlogContext, Viewer};
pub use resolver::{BlogResolver, ResolveError};
