//! Blog path dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (/<blogs-root>/<username>/<rest>)
//!     → split_blog_path (username + route path)
//!     → dispatcher.rs (exact stage, then anchored prefix stage)
//!     → matcher.rs (evaluate keyword conditions)
//!     → Return: RouteDecision { kind, param } or Unhandled
//!
//! Table Compilation (at startup):
//!     PathsConfig keywords
//!     → table.rs (validate non-empty, no separator, unique)
//!     → Compile exact + prefix matchers in fixed priority order
//!     → Freeze as immutable PathTable
//! ```
//!
//! # Design Decisions
//! - Table compiled at startup, immutable at runtime
//! - No regex in hot path (literal comparison only)
//! - Deterministic: same input always yields the same decision
//! - First match wins; exact matches always beat prefix matches
//! - "No match" is a value (`ViewKind::Unhandled`), never an error

pub mod dispatcher;
pub mod matcher;
pub mod table;

pub use dispatcher::{Dispatcher, RouteDecision};
pub use table::{PathTable, PathTableError, ViewKind};

/// Path separator between route segments.
pub const SEPARATOR: char = '/';

/// Whether `root` can mount the blogs: an absolute path naming at least one
/// segment, without the `{`/`}` the HTTP router reserves for captures.
pub fn is_valid_blogs_root(root: &str) -> bool {
    let root = root.trim_end_matches(SEPARATOR);
    root.starts_with(SEPARATOR) && root.len() > 1 && !root.contains(['{', '}'])
}

/// Split a request path of the shape `/<root>/<username>[/<rest>]`.
///
/// Returns the username segment and the (possibly empty) route path after
/// it. `None` when the path is not under `root` or the username is empty.
pub fn split_blog_path<'a>(root: &str, path: &'a str) -> Option<(&'a str, &'a str)> {
    let root = root.trim_end_matches(SEPARATOR);
    let after_root = path.strip_prefix(root)?;
    let after_root = after_root.strip_prefix(SEPARATOR)?;

    let (username, rest) = match after_root.split_once(SEPARATOR) {
        Some((username, rest)) => (username, rest),
        None => (after_root, ""),
    };

    if username.is_empty() {
        return None;
    }
    Some((username, rest))
}
