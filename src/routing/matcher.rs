//! Route path matching logic.
//!
//! # Responsibilities
//! - Match a route path exactly against a keyword
//! - Match an anchored `<keyword>/` prefix and yield the remainder
//!
//! # Design Decisions
//! - Matching is case-sensitive
//! - Prefixes are anchored at offset 0; a keyword appearing elsewhere in the
//!   path never matches
//! - The separator must follow the keyword immediately and the remainder
//!   must be non-empty
//! - No regex to guarantee O(n) matching

use crate::routing::SEPARATOR;

/// Trait for matching route paths against a condition.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns the parameter captured by the match, or `None` on no match.
    fn matches<'a>(&self, path: &'a str) -> Option<&'a str>;
}

/// Matches a route path equal to the keyword.
#[derive(Debug, Clone)]
pub struct ExactMatcher {
    keyword: String,
}

impl ExactMatcher {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
        }
    }
}

impl Matcher for ExactMatcher {
    fn matches<'a>(&self, path: &'a str) -> Option<&'a str> {
        (path == self.keyword).then_some("")
    }
}

/// Matches `<keyword>/<rest>` with a non-empty `rest`.
#[derive(Debug, Clone)]
pub struct PrefixMatcher {
    keyword: String,
}

impl PrefixMatcher {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
        }
    }
}

impl Matcher for PrefixMatcher {
    fn matches<'a>(&self, path: &'a str) -> Option<&'a str> {
        let rest = path
            .strip_prefix(self.keyword.as_str())?
            .strip_prefix(SEPARATOR)?;
        (!rest.is_empty()).then_some(rest)
    }
}
