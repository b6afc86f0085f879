//! Route path dispatch.
//!
//! # Responsibilities
//! - Hold the compiled exact and prefix rules
//! - Resolve a route path to exactly one `RouteDecision`
//! - Report unmatched paths
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Exact stage runs to completion before any prefix is tried
//! - Prefix rules are scanned in the table's fixed priority order
//! - Explicit `Unhandled` rather than an error or silent default
//! - Request paths are matched still encoded; only the parameter is decoded

use percent_encoding::percent_decode_str;
use serde::Serialize;

use crate::observability::metrics;
use crate::routing::matcher::{ExactMatcher, Matcher, PrefixMatcher};
use crate::routing::table::{PathTable, ViewKind};
use crate::routing::SEPARATOR;

/// Outcome of dispatching one route path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDecision {
    pub kind: ViewKind,
    /// Remainder after `<keyword>/` for prefix matches, empty otherwise.
    pub param: String,
}

impl RouteDecision {
    pub fn new(kind: ViewKind, param: impl Into<String>) -> Self {
        Self {
            kind,
            param: param.into(),
        }
    }

    pub fn unhandled() -> Self {
        Self::new(ViewKind::Unhandled, "")
    }

    pub fn is_handled(&self) -> bool {
        self.kind != ViewKind::Unhandled
    }
}

#[derive(Debug)]
struct Rule {
    matcher: Box<dyn Matcher>,
    kind: ViewKind,
}

/// Maps route paths to view kinds.
#[derive(Debug)]
pub struct Dispatcher {
    exact: Vec<Rule>,
    prefix: Vec<Rule>,
}

impl Dispatcher {
    /// Compile the rules of `table`.
    pub fn new(table: &PathTable) -> Self {
        let exact = ViewKind::EXACT
            .iter()
            .filter_map(|kind| {
                table.keyword(*kind).map(|keyword| Rule {
                    matcher: Box::new(ExactMatcher::new(keyword)),
                    kind: *kind,
                })
            })
            .collect();

        let prefix = table
            .prefixes()
            .map(|(keyword, kind)| Rule {
                matcher: Box::new(PrefixMatcher::new(keyword)),
                kind,
            })
            .collect();

        Self { exact, prefix }
    }

    /// Resolve `route_path` to a decision.
    ///
    /// A single leading `/` is ignored. Never fails: paths matching no rule
    /// yield [`ViewKind::Unhandled`] and are logged.
    pub fn dispatch(&self, route_path: &str) -> RouteDecision {
        let path = route_path.strip_prefix(SEPARATOR).unwrap_or(route_path);

        if let Some(decision) = Self::first_match(&self.exact, path) {
            return decision;
        }
        if let Some(decision) = Self::first_match(&self.prefix, path) {
            return decision;
        }

        tracing::info!(path = %route_path, "can't handle path");
        metrics::record_unhandled();
        RouteDecision::unhandled()
    }

    /// Resolve a percent-encoded route path, as taken from a request URI.
    ///
    /// An encoded `%2F` is never a separator. The parameter is decoded after
    /// matching; one that is not UTF-8 once decoded yields `Unhandled`.
    pub fn dispatch_encoded(&self, raw_path: &str) -> RouteDecision {
        let decision = self.dispatch(raw_path);
        if decision.param.is_empty() {
            return decision;
        }

        match percent_decode_str(&decision.param).decode_utf8() {
            Ok(param) => RouteDecision::new(decision.kind, param),
            Err(_) => {
                tracing::info!(path = %raw_path, "can't decode path");
                metrics::record_unhandled();
                RouteDecision::unhandled()
            }
        }
    }

    fn first_match(rules: &[Rule], path: &str) -> Option<RouteDecision> {
        rules.iter().find_map(|rule| {
            rule.matcher
                .matches(path)
                .map(|param| RouteDecision::new(rule.kind, param))
        })
    }
}
