//! The keyword table consulted by the dispatcher.
//!
//! # Responsibilities
//! - Map literal keywords to listing view kinds
//! - Derive the filtered ("…Articles" / replies) variant of each prefix kind
//! - Reject duplicate or malformed keywords once, at startup
//!
//! # Design Decisions
//! - Prefix priority is fixed: archives, authors, categories, tags, comments
//! - Keywords may be renamed through configuration but never share a value

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::config::PathsConfig;
use crate::routing::SEPARATOR;

/// The content view selected for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    Activities,
    Archives,
    Authors,
    Categories,
    Tags,
    /// Comment submission (the only writing view).
    Comments,
    AtomFeed,
    ArchiveArticles,
    AuthorArticles,
    CategoryArticles,
    TagArticles,
    CommentReplies,
    Unhandled,
}

impl ViewKind {
    /// Kinds reachable through an exact keyword match.
    pub const EXACT: [ViewKind; 7] = [
        ViewKind::Activities,
        ViewKind::Archives,
        ViewKind::Authors,
        ViewKind::Categories,
        ViewKind::Tags,
        ViewKind::Comments,
        ViewKind::AtomFeed,
    ];

    /// Listing kinds whose keyword also acts as a prefix, in priority order.
    pub const PREFIX_PRIORITY: [ViewKind; 5] = [
        ViewKind::Archives,
        ViewKind::Authors,
        ViewKind::Categories,
        ViewKind::Tags,
        ViewKind::Comments,
    ];

    /// The filtered variant selected when this kind's keyword is a prefix.
    pub fn prefixed(self) -> Option<ViewKind> {
        match self {
            ViewKind::Archives => Some(ViewKind::ArchiveArticles),
            ViewKind::Authors => Some(ViewKind::AuthorArticles),
            ViewKind::Categories => Some(ViewKind::CategoryArticles),
            ViewKind::Tags => Some(ViewKind::TagArticles),
            ViewKind::Comments => Some(ViewKind::CommentReplies),
            _ => None,
        }
    }

    /// Whether the view writes data instead of reading it.
    pub fn is_write(self) -> bool {
        self == ViewKind::Comments
    }

    /// Stable label for logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            ViewKind::Activities => "activities",
            ViewKind::Archives => "archives",
            ViewKind::Authors => "authors",
            ViewKind::Categories => "categories",
            ViewKind::Tags => "tags",
            ViewKind::Comments => "comments",
            ViewKind::AtomFeed => "atom_feed",
            ViewKind::ArchiveArticles => "archive_articles",
            ViewKind::AuthorArticles => "author_articles",
            ViewKind::CategoryArticles => "category_articles",
            ViewKind::TagArticles => "tag_articles",
            ViewKind::CommentReplies => "comment_replies",
            ViewKind::Unhandled => "unhandled",
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while compiling the table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathTableError {
    #[error("keyword for {0} is empty")]
    EmptyKeyword(ViewKind),

    #[error("keyword {keyword:?} for {kind} contains a path separator")]
    ContainsSeparator { kind: ViewKind, keyword: String },

    #[error("keyword {keyword:?} for {kind} has characters that need percent-encoding")]
    NotUrlSafe { kind: ViewKind, keyword: String },

    #[error("keyword {keyword:?} is used by both {first} and {second}")]
    Duplicate {
        keyword: String,
        first: ViewKind,
        second: ViewKind,
    },

    #[error("{0} cannot be bound to a keyword")]
    NotExact(ViewKind),
}

/// RFC 3986 unreserved characters.
fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~')
}

/// Immutable keyword table.
#[derive(Debug, Clone)]
pub struct PathTable {
    exact: HashMap<String, ViewKind>,
    /// (keyword, filtered kind) in prefix priority order.
    prefixes: Vec<(String, ViewKind)>,
}

impl PathTable {
    /// Compile a table from `(keyword, kind)` entries.
    ///
    /// Every entry must name one of [`ViewKind::EXACT`]. Keywords must be
    /// non-empty, free of `/`, made of characters that travel unencoded in
    /// a URL path, and unique across the table.
    pub fn new<'a, I>(entries: I) -> Result<Self, PathTableError>
    where
        I: IntoIterator<Item = (&'a str, ViewKind)>,
    {
        let mut exact: HashMap<String, ViewKind> = HashMap::new();

        for (keyword, kind) in entries {
            if !ViewKind::EXACT.contains(&kind) {
                return Err(PathTableError::NotExact(kind));
            }
            if keyword.is_empty() {
                return Err(PathTableError::EmptyKeyword(kind));
            }
            if keyword.contains(SEPARATOR) {
                return Err(PathTableError::ContainsSeparator {
                    kind,
                    keyword: keyword.to_string(),
                });
            }
            if !keyword.bytes().all(is_unreserved) {
                return Err(PathTableError::NotUrlSafe {
                    kind,
                    keyword: keyword.to_string(),
                });
            }
            if let Some(first) = exact.insert(keyword.to_string(), kind) {
                return Err(PathTableError::Duplicate {
                    keyword: keyword.to_string(),
                    first,
                    second: kind,
                });
            }
        }

        let mut prefixes = Vec::with_capacity(ViewKind::PREFIX_PRIORITY.len());
        for listing in ViewKind::PREFIX_PRIORITY {
            let keyword = exact
                .iter()
                .find(|(_, kind)| **kind == listing)
                .map(|(keyword, _)| keyword.clone());
            if let (Some(keyword), Some(filtered)) = (keyword, listing.prefixed()) {
                prefixes.push((keyword, filtered));
            }
        }

        Ok(Self { exact, prefixes })
    }

    /// Build the table from configured keywords.
    pub fn from_config(paths: &PathsConfig) -> Result<Self, PathTableError> {
        Self::new([
            (paths.activities.as_str(), ViewKind::Activities),
            (paths.archives.as_str(), ViewKind::Archives),
            (paths.authors.as_str(), ViewKind::Authors),
            (paths.categories.as_str(), ViewKind::Categories),
            (paths.tags.as_str(), ViewKind::Tags),
            (paths.comments.as_str(), ViewKind::Comments),
            (paths.atom.as_str(), ViewKind::AtomFeed),
        ])
    }

    /// Prefix keywords with their filtered kind, highest priority first.
    pub fn prefixes(&self) -> impl Iterator<Item = (&str, ViewKind)> {
        self.prefixes.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Keyword bound to `kind`, used to build links.
    pub fn keyword(&self, kind: ViewKind) -> Option<&str> {
        self.exact
            .iter()
            .find(|(_, v)| **v == kind)
            .map(|(k, _)| k.as_str())
    }
}
