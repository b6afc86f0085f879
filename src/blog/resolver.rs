//! Username → blog resolution.
//!
//! # Responsibilities
//! - Look up the blog owned by the username segment
//! - Refuse disabled blogs
//! - Build the `BlogContext` for the request
//!
//! # Design Decisions
//! - The directory lookup is awaited with no lock held
//! - Unknown and disabled blogs are indistinguishable to clients (404)
//! - Data layer failures surface as 500, never as 404

use std::sync::Arc;

use thiserror::Error;

use crate::blog::context::{BlogContext, Viewer};
use crate::store::{BlogDirectory, StoreError};

/// Why a blog could not be resolved.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no blog for user {0:?}")]
    NotFound(String),

    #[error("blog of user {0:?} is disabled")]
    Disabled(String),

    #[error("blog lookup failed: {0}")]
    Lookup(#[from] StoreError),
}

impl ResolveError {
    /// Label for logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            ResolveError::NotFound(_) => "not_found",
            ResolveError::Disabled(_) => "disabled",
            ResolveError::Lookup(_) => "lookup",
        }
    }
}

/// Resolves blogs through a [`BlogDirectory`].
#[derive(Clone)]
pub struct BlogResolver {
    directory: Arc<dyn BlogDirectory>,
}

impl BlogResolver {
    pub fn new(directory: Arc<dyn BlogDirectory>) -> Self {
        Self { directory }
    }

    /// Resolve `username` into a context for `viewer`.
    pub async fn resolve(&self, username: &str, viewer: Viewer) -> Result<BlogContext, ResolveError> {
        let record = self
            .directory
            .lookup(username)
            .await?
            .ok_or_else(|| ResolveError::NotFound(username.to_string()))?;

        if !record.blog.enabled {
            return Err(ResolveError::Disabled(username.to_string()));
        }

        Ok(BlogContext {
            blog: record.blog,
            owner: record.owner,
            viewer,
        })
    }
}
