//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (sizes > 0, addresses parse)
//! - Detect conflicting route keywords
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BlogConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::BlogConfig;
use crate::routing::{is_valid_blogs_root, PathTable, PathTableError};

/// A single semantic problem in a configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field}: invalid address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("paths.blogs_root must start with '/', name a segment and avoid '{{' '}}', got {0:?}")]
    InvalidBlogsRoot(String),

    #[error("paths: {0}")]
    PathTable(#[from] PathTableError),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("session.viewer_header is not a valid header name: {0:?}")]
    InvalidHeader(String),
}

/// Check a parsed configuration.
pub fn validate_config(config: &BlogConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if !is_valid_blogs_root(&config.paths.blogs_root) {
        errors.push(ValidationError::InvalidBlogsRoot(config.paths.blogs_root.clone()));
    }

    if let Err(e) = PathTable::from_config(&config.paths) {
        errors.push(e.into());
    }

    if config.site.page_size == 0 {
        errors.push(ValidationError::Zero("site.page_size"));
    }
    if config.feed.output_size == 0 {
        errors.push(ValidationError::Zero("feed.output_size"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::Zero("security.max_body_size"));
    }

    if axum::http::HeaderName::from_bytes(config.session.viewer_header.as_bytes()).is_err() {
        errors.push(ValidationError::InvalidHeader(config.session.viewer_header.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
