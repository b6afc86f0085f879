//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the blog
//! server. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the blog server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BlogConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Blogs root and route keywords.
    pub paths: PathsConfig,

    /// Site-wide presentation settings.
    pub site: SiteConfig,

    /// Atom feed settings.
    pub feed: FeedConfig,

    /// Viewer identity handed over by the session layer.
    pub session: SessionConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Blogs root and the keywords of the path table.
///
/// Keywords are fixed for the life of the process; reloads ignore changes.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    /// Mount point of all blogs (e.g., "/blogs").
    pub blogs_root: String,
    pub activities: String,
    pub archives: String,
    pub authors: String,
    pub categories: String,
    pub tags: String,
    pub comments: String,
    /// Keyword of the Atom feed.
    pub atom: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            blogs_root: "/blogs".to_string(),
            activities: "activities".to_string(),
            archives: "archives".to_string(),
            authors: "authors".to_string(),
            categories: "categories".to_string(),
            tags: "tags".to_string(),
            comments: "comments".to_string(),
            atom: "atom".to_string(),
        }
    }
}

/// Site-wide settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Public base URL, used for absolute links in the feed.
    pub base_url: String,

    /// Articles per listing page.
    pub page_size: usize,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            page_size: 20,
        }
    }
}

/// What a feed entry carries.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FeedOutputMode {
    /// Summary only.
    #[default]
    Abstract,
    /// Full article content.
    Full,
}

/// Atom feed settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Number of newest articles in the feed.
    pub output_size: usize,

    pub output_mode: FeedOutputMode,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            output_size: 20,
            output_mode: FeedOutputMode::Abstract,
        }
    }
}

/// Session hand-off settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Header carrying the authenticated user name.
    pub viewer_header: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            viewer_header: "x-blog-viewer".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Enable security headers.
    pub enable_headers: bool,
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
            max_body_size: 64 * 1024, // 64KB, comments only
        }
    }
}
