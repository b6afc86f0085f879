//! The request-scoped blog context.

use serde::Serialize;

use crate::store::{Blog, User};

/// Who is looking at the blog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Viewer {
    Anonymous,
    User(String),
}

impl Viewer {
    /// Build from the value forwarded by the session layer.
    pub fn from_session_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(name) if !name.is_empty() => Viewer::User(name.to_string()),
            _ => Viewer::Anonymous,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Viewer::Anonymous => None,
            Viewer::User(name) => Some(name),
        }
    }
}

/// Resolved target of a blog request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogContext {
    pub blog: Blog,
    pub owner: User,
    pub viewer: Viewer,
}

impl BlogContext {
    pub fn blog_id(&self) -> u64 {
        self.blog.id
    }
}
