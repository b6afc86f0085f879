//! Content record types shared by the data layer and the views.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub avatar_url: String,
}

/// A blog owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    pub id: u64,
    pub owner_id: u64,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub commentable: bool,
}

fn default_true() -> bool {
    true
}

/// Result of a blog directory lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogRecord {
    pub blog: Blog,
    pub owner: User,
}

/// A published article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: u64,
    pub blog_id: u64,
    pub author_id: u64,
    pub title: String,
    /// Permalink path relative to the blog root.
    pub path: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Article {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Archive period (year, month) of this article.
    pub fn period(&self) -> (i32, u32) {
        (self.created_at.year(), self.created_at.month())
    }
}

/// An article category. Membership is derived from tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: u64,
    pub blog_id: u64,
    pub title: String,
    /// Slug used in `categories/<path>`.
    pub path: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A comment on an article, optionally replying to another comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: u64,
    pub blog_id: u64,
    pub article_id: u64,
    pub author: String,
    pub content: String,
    #[serde(default)]
    pub parent_id: Option<u64>,
    pub created_at: DateTime<Utc>,
}

/// Input of the comment write operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub blog_id: u64,
    pub article_id: u64,
    pub author: String,
    pub content: String,
    pub parent_id: Option<u64>,
}

/// One month of the archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Archive {
    pub year: i32,
    pub month: u32,
    pub article_count: usize,
}

/// A tag with its usage count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagCount {
    pub title: String,
    pub article_count: usize,
}

/// An author with its usage count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorCount {
    #[serde(flatten)]
    pub user: User,
    pub article_count: usize,
}

/// Archive period filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub year: i32,
    pub month: Option<u32>,
}

impl Period {
    pub fn contains(&self, article: &Article) -> bool {
        let (year, month) = article.period();
        year == self.year && self.month.is_none_or(|m| m == month)
    }
}

/// Which articles a listing returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleFilter {
    All,
    Period(Period),
    Author(u64),
    /// Articles carrying any of these tags.
    AnyTag(Vec<String>),
}

impl ArticleFilter {
    pub fn accepts(&self, article: &Article) -> bool {
        match self {
            ArticleFilter::All => true,
            ArticleFilter::Period(period) => period.contains(article),
            ArticleFilter::Author(id) => article.author_id == *id,
            ArticleFilter::AnyTag(tags) => tags.iter().any(|t| article.has_tag(t)),
        }
    }
}

/// 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub size: usize,
}

impl PageRequest {
    pub fn new(page: usize, size: usize) -> Self {
        Self {
            page: page.max(1),
            size: size.max(1),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.size)
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub size: usize,
    pub total: usize,
    pub page_count: usize,
}

impl<T> Paged<T> {
    /// Slice `all` according to `req`.
    pub fn from_vec(all: Vec<T>, req: PageRequest) -> Self {
        let total = all.len();
        let items = all.into_iter().skip(req.offset()).take(req.size).collect();
        Self {
            items,
            page: req.page,
            size: req.size,
            total,
            page_count: total.div_ceil(req.size),
        }
    }

    pub fn empty(req: PageRequest) -> Self {
        Self::from_vec(Vec::new(), req)
    }
}
