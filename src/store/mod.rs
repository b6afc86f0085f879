//! Data layer collaborators.
//!
//! # Data Flow
//! ```text
//! Blog context resolver
//!     → BlogDirectory::lookup(username)
//!
//! Content views
//!     → ContentStore reads (keyed by blog id + filter)
//!     → ContentStore::add_comment (the only write)
//! ```
//!
//! # Design Decisions
//! - Persistence lives behind traits; the server only sees `Arc<dyn …>`
//! - "Not found" is `Ok(None)`; `Err` is reserved for data layer failures
//! - `memory.rs` backs local runs and tests

pub mod memory;
pub mod types;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryStore;
pub use types::*;

/// Data layer failure.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend unreachable or query failed.
    #[error("data layer unavailable: {0}")]
    Unavailable(String),

    /// A write referenced a record that does not exist.
    #[error("{entity} {id} not found")]
    Missing { entity: &'static str, id: u64 },

    /// Seed data could not be loaded.
    #[error("invalid seed data: {0}")]
    Seed(String),
}

/// Result type for data layer operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Blog lookup by owner name.
#[async_trait]
pub trait BlogDirectory: Send + Sync {
    async fn lookup(&self, username: &str) -> StoreResult<Option<BlogRecord>>;
}

/// Content reads and the comment write.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Articles newest first.
    async fn articles(
        &self,
        blog_id: u64,
        filter: &ArticleFilter,
        page: PageRequest,
    ) -> StoreResult<Paged<Article>>;

    async fn article(&self, blog_id: u64, article_id: u64) -> StoreResult<Option<Article>>;

    /// Months with at least one article, newest first.
    async fn archives(&self, blog_id: u64) -> StoreResult<Vec<Archive>>;

    async fn authors(&self, blog_id: u64) -> StoreResult<Vec<AuthorCount>>;

    async fn author_by_name(&self, blog_id: u64, name: &str) -> StoreResult<Option<User>>;

    async fn categories(&self, blog_id: u64) -> StoreResult<Vec<Category>>;

    async fn category_by_path(&self, blog_id: u64, path: &str) -> StoreResult<Option<Category>>;

    /// Tags by descending usage.
    async fn tags(&self, blog_id: u64) -> StoreResult<Vec<TagCount>>;

    async fn comment(&self, blog_id: u64, comment_id: u64) -> StoreResult<Option<Comment>>;

    /// Direct replies of a comment, oldest first.
    async fn replies(&self, blog_id: u64, comment_id: u64) -> StoreResult<Vec<Comment>>;

    /// Newest comments of the blog.
    async fn recent_comments(&self, blog_id: u64, limit: usize) -> StoreResult<Vec<Comment>>;

    async fn add_comment(&self, comment: NewComment) -> StoreResult<Comment>;
}
