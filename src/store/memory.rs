//! In-memory content store.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use serde::Deserialize;

use crate::store::types::*;
use crate::store::{BlogDirectory, ContentStore, StoreError, StoreResult};

/// Initial data for a [`MemoryStore`], usually read from a JSON file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Seed {
    pub users: Vec<User>,
    pub blogs: Vec<Blog>,
    pub articles: Vec<Article>,
    pub categories: Vec<Category>,
    pub comments: Vec<Comment>,
}

#[derive(Default)]
struct Inner {
    users: DashMap<u64, User>,
    blogs: DashMap<u64, Blog>,
    articles: DashMap<u64, Article>,
    categories: DashMap<u64, Category>,
    comments: DashMap<u64, Comment>,
    next_comment_id: AtomicU64,
}

/// A thread-safe store for blogs and their content.
///
/// Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from seed data.
    pub fn from_seed(seed: Seed) -> Self {
        let store = Self::new();
        for user in seed.users {
            store.insert_user(user);
        }
        for blog in seed.blogs {
            store.insert_blog(blog);
        }
        for article in seed.articles {
            store.insert_article(article);
        }
        for category in seed.categories {
            store.insert_category(category);
        }
        for comment in seed.comments {
            store.insert_comment(comment);
        }
        store
    }

    /// Load from a JSON seed file.
    pub fn load_from_file(path: &Path) -> StoreResult<Self> {
        let file = File::open(path).map_err(|e| StoreError::Seed(e.to_string()))?;
        let seed: Seed = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| StoreError::Seed(e.to_string()))?;
        let store = Self::from_seed(seed);
        tracing::info!(
            users = store.inner.users.len(),
            blogs = store.inner.blogs.len(),
            articles = store.inner.articles.len(),
            "Loaded seed data"
        );
        Ok(store)
    }

    pub fn insert_user(&self, user: User) {
        self.inner.users.insert(user.id, user);
    }

    pub fn insert_blog(&self, blog: Blog) {
        self.inner.blogs.insert(blog.id, blog);
    }

    pub fn insert_article(&self, article: Article) {
        self.inner.articles.insert(article.id, article);
    }

    pub fn insert_category(&self, category: Category) {
        self.inner.categories.insert(category.id, category);
    }

    pub fn insert_comment(&self, comment: Comment) {
        self.inner
            .next_comment_id
            .fetch_max(comment.id, Ordering::Relaxed);
        self.inner.comments.insert(comment.id, comment);
    }

    fn blog_articles(&self, blog_id: u64) -> Vec<Article> {
        let mut articles: Vec<Article> = self
            .inner
            .articles
            .iter()
            .filter(|a| a.blog_id == blog_id)
            .map(|a| a.value().clone())
            .collect();
        articles.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        articles
    }

    fn user(&self, id: u64) -> Option<User> {
        self.inner.users.get(&id).map(|u| u.value().clone())
    }
}

#[async_trait]
impl BlogDirectory for MemoryStore {
    async fn lookup(&self, username: &str) -> StoreResult<Option<BlogRecord>> {
        let owner = self
            .inner
            .users
            .iter()
            .find(|u| u.name == username)
            .map(|u| u.value().clone());
        let Some(owner) = owner else {
            return Ok(None);
        };

        let blog = self
            .inner
            .blogs
            .iter()
            .find(|b| b.owner_id == owner.id)
            .map(|b| b.value().clone());

        Ok(blog.map(|blog| BlogRecord { blog, owner }))
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn articles(
        &self,
        blog_id: u64,
        filter: &ArticleFilter,
        page: PageRequest,
    ) -> StoreResult<Paged<Article>> {
        let matching = self
            .blog_articles(blog_id)
            .into_iter()
            .filter(|a| filter.accepts(a))
            .collect();
        Ok(Paged::from_vec(matching, page))
    }

    async fn article(&self, blog_id: u64, article_id: u64) -> StoreResult<Option<Article>> {
        Ok(self
            .inner
            .articles
            .get(&article_id)
            .filter(|a| a.blog_id == blog_id)
            .map(|a| a.value().clone()))
    }

    async fn archives(&self, blog_id: u64) -> StoreResult<Vec<Archive>> {
        let mut months: BTreeMap<(i32, u32), usize> = BTreeMap::new();
        for article in self.blog_articles(blog_id) {
            *months.entry(article.period()).or_default() += 1;
        }
        Ok(months
            .into_iter()
            .rev()
            .map(|((year, month), article_count)| Archive {
                year,
                month,
                article_count,
            })
            .collect())
    }

    async fn authors(&self, blog_id: u64) -> StoreResult<Vec<AuthorCount>> {
        let mut counts: HashMap<u64, usize> = HashMap::new();
        for article in self.blog_articles(blog_id) {
            *counts.entry(article.author_id).or_default() += 1;
        }
        let mut authors: Vec<AuthorCount> = counts
            .into_iter()
            .filter_map(|(id, article_count)| {
                self.user(id).map(|user| AuthorCount {
                    user,
                    article_count,
                })
            })
            .collect();
        authors.sort_by(|a, b| {
            b.article_count
                .cmp(&a.article_count)
                .then_with(|| a.user.name.cmp(&b.user.name))
        });
        Ok(authors)
    }

    async fn author_by_name(&self, blog_id: u64, name: &str) -> StoreResult<Option<User>> {
        let author_id = self
            .blog_articles(blog_id)
            .into_iter()
            .map(|a| a.author_id)
            .find(|id| self.user(*id).is_some_and(|u| u.name == name));
        Ok(author_id.and_then(|id| self.user(id)))
    }

    async fn categories(&self, blog_id: u64) -> StoreResult<Vec<Category>> {
        let mut categories: Vec<Category> = self
            .inner
            .categories
            .iter()
            .filter(|c| c.blog_id == blog_id)
            .map(|c| c.value().clone())
            .collect();
        categories.sort_by_key(|c| c.id);
        Ok(categories)
    }

    async fn category_by_path(&self, blog_id: u64, path: &str) -> StoreResult<Option<Category>> {
        Ok(self
            .inner
            .categories
            .iter()
            .find(|c| c.blog_id == blog_id && c.path == path)
            .map(|c| c.value().clone()))
    }

    async fn tags(&self, blog_id: u64) -> StoreResult<Vec<TagCount>> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for article in self.blog_articles(blog_id) {
            for tag in article.tags {
                *counts.entry(tag).or_default() += 1;
            }
        }
        let mut tags: Vec<TagCount> = counts
            .into_iter()
            .map(|(title, article_count)| TagCount {
                title,
                article_count,
            })
            .collect();
        tags.sort_by(|a, b| {
            b.article_count
                .cmp(&a.article_count)
                .then_with(|| a.title.cmp(&b.title))
        });
        Ok(tags)
    }

    async fn comment(&self, blog_id: u64, comment_id: u64) -> StoreResult<Option<Comment>> {
        Ok(self
            .inner
            .comments
            .get(&comment_id)
            .filter(|c| c.blog_id == blog_id)
            .map(|c| c.value().clone()))
    }

    async fn replies(&self, blog_id: u64, comment_id: u64) -> StoreResult<Vec<Comment>> {
        let mut replies: Vec<Comment> = self
            .inner
            .comments
            .iter()
            .filter(|c| c.blog_id == blog_id && c.parent_id == Some(comment_id))
            .map(|c| c.value().clone())
            .collect();
        replies.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(replies)
    }

    async fn recent_comments(&self, blog_id: u64, limit: usize) -> StoreResult<Vec<Comment>> {
        let mut comments: Vec<Comment> = self
            .inner
            .comments
            .iter()
            .filter(|c| c.blog_id == blog_id)
            .map(|c| c.value().clone())
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        comments.truncate(limit);
        Ok(comments)
    }

    async fn add_comment(&self, new: NewComment) -> StoreResult<Comment> {
        if self.article(new.blog_id, new.article_id).await?.is_none() {
            return Err(StoreError::Missing {
                entity: "article",
                id: new.article_id,
            });
        }
        if let Some(parent_id) = new.parent_id {
            if self.comment(new.blog_id, parent_id).await?.is_none() {
                return Err(StoreError::Missing {
                    entity: "comment",
                    id: parent_id,
                });
            }
        }

        let id = self.inner.next_comment_id.fetch_add(1, Ordering::Relaxed) + 1;
        let comment = Comment {
            id,
            blog_id: new.blog_id,
            article_id: new.article_id,
            author: new.author,
            content: new.content,
            parent_id: new.parent_id,
            created_at: Utc::now(),
        };
        self.inner.comments.insert(id, comment.clone());
        Ok(comment)
    }
}
