//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, Response};
use axum::Router;
use chrono::{TimeZone, Utc};
use tower::ServiceExt;

use blogd::config::BlogConfig;
use blogd::http::HttpServer;
use blogd::store::{
    Article, Blog, BlogDirectory, BlogRecord, Category, Comment, MemoryStore, StoreError,
    StoreResult, User,
};

pub const VIEWER_HEADER: &str = "x-blog-viewer";

/// Two users with blogs: `alice` (enabled, commentable) and `dave` (disabled).
/// `bob` writes on alice's blog but owns none.
pub fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.insert_user(User { id: 1, name: "alice".into(), avatar_url: String::new() });
    store.insert_user(User { id: 2, name: "bob".into(), avatar_url: String::new() });
    store.insert_user(User { id: 3, name: "dave".into(), avatar_url: String::new() });

    store.insert_blog(Blog {
        id: 10,
        owner_id: 1,
        title: "Alice writes".into(),
        subtitle: "notes".into(),
        enabled: true,
        commentable: true,
    });
    store.insert_blog(Blog {
        id: 30,
        owner_id: 3,
        title: "Dave's".into(),
        subtitle: String::new(),
        enabled: false,
        commentable: true,
    });

    for (id, month, day, author, tags) in [
        (100, 11, 3, 1, vec!["rust"]),
        (101, 12, 1, 2, vec!["rust", "golang"]),
        (102, 12, 20, 1, vec!["golang", "hello world"]),
    ] {
        let at = Utc.with_ymd_and_hms(2017, month, day, 9, 0, 0).unwrap();
        store.insert_article(Article {
            id,
            blog_id: 10,
            author_id: author,
            title: format!("Post {id}"),
            path: format!("/posts/{id}"),
            summary: format!("summary {id}"),
            content: format!("<p>body {id}</p>"),
            tags: tags.into_iter().map(String::from).collect(),
            created_at: at,
            updated_at: at,
        });
    }

    store.insert_category(Category {
        id: 1,
        blog_id: 10,
        title: "Tech".into(),
        path: "tech".into(),
        description: "Programming".into(),
        tags: vec!["rust".into()],
    });

    let at = Utc.with_ymd_and_hms(2017, 12, 21, 10, 0, 0).unwrap();
    store.insert_comment(Comment {
        id: 7,
        blog_id: 10,
        article_id: 102,
        author: "bob".into(),
        content: "nice".into(),
        parent_id: None,
        created_at: at,
    });
    store.insert_comment(Comment {
        id: 8,
        blog_id: 10,
        article_id: 102,
        author: "alice".into(),
        content: "thanks".into(),
        parent_id: Some(7),
        created_at: at + chrono::Duration::minutes(5),
    });
    store
}

/// A directory whose backend is down.
pub struct BrokenDirectory;

#[async_trait]
impl BlogDirectory for BrokenDirectory {
    async fn lookup(&self, _username: &str) -> StoreResult<Option<BlogRecord>> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

pub fn app_with(config: BlogConfig) -> Router {
    let store = Arc::new(seeded_store());
    HttpServer::new(config, store.clone(), store).unwrap().router()
}

pub fn app() -> Router {
    app_with(BlogConfig::default())
}

pub fn broken_app() -> Router {
    let content = Arc::new(seeded_store());
    HttpServer::new(BlogConfig::default(), Arc::new(BrokenDirectory), content)
        .unwrap()
        .router()
}

pub async fn send(app: Router, req: Request<Body>) -> Response<Body> {
    app.oneshot(req).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn body_bytes(res: Response<Body>) -> Vec<u8> {
    to_bytes(res.into_body(), usize::MAX).await.unwrap().to_vec()
}

pub async fn body_json(res: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(res).await).unwrap()
}
