//! Unfiltered listing views.

use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::http::response::AppError;
use crate::http::server::AppState;
use crate::routing::ViewKind;
use crate::store::{ArticleFilter, PageRequest};
use crate::views::{segment, Page, ViewRequest};

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Activity {
    #[serde(rename_all = "camelCase")]
    Article {
        id: u64,
        title: String,
        url: String,
        at: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    Comment {
        id: u64,
        article_id: u64,
        author: String,
        content: String,
        at: DateTime<Utc>,
    },
}

impl Activity {
    fn at(&self) -> DateTime<Utc> {
        match self {
            Activity::Article { at, .. } | Activity::Comment { at, .. } => *at,
        }
    }
}

/// Newest articles and comments, merged.
pub async fn activities(state: &AppState, req: ViewRequest<'_>) -> Result<Response, AppError> {
    let ctx = req.ctx;
    let links = state.links(ctx);
    let limit = state.settings().site.page_size;

    let articles = state
        .content
        .articles(ctx.blog_id(), &ArticleFilter::All, PageRequest::new(1, limit))
        .await?;
    let comments = state.content.recent_comments(ctx.blog_id(), limit).await?;

    let mut items: Vec<Activity> = articles
        .items
        .into_iter()
        .map(|a| Activity::Article {
            id: a.id,
            url: links.article(&a),
            title: a.title,
            at: a.created_at,
        })
        .chain(comments.into_iter().map(|c| Activity::Comment {
            id: c.id,
            article_id: c.article_id,
            author: c.author,
            content: c.content,
            at: c.created_at,
        }))
        .collect();
    items.sort_by_key(|a| std::cmp::Reverse(a.at()));
    items.truncate(limit);

    Ok(Page::new(state, ctx, ViewKind::Activities, items).into_response())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveLink {
    pub year: i32,
    pub month: u32,
    pub article_count: usize,
    pub url: String,
}

pub async fn archives(state: &AppState, req: ViewRequest<'_>) -> Result<Response, AppError> {
    let ctx = req.ctx;
    let links = state.links(ctx);
    let keyword = &state.paths.archives;

    let data: Vec<ArchiveLink> = state
        .content
        .archives(ctx.blog_id())
        .await?
        .into_iter()
        .map(|a| ArchiveLink {
            url: links.view(keyword, Some(&format!("{}/{:02}", a.year, a.month))),
            year: a.year,
            month: a.month,
            article_count: a.article_count,
        })
        .collect();

    Ok(Page::new(state, ctx, ViewKind::Archives, data).into_response())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorLink {
    pub name: String,
    pub avatar_url: String,
    pub article_count: usize,
    pub url: String,
}

pub async fn authors(state: &AppState, req: ViewRequest<'_>) -> Result<Response, AppError> {
    let ctx = req.ctx;
    let links = state.links(ctx);
    let keyword = &state.paths.authors;

    let data: Vec<AuthorLink> = state
        .content
        .authors(ctx.blog_id())
        .await?
        .into_iter()
        .map(|a| AuthorLink {
            url: links.view(keyword, Some(&segment(&a.user.name))),
            name: a.user.name,
            avatar_url: a.user.avatar_url,
            article_count: a.article_count,
        })
        .collect();

    Ok(Page::new(state, ctx, ViewKind::Authors, data).into_response())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryLink {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub url: String,
}

pub async fn categories(state: &AppState, req: ViewRequest<'_>) -> Result<Response, AppError> {
    let ctx = req.ctx;
    let links = state.links(ctx);
    let keyword = &state.paths.categories;

    let data: Vec<CategoryLink> = state
        .content
        .categories(ctx.blog_id())
        .await?
        .into_iter()
        .map(|c| CategoryLink {
            url: links.view(keyword, Some(&segment(&c.path))),
            title: c.title,
            description: c.description,
            tags: c.tags,
        })
        .collect();

    Ok(Page::new(state, ctx, ViewKind::Categories, data).into_response())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagLink {
    pub title: String,
    pub article_count: usize,
    pub url: String,
}

pub async fn tags(state: &AppState, req: ViewRequest<'_>) -> Result<Response, AppError> {
    let ctx = req.ctx;
    let links = state.links(ctx);
    let keyword = &state.paths.tags;

    let data: Vec<TagLink> = state
        .content
        .tags(ctx.blog_id())
        .await?
        .into_iter()
        .map(|t| TagLink {
            url: links.view(keyword, Some(&segment(&t.title))),
            title: t.title,
            article_count: t.article_count,
        })
        .collect();

    Ok(Page::new(state, ctx, ViewKind::Tags, data).into_response())
}
