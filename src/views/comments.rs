//! Comment submission and reply listing.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::http::response::AppError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::routing::ViewKind;
use crate::store::{Comment, NewComment, StoreError};
use crate::views::{Page, ViewRequest};

/// Longest accepted comment, in characters.
pub const MAX_COMMENT_CHARS: usize = 2000;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentForm {
    pub article_id: u64,
    pub content: String,
    #[serde(default)]
    pub parent_id: Option<u64>,
}

/// Create a comment on behalf of the viewer.
pub async fn submit(state: &AppState, req: ViewRequest<'_>) -> Result<Response, AppError> {
    let ctx = req.ctx;
    let author = ctx.viewer.name().ok_or(AppError::Unauthorized)?;
    if !ctx.blog.commentable {
        return Err(AppError::Forbidden("comments are closed".into()));
    }

    let form: CommentForm = serde_json::from_slice(req.body)
        .map_err(|e| AppError::BadRequest(format!("invalid comment: {e}")))?;
    let content = form.content.trim();
    if content.is_empty() {
        return Err(AppError::BadRequest("comment is empty".into()));
    }
    if content.chars().count() > MAX_COMMENT_CHARS {
        return Err(AppError::BadRequest(format!(
            "comment exceeds {MAX_COMMENT_CHARS} characters"
        )));
    }

    let blog_id = ctx.blog_id();
    if state.content.article(blog_id, form.article_id).await?.is_none() {
        return Err(AppError::NotFound);
    }
    if let Some(parent_id) = form.parent_id {
        let parent = state.content.comment(blog_id, parent_id).await?;
        if parent.is_none_or(|p| p.article_id != form.article_id) {
            return Err(AppError::BadRequest(format!(
                "comment {parent_id} is not on article {}",
                form.article_id
            )));
        }
    }

    let comment = state
        .content
        .add_comment(NewComment {
            blog_id,
            article_id: form.article_id,
            author: author.to_string(),
            content: content.to_string(),
            parent_id: form.parent_id,
        })
        .await
        .map_err(|e| match e {
            StoreError::Missing { .. } => AppError::NotFound,
            other => AppError::Store(other),
        })?;

    tracing::info!(
        blog_id,
        article_id = comment.article_id,
        comment_id = comment.id,
        "Comment created"
    );
    metrics::record_comment_created();

    Ok((StatusCode::CREATED, Json(comment)).into_response())
}

/// Parse `<id>` or `<id>/replies`.
pub fn parse_comment_id(param: &str) -> Option<u64> {
    let id = match param.split_once('/') {
        Some((id, "replies")) => id,
        Some(_) => return None,
        None => param,
    };
    id.parse().ok()
}

pub async fn replies(
    state: &AppState,
    req: ViewRequest<'_>,
    param: &str,
) -> Result<Response, AppError> {
    let kind = ViewKind::CommentReplies;
    let blog_id = req.ctx.blog_id();

    let parent = match parse_comment_id(param) {
        Some(id) => state.content.comment(blog_id, id).await?,
        None => None,
    };
    let Some(parent) = parent else {
        return Ok(Page::new(state, req.ctx, kind, Vec::<Comment>::new())
            .filtered(param, false)
            .into_response());
    };

    let replies = state.content.replies(blog_id, parent.id).await?;
    Ok(Page::new(state, req.ctx, kind, replies)
        .filtered(param, true)
        .into_response())
}
