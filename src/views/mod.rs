//! Content view handlers.
//!
//! # Data Flow
//! ```text
//! (BlogContext, RouteDecision, method, page, body)
//!     → render (method policy, one arm per ViewKind)
//!     → listing.rs   Activities / Archives / Authors / Categories / Tags
//!     → articles.rs  blog home + the filtered article listings
//!     → comments.rs  comment submission, reply listing
//!     → feed.rs      Atom document
//! ```
//!
//! # Design Decisions
//! - Views trust the decision; they never re-run dispatch
//! - A parameter naming no real data yields an empty page (`found: false`)
//! - Only comment submission writes

pub mod articles;
pub mod comments;
pub mod feed;
pub mod listing;

use axum::http::Method;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::Serialize;

use crate::blog::{BlogContext, Viewer};
use crate::http::response::AppError;
use crate::http::server::AppState;
use crate::routing::{RouteDecision, ViewKind};
use crate::store::{Article, PageRequest};

/// Everything a view needs besides the shared state.
#[derive(Debug, Clone, Copy)]
pub struct ViewRequest<'a> {
    pub ctx: &'a BlogContext,
    pub decision: &'a RouteDecision,
    pub method: &'a Method,
    /// 1-based page from `?p=`.
    pub page: usize,
    pub body: &'a [u8],
}

/// Produce the response for a dispatched request.
pub async fn render(state: &AppState, req: ViewRequest<'_>) -> Result<Response, AppError> {
    let kind = req.decision.kind;
    if kind == ViewKind::Unhandled {
        return Err(AppError::NotFound);
    }
    check_method(kind, req.method)?;

    let param = req.decision.param.as_str();
    let response = match kind {
        ViewKind::Activities => listing::activities(state, req).await?,
        ViewKind::Archives => listing::archives(state, req).await?,
        ViewKind::Authors => listing::authors(state, req).await?,
        ViewKind::Categories => listing::categories(state, req).await?,
        ViewKind::Tags => listing::tags(state, req).await?,
        ViewKind::Comments => comments::submit(state, req).await?,
        ViewKind::AtomFeed => feed::atom(state, req).await?,
        ViewKind::ArchiveArticles => articles::by_archive(state, req, param).await?,
        ViewKind::AuthorArticles => articles::by_author(state, req, param).await?,
        ViewKind::CategoryArticles => articles::by_category(state, req, param).await?,
        ViewKind::TagArticles => articles::by_tag(state, req, param).await?,
        ViewKind::CommentReplies => comments::replies(state, req, param).await?,
        ViewKind::Unhandled => return Err(AppError::NotFound),
    };
    Ok(response)
}

fn check_method(kind: ViewKind, method: &Method) -> Result<(), AppError> {
    if kind.is_write() {
        if method != Method::POST {
            return Err(AppError::MethodNotAllowed { allow: "POST" });
        }
    } else if method != Method::GET && method != Method::HEAD {
        return Err(AppError::MethodNotAllowed { allow: "GET, HEAD" });
    }
    Ok(())
}

/// Blog header shared by every page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogSummary {
    pub id: u64,
    pub title: String,
    pub subtitle: String,
    pub owner: String,
    pub url: String,
}

/// A rendered view model.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub blog: BlogSummary,
    pub viewer: Viewer,
    /// View label, `home` for the blog root.
    pub view: &'static str,
    /// False when the filter parameter named nothing.
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    pub data: T,
}

impl<T: Serialize> Page<T> {
    pub fn new(state: &AppState, ctx: &BlogContext, view: ViewKind, data: T) -> Self {
        Self::labeled(state, ctx, view.as_str(), data)
    }

    pub fn labeled(state: &AppState, ctx: &BlogContext, view: &'static str, data: T) -> Self {
        Self {
            blog: BlogSummary {
                id: ctx.blog.id,
                title: ctx.blog.title.clone(),
                subtitle: ctx.blog.subtitle.clone(),
                owner: ctx.owner.name.clone(),
                url: state.links(ctx).blog(),
            },
            viewer: ctx.viewer.clone(),
            view,
            found: true,
            filter: None,
            data,
        }
    }

    pub fn filtered(mut self, filter: &str, found: bool) -> Self {
        self.filter = Some(filter.to_string());
        self.found = found;
        self
    }
}

impl<T: Serialize> IntoResponse for Page<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Article as shown in listings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleItem {
    pub id: u64,
    pub title: String,
    pub summary: String,
    pub url: String,
    pub author_id: u64,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ArticleItem {
    pub fn new(links: &Links, article: Article) -> Self {
        Self {
            id: article.id,
            url: links.article(&article),
            title: article.title,
            summary: article.summary,
            author_id: article.author_id,
            tags: article.tags,
            created_at: article.created_at,
            updated_at: article.updated_at,
        }
    }
}

/// Characters escaped inside a single path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Percent-encode `value` for use as one path segment.
pub fn segment(value: &str) -> String {
    utf8_percent_encode(value, SEGMENT).to_string()
}

/// URL builder for one blog.
#[derive(Debug, Clone)]
pub struct Links {
    /// `<base_url><blogs_root>/<username>`
    blog: String,
}

impl Links {
    pub fn new(base_url: &str, blogs_root: &str, username: &str) -> Self {
        Self {
            blog: format!(
                "{}{}/{}",
                base_url.trim_end_matches('/'),
                blogs_root.trim_end_matches('/'),
                segment(username)
            ),
        }
    }

    pub fn blog(&self) -> String {
        self.blog.clone()
    }

    pub fn article(&self, article: &Article) -> String {
        format!("{}/{}", self.blog, article.path.trim_start_matches('/'))
    }

    /// `<blog>/<keyword>[/<rest>]`
    pub fn view(&self, keyword: &str, rest: Option<&str>) -> String {
        match rest {
            Some(rest) => format!("{}/{}/{}", self.blog, keyword, rest),
            None => format!("{}/{}", self.blog, keyword),
        }
    }
}

pub(crate) fn page_request(state: &AppState, page: usize) -> PageRequest {
    PageRequest::new(page, state.settings().site.page_size)
}
