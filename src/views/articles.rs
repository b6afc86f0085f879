//! Article listings: the blog home page and the filtered views.

use axum::response::{IntoResponse, Response};

use crate::blog::BlogContext;
use crate::http::response::AppError;
use crate::http::server::AppState;
use crate::routing::ViewKind;
use crate::store::{ArticleFilter, Paged, Period};
use crate::views::{page_request, ArticleItem, Page, ViewRequest};

/// View label of the blog home page.
pub const HOME: &str = "home";

/// Paged articles as returned to clients.
type ArticlePage = Paged<ArticleItem>;

async fn list(
    state: &AppState,
    ctx: &BlogContext,
    filter: &ArticleFilter,
    page: usize,
) -> Result<ArticlePage, AppError> {
    let links = state.links(ctx);
    let paged = state
        .content
        .articles(ctx.blog_id(), filter, page_request(state, page))
        .await?;

    Ok(Paged {
        items: paged
            .items
            .into_iter()
            .map(|a| ArticleItem::new(&links, a))
            .collect(),
        page: paged.page,
        size: paged.size,
        total: paged.total,
        page_count: paged.page_count,
    })
}

fn empty(state: &AppState, page: usize) -> ArticlePage {
    Paged::empty(page_request(state, page))
}

/// Blog home: every article, newest first.
pub async fn home(state: &AppState, ctx: &BlogContext, page: usize) -> Result<Response, AppError> {
    let data = list(state, ctx, &ArticleFilter::All, page).await?;
    Ok(Page::labeled(state, ctx, HOME, data).into_response())
}

/// Parse `YYYY`, `YYYY/M` or `YYYY/MM`.
pub fn parse_period(param: &str) -> Option<Period> {
    let mut parts = param.trim_end_matches('/').split('/');
    let year: i32 = parts.next()?.parse().ok()?;
    if !(1..=9999).contains(&year) {
        return None;
    }
    let month = match parts.next() {
        Some(m) => {
            let m: u32 = m.parse().ok()?;
            if !(1..=12).contains(&m) {
                return None;
            }
            Some(m)
        }
        None => None,
    };
    if parts.next().is_some() {
        return None;
    }
    Some(Period { year, month })
}

pub async fn by_archive(
    state: &AppState,
    req: ViewRequest<'_>,
    param: &str,
) -> Result<Response, AppError> {
    let kind = ViewKind::ArchiveArticles;
    let data = match parse_period(param) {
        Some(period) => list(state, req.ctx, &ArticleFilter::Period(period), req.page).await?,
        None => {
            tracing::debug!(param = %param, "Malformed archive period");
            return Ok(Page::new(state, req.ctx, kind, empty(state, req.page))
                .filtered(param, false)
                .into_response());
        }
    };
    let found = data.total > 0;
    Ok(Page::new(state, req.ctx, kind, data)
        .filtered(param, found)
        .into_response())
}

pub async fn by_author(
    state: &AppState,
    req: ViewRequest<'_>,
    param: &str,
) -> Result<Response, AppError> {
    let kind = ViewKind::AuthorArticles;
    let Some(author) = state.content.author_by_name(req.ctx.blog_id(), param).await? else {
        return Ok(Page::new(state, req.ctx, kind, empty(state, req.page))
            .filtered(param, false)
            .into_response());
    };

    let data = list(state, req.ctx, &ArticleFilter::Author(author.id), req.page).await?;
    Ok(Page::new(state, req.ctx, kind, data)
        .filtered(param, true)
        .into_response())
}

pub async fn by_category(
    state: &AppState,
    req: ViewRequest<'_>,
    param: &str,
) -> Result<Response, AppError> {
    let kind = ViewKind::CategoryArticles;
    let Some(category) = state.content.category_by_path(req.ctx.blog_id(), param).await? else {
        return Ok(Page::new(state, req.ctx, kind, empty(state, req.page))
            .filtered(param, false)
            .into_response());
    };

    let data = list(state, req.ctx, &ArticleFilter::AnyTag(category.tags), req.page).await?;
    Ok(Page::new(state, req.ctx, kind, data)
        .filtered(param, true)
        .into_response())
}

pub async fn by_tag(
    state: &AppState,
    req: ViewRequest<'_>,
    param: &str,
) -> Result<Response, AppError> {
    let filter = ArticleFilter::AnyTag(vec![param.to_string()]);
    let data = list(state, req.ctx, &filter, req.page).await?;
    let found = data.total > 0;
    Ok(Page::new(state, req.ctx, ViewKind::TagArticles, data)
        .filtered(param, found)
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_period() {
        assert_eq!(parse_period("2017/12"), Some(Period { year: 2017, month: Some(12) }));
        assert_eq!(parse_period("2017/1"), Some(Period { year: 2017, month: Some(1) }));
        assert_eq!(parse_period("2017/03/"), Some(Period { year: 2017, month: Some(3) }));
        assert_eq!(parse_period("2017"), Some(Period { year: 2017, month: None }));
    }

    #[test]
    fn test_parse_period_rejects_garbage() {
        assert_eq!(parse_period("2017/13"), None);
        assert_eq!(parse_period("2017/0"), None);
        assert_eq!(parse_period("latest"), None);
        assert_eq!(parse_period("2017/12/25"), None);
        assert_eq!(parse_period(""), None);
    }
}
