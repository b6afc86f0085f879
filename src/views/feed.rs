//! Atom 1.0 feed of a blog.

use atom_syndication::{
    CategoryBuilder, ContentBuilder, Entry, EntryBuilder, Feed, FeedBuilder, FixedDateTime,
    GeneratorBuilder, Link, LinkBuilder, Person, PersonBuilder, Text,
};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};

use crate::blog::BlogContext;
use crate::config::{FeedConfig, FeedOutputMode};
use crate::http::response::AppError;
use crate::http::server::AppState;
use crate::store::{Article, ArticleFilter, PageRequest};
use crate::views::{Links, ViewRequest};

pub const ATOM_CONTENT_TYPE: &str = "application/atom+xml; charset=utf-8";

pub async fn atom(state: &AppState, req: ViewRequest<'_>) -> Result<Response, AppError> {
    let ctx = req.ctx;
    let settings = state.settings();
    let articles = state
        .content
        .articles(
            ctx.blog_id(),
            &ArticleFilter::All,
            PageRequest::new(1, settings.feed.output_size),
        )
        .await?;

    let links = state.links(ctx);
    let self_href = links.view(&state.paths.atom, None);
    let feed = build_feed(ctx, &links, &self_href, &settings.feed, &articles.items);

    Ok(([(header::CONTENT_TYPE, ATOM_CONTENT_TYPE)], feed.to_string()).into_response())
}

/// Assemble the feed document from the newest articles.
pub fn build_feed(
    ctx: &BlogContext,
    links: &Links,
    self_href: &str,
    config: &FeedConfig,
    articles: &[Article],
) -> Feed {
    let blog_url = links.blog();

    let updated = articles
        .iter()
        .map(|a| a.updated_at)
        .max()
        .unwrap_or_default();

    let author: Person = PersonBuilder::default()
        .name(ctx.owner.name.clone())
        .uri(Some(blog_url.clone()))
        .build();

    let self_link: Link = LinkBuilder::default()
        .href(self_href.to_string())
        .rel("self".to_string())
        .mime_type(Some("application/atom+xml".to_string()))
        .build();

    let alternate_link: Link = LinkBuilder::default()
        .href(blog_url.clone())
        .rel("alternate".to_string())
        .build();

    let subtitle = (!ctx.blog.subtitle.is_empty()).then(|| Text::plain(ctx.blog.subtitle.clone()));

    FeedBuilder::default()
        .title(Text::plain(ctx.blog.title.clone()))
        .id(blog_url)
        .updated(fixed(updated))
        .authors(vec![author])
        .links(vec![self_link, alternate_link])
        .subtitle(subtitle)
        .generator(Some(
            GeneratorBuilder::default()
                .value("blogd")
                .version(Some(env!("CARGO_PKG_VERSION").to_string()))
                .build(),
        ))
        .entries(
            articles
                .iter()
                .map(|a| article_to_entry(a, links, config.output_mode))
                .collect::<Vec<_>>(),
        )
        .build()
}

fn article_to_entry(article: &Article, links: &Links, mode: FeedOutputMode) -> Entry {
    let href = links.article(article);

    let link: Link = LinkBuilder::default()
        .href(href.clone())
        .rel("alternate".to_string())
        .build();

    let categories = article
        .tags
        .iter()
        .map(|tag| CategoryBuilder::default().term(tag.clone()).build())
        .collect::<Vec<_>>();

    let mut entry = EntryBuilder::default();
    entry
        .title(Text::plain(article.title.clone()))
        .id(href)
        .updated(fixed(article.updated_at))
        .published(Some(fixed(article.created_at)))
        .links(vec![link])
        .categories(categories);

    match mode {
        FeedOutputMode::Abstract => {
            entry.summary(Some(Text::plain(article.summary.clone())));
        }
        FeedOutputMode::Full => {
            entry.summary(Some(Text::plain(article.summary.clone())));
            entry.content(Some(
                ContentBuilder::default()
                    .value(Some(article.content.clone()))
                    .content_type(Some("html".to_string()))
                    .build(),
            ));
        }
    }

    entry.build()
}

fn fixed(at: DateTime<Utc>) -> FixedDateTime {
    at.fixed_offset()
}
