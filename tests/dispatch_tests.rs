//! End-to-end tests of blog resolution, path dispatch and the views,
//! driven through the fully layered router.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use blogd::config::BlogConfig;
use blogd::http::{HttpServer, X_REQUEST_ID};
use blogd::store::Blog;
use metrics_exporter_prometheus::PrometheusBuilder;

mod common;

use common::{app, app_with, body_bytes, body_json, broken_app, get, send, VIEWER_HEADER};

fn post_comment(uri: &str, viewer: Option<&str>, body: &str) -> Request<Body> {
    let mut req = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(viewer) = viewer {
        req = req.header(VIEWER_HEADER, viewer);
    }
    req.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn test_blog_home_lists_articles() {
    let res = get(app(), "/blogs/alice").await;
    assert_eq!(res.status(), StatusCode::OK);

    let page = body_json(res).await;
    assert_eq!(page["view"], "home");
    assert_eq!(page["blog"]["title"], "Alice writes");
    assert_eq!(page["blog"]["url"], "http://localhost:8080/blogs/alice");
    assert_eq!(page["viewer"]["kind"], "anonymous");
    assert_eq!(page["data"]["total"], 3);
    assert_eq!(page["data"]["items"][0]["id"], 102);
    assert_eq!(
        page["data"]["items"][0]["url"],
        "http://localhost:8080/blogs/alice/posts/102"
    );
}

#[tokio::test]
async fn test_category_articles_end_to_end() {
    let res = get(app(), "/blogs/alice/categories/tech").await;
    assert_eq!(res.status(), StatusCode::OK);

    let page = body_json(res).await;
    assert_eq!(page["view"], "category_articles");
    assert_eq!(page["filter"], "tech");
    assert_eq!(page["found"], true);
    // tech collects the rust-tagged articles
    assert_eq!(page["data"]["total"], 2);
    assert_eq!(page["data"]["items"][0]["id"], 101);
    assert_eq!(page["data"]["items"][1]["id"], 100);
}

#[tokio::test]
async fn test_exact_listing_views() {
    let page = body_json(get(app(), "/blogs/alice/archives").await).await;
    assert_eq!(page["view"], "archives");
    assert_eq!(page["data"][0]["year"], 2017);
    assert_eq!(page["data"][0]["month"], 12);
    assert_eq!(page["data"][0]["articleCount"], 2);
    assert_eq!(
        page["data"][0]["url"],
        "http://localhost:8080/blogs/alice/archives/2017/12"
    );

    let page = body_json(get(app(), "/blogs/alice/authors").await).await;
    assert_eq!(page["view"], "authors");
    assert_eq!(page["data"][0]["name"], "alice");
    assert_eq!(page["data"][0]["articleCount"], 2);
    assert_eq!(page["data"][1]["name"], "bob");

    let page = body_json(get(app(), "/blogs/alice/categories").await).await;
    assert_eq!(page["view"], "categories");
    assert_eq!(page["data"][0]["title"], "Tech");
    assert_eq!(
        page["data"][0]["url"],
        "http://localhost:8080/blogs/alice/categories/tech"
    );

    let page = body_json(get(app(), "/blogs/alice/tags").await).await;
    assert_eq!(page["view"], "tags");
    let tags = page["data"].as_array().unwrap();
    assert_eq!(tags.len(), 3);
    let spaced = tags.iter().find(|t| t["title"] == "hello world").unwrap();
    assert_eq!(
        spaced["url"],
        "http://localhost:8080/blogs/alice/tags/hello%20world"
    );
}

#[tokio::test]
async fn test_activities_merge_articles_and_comments() {
    let page = body_json(get(app(), "/blogs/alice/activities").await).await;
    assert_eq!(page["view"], "activities");

    let items = page["data"].as_array().unwrap();
    assert_eq!(items.len(), 5);
    assert_eq!(items[0]["type"], "comment");
    assert_eq!(items[0]["id"], 8);
    assert_eq!(items[2]["type"], "article");
    assert_eq!(items[2]["id"], 102);
}

#[tokio::test]
async fn test_archive_articles() {
    let page = body_json(get(app(), "/blogs/alice/archives/2017/12").await).await;
    assert_eq!(page["view"], "archive_articles");
    assert_eq!(page["filter"], "2017/12");
    assert_eq!(page["data"]["total"], 2);

    let page = body_json(get(app(), "/blogs/alice/archives/2017").await).await;
    assert_eq!(page["data"]["total"], 3);

    let res = get(app(), "/blogs/alice/archives/latest").await;
    assert_eq!(res.status(), StatusCode::OK);
    let page = body_json(res).await;
    assert_eq!(page["found"], false);
    assert_eq!(page["data"]["total"], 0);
}

#[tokio::test]
async fn test_author_articles() {
    let page = body_json(get(app(), "/blogs/alice/authors/bob").await).await;
    assert_eq!(page["view"], "author_articles");
    assert_eq!(page["found"], true);
    assert_eq!(page["data"]["total"], 1);
    assert_eq!(page["data"]["items"][0]["id"], 101);

    let page = body_json(get(app(), "/blogs/alice/authors/carol").await).await;
    assert_eq!(page["found"], false);
    assert_eq!(page["data"]["items"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_tag_articles_decodes_param() {
    let page = body_json(get(app(), "/blogs/alice/tags/hello%20world").await).await;
    assert_eq!(page["view"], "tag_articles");
    assert_eq!(page["filter"], "hello world");
    assert_eq!(page["data"]["total"], 1);
    assert_eq!(page["data"]["items"][0]["id"], 102);

    let page = body_json(get(app(), "/blogs/alice/tags/cobol").await).await;
    assert_eq!(page["found"], false);
}

#[tokio::test]
async fn test_comment_replies() {
    for uri in ["/blogs/alice/comments/7", "/blogs/alice/comments/7/replies"] {
        let res = get(app(), uri).await;
        assert_eq!(res.status(), StatusCode::OK);
        let page = body_json(res).await;
        assert_eq!(page["view"], "comment_replies");
        assert_eq!(page["found"], true);
        assert_eq!(page["data"][0]["id"], 8);
        assert_eq!(page["data"][0]["parentId"], 7);
    }

    let page = body_json(get(app(), "/blogs/alice/comments/99").await).await;
    assert_eq!(page["found"], false);
    assert_eq!(page["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_atom_feed() {
    let res = get(app(), "/blogs/alice/atom").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()[header::CONTENT_TYPE],
        "application/atom+xml; charset=utf-8"
    );

    let xml = String::from_utf8(body_bytes(res).await).unwrap();
    assert!(xml.contains("<feed"));
    assert!(xml.contains("Alice writes"));
    assert!(xml.contains("http://localhost:8080/blogs/alice/posts/102"));
}

#[tokio::test]
async fn test_pagination() {
    let mut config = BlogConfig::default();
    config.site.page_size = 2;

    let page = body_json(get(app_with(config.clone()), "/blogs/alice?p=2").await).await;
    assert_eq!(page["data"]["page"], 2);
    assert_eq!(page["data"]["pageCount"], 2);
    assert_eq!(page["data"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(page["data"]["items"][0]["id"], 100);

    // unparseable page numbers fall back to the first page
    let page = body_json(get(app_with(config), "/blogs/alice/tags/rust?p=abc").await).await;
    assert_eq!(page["data"]["page"], 1);
}

#[tokio::test]
async fn test_unhandled_paths_are_not_found() {
    for uri in [
        "/blogs/alice/unknown",
        "/blogs/alice/tagsfoo",
        "/blogs/alice/tags/",
        "/blogs/alice/atom/extra",
        "/blogs/alice/activities/recent",
        "/blogs/alice/x/tags/rust",
        "/blogs/alice/tags/%FF",
    ] {
        let res = get(app(), uri).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{uri}");
        let body = body_json(res).await;
        assert_eq!(body["code"], 404);
    }
}

#[tokio::test]
async fn test_unknown_and_disabled_blogs() {
    for uri in ["/blogs/carol", "/blogs/carol/tags", "/blogs/dave/tags", "/blogs/bob"] {
        let res = get(app(), uri).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{uri}");
        let body = body_json(res).await;
        assert_eq!(body["msg"], "blog not found");
    }
}

#[tokio::test]
async fn test_directory_failure_is_internal_error() {
    let res = get(broken_app(), "/blogs/alice/tags").await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(res).await;
    assert_eq!(body["code"], 500);
    assert_eq!(body["msg"], "internal server error");
}

#[tokio::test]
async fn test_method_policy() {
    let req = Request::post("/blogs/alice/tags").body(Body::empty()).unwrap();
    let res = send(app(), req).await;
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.headers()[header::ALLOW], "GET, HEAD");

    let res = get(app(), "/blogs/alice/comments").await;
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.headers()[header::ALLOW], "POST");
}

#[tokio::test]
async fn test_submit_comment() {
    let body = r#"{"articleId": 100, "content": "  first!  "}"#;
    let res = send(app(), post_comment("/blogs/alice/comments", Some("bob"), body)).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let comment = body_json(res).await;
    assert_eq!(comment["id"], 9);
    assert_eq!(comment["author"], "bob");
    assert_eq!(comment["content"], "first!");
    assert_eq!(comment["articleId"], 100);
}

#[tokio::test]
async fn test_submit_reply_then_list_it() {
    let store = Arc::new(common::seeded_store());
    let router = HttpServer::new(BlogConfig::default(), store.clone(), store)
        .unwrap()
        .router();

    let body = r#"{"articleId": 102, "content": "agreed", "parentId": 7}"#;
    let res = send(
        router.clone(),
        post_comment("/blogs/alice/comments", Some("carol"), body),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let page = body_json(get(router, "/blogs/alice/comments/7/replies").await).await;
    let replies = page["data"].as_array().unwrap();
    assert_eq!(replies.len(), 2);
    assert_eq!(replies[1]["author"], "carol");
}

#[tokio::test]
async fn test_submit_comment_rejections() {
    let ok = r#"{"articleId": 100, "content": "hi"}"#;

    let res = send(app(), post_comment("/blogs/alice/comments", None, ok)).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let cases = [
        (r#"{"articleId": 100, "content": "   "}"#, StatusCode::BAD_REQUEST),
        (r#"not json"#, StatusCode::BAD_REQUEST),
        (r#"{"articleId": 999, "content": "hi"}"#, StatusCode::NOT_FOUND),
        (
            r#"{"articleId": 100, "content": "hi", "parentId": 7}"#,
            StatusCode::BAD_REQUEST,
        ),
    ];
    for (body, status) in cases {
        let res = send(app(), post_comment("/blogs/alice/comments", Some("bob"), body)).await;
        assert_eq!(res.status(), status, "{body}");
    }

    let long = format!(r#"{{"articleId": 100, "content": "{}"}}"#, "x".repeat(2001));
    let res = send(app(), post_comment("/blogs/alice/comments", Some("bob"), &long)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_comments_closed() {
    let store = Arc::new(common::seeded_store());
    store.insert_blog(Blog {
        id: 10,
        owner_id: 1,
        title: "Alice writes".into(),
        subtitle: String::new(),
        enabled: true,
        commentable: false,
    });
    let router = HttpServer::new(BlogConfig::default(), store.clone(), store)
        .unwrap()
        .router();

    let body = r#"{"articleId": 100, "content": "hi"}"#;
    let res = send(router, post_comment("/blogs/alice/comments", Some("bob"), body)).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_viewer_identity_reaches_views() {
    let req = Request::get("/blogs/alice/tags")
        .header(VIEWER_HEADER, "bob")
        .body(Body::empty())
        .unwrap();
    let page = body_json(send(app(), req).await).await;
    assert_eq!(page["viewer"]["kind"], "user");
    assert_eq!(page["viewer"]["name"], "bob");
}

#[tokio::test]
async fn test_renamed_keywords() {
    let mut config = BlogConfig::default();
    config.paths.tags = "labels".into();
    config.paths.blogs_root = "/u".into();

    let page = body_json(get(app_with(config.clone()), "/u/alice/labels/rust").await).await;
    assert_eq!(page["view"], "tag_articles");
    assert_eq!(page["data"]["total"], 2);

    let res = get(app_with(config.clone()), "/u/alice/tags/rust").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = get(app_with(config), "/blogs/alice").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_request_id_and_security_headers() {
    let res = get(app(), "/blogs/alice").await;
    let id = res.headers()[X_REQUEST_ID].to_str().unwrap();
    assert_eq!(id.len(), 36);
    assert_eq!(res.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");

    let req = Request::get("/health")
        .header(X_REQUEST_ID, "upstream-1")
        .body(Body::empty())
        .unwrap();
    let res = send(app(), req).await;
    assert_eq!(res.headers()[X_REQUEST_ID], "upstream-1");
}

#[tokio::test]
async fn test_health_and_fallback() {
    let res = get(app(), "/health").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["status"], "ok");

    let res = get(app(), "/nowhere").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(res).await["code"], 404);
}

#[tokio::test]
async fn test_malformed_page_query_falls_back_to_first_page() {
    for uri in [
        "/blogs/alice/tags/rust?p=1&p=2",
        "/blogs/alice?p=2&p=3",
        "/blogs/alice/tags/rust?p=%FF",
    ] {
        let res = get(app(), uri).await;
        assert_eq!(res.status(), StatusCode::OK, "{uri}");
        let page = body_json(res).await;
        assert_eq!(page["data"]["page"], 1, "{uri}");
    }
}

#[tokio::test]
async fn test_encoded_separator_does_not_split_keyword() {
    let res = get(app(), "/blogs/alice/tags%2Frust").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(res).await["code"], 404);

    let res = get(app(), "/blogs/alice/authors/b%6Fb").await;
    assert_eq!(res.status(), StatusCode::OK);
    let page = body_json(res).await;
    assert_eq!(page["filter"], "bob");
    assert_eq!(page["found"], true);
}

#[tokio::test]
async fn test_dispatch_metrics_cover_home_and_views() {
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();
    let _guard = metrics::set_default_local_recorder(&recorder);

    assert_eq!(get(app(), "/blogs/alice").await.status(), StatusCode::OK);
    assert_eq!(get(app(), "/blogs/alice/tags").await.status(), StatusCode::OK);
    assert_eq!(get(app(), "/blogs/alice/nope").await.status(), StatusCode::NOT_FOUND);

    let rendered = handle.render();
    assert!(rendered.contains(r#"blog_dispatch_total{view="home"} 1"#), "{rendered}");
    assert!(rendered.contains(r#"blog_dispatch_total{view="tags"} 1"#), "{rendered}");
    assert!(rendered.contains("blog_unhandled_paths_total 1"), "{rendered}");
}
