//! Blog Context Middleware.
//! Resolves the username segment and attaches the blog to the request.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use percent_encoding::percent_decode_str;

use crate::blog::Viewer;
use crate::http::response::AppError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::routing::split_blog_path;

pub async fn resolve_blog(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    // 1. Extract the username segment
    let username = match split_blog_path(&state.paths.blogs_root, req.uri().path()) {
        Some((raw, _)) => match percent_decode_str(raw).decode_utf8() {
            Ok(name) => name.into_owned(),
            Err(_) => return AppError::NotFound.into_response(),
        },
        None => return AppError::NotFound.into_response(),
    };

    // 2. Viewer identity forwarded by the session layer
    let viewer = Viewer::from_session_value(
        req.headers()
            .get(&state.viewer_header)
            .and_then(|v| v.to_str().ok()),
    );

    // 3. Resolve and attach context
    match state.resolver.resolve(&username, viewer).await {
        Ok(ctx) => {
            tracing::debug!(username = %username, blog_id = ctx.blog.id, "Blog resolved");
            req.extensions_mut().insert(Arc::new(ctx));
            next.run(req).await
        }
        Err(e) => {
            tracing::info!(username = %username, reason = e.reason(), "Blog not resolved");
            metrics::record_resolve_failure(e.reason());
            AppError::from(e).into_response()
        }
    }
}
