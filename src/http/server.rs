//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, limits, request ID, security headers)
//! - Resolve the target blog before any blog route runs
//! - Dispatch route paths and hand the decision to the views
//! - Apply configuration reloads to the view settings
//! - Bind server to listener and stop on shutdown

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::{Body, Bytes},
    extract::{rejection::QueryRejection, Query, State},
    http::{header, HeaderName, HeaderValue, Method, Request, Uri},
    middleware,
    response::{IntoResponse, Response},
    routing::{any, get},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    limit::RequestBodyLimitLayer, set_header::SetResponseHeaderLayer, timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::blog::{BlogContext, BlogResolver};
use crate::config::{BlogConfig, FeedConfig, PathsConfig, SiteConfig};
use crate::http::middleware::resolve_blog;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, RequestIdExt};
use crate::http::response::AppError;
use crate::lifecycle::signals::shutdown_signal;
use crate::observability::metrics;
use crate::routing::{
    is_valid_blogs_root, split_blog_path, Dispatcher, PathTable, PathTableError, RouteDecision,
};
use crate::store::{BlogDirectory, ContentStore};
use crate::views::{self, articles, Links, ViewRequest};

/// Errors raised while building or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid path table: {0}")]
    PathTable(#[from] PathTableError),

    #[error("invalid blogs root {0:?}")]
    BlogsRoot(String),

    #[error("invalid viewer header {0:?}")]
    ViewerHeader(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Settings the views read per request; swapped on reload.
#[derive(Debug, Clone)]
pub struct ViewSettings {
    pub site: SiteConfig,
    pub feed: FeedConfig,
}

impl From<&BlogConfig> for ViewSettings {
    fn from(config: &BlogConfig) -> Self {
        Self {
            site: config.site.clone(),
            feed: config.feed.clone(),
        }
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub resolver: BlogResolver,
    pub content: Arc<dyn ContentStore>,
    pub paths: Arc<PathsConfig>,
    pub viewer_header: HeaderName,
    settings: Arc<ArcSwap<ViewSettings>>,
}

impl AppState {
    pub fn new(
        config: &BlogConfig,
        directory: Arc<dyn BlogDirectory>,
        content: Arc<dyn ContentStore>,
    ) -> Result<Self, ServerError> {
        if !is_valid_blogs_root(&config.paths.blogs_root) {
            return Err(ServerError::BlogsRoot(config.paths.blogs_root.clone()));
        }
        let table = PathTable::from_config(&config.paths)?;
        let viewer_header = HeaderName::from_bytes(config.session.viewer_header.as_bytes())
            .map_err(|_| ServerError::ViewerHeader(config.session.viewer_header.clone()))?;

        Ok(Self {
            dispatcher: Arc::new(Dispatcher::new(&table)),
            resolver: BlogResolver::new(directory),
            content,
            paths: Arc::new(config.paths.clone()),
            viewer_header,
            settings: Arc::new(ArcSwap::from_pointee(ViewSettings::from(config))),
        })
    }

    /// Current view settings.
    pub fn settings(&self) -> Arc<ViewSettings> {
        self.settings.load_full()
    }

    /// Apply a reloaded configuration.
    ///
    /// Only the view settings change; the path table stays as compiled.
    pub fn apply_config(&self, config: &BlogConfig) {
        if config.paths != *self.paths {
            tracing::warn!("Path settings changed on reload; restart to apply them");
        }
        self.settings.store(Arc::new(ViewSettings::from(config)));
        tracing::info!(
            page_size = config.site.page_size,
            feed_size = config.feed.output_size,
            "View settings reloaded"
        );
    }

    pub fn links(&self, ctx: &BlogContext) -> Links {
        Links::new(
            &self.settings().site.base_url,
            &self.paths.blogs_root,
            &ctx.owner.name,
        )
    }
}

/// HTTP server for the blogs.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and data layer.
    pub fn new(
        config: BlogConfig,
        directory: Arc<dyn BlogDirectory>,
        content: Arc<dyn ContentStore>,
    ) -> Result<Self, ServerError> {
        let state = AppState::new(&config, directory, content)?;
        let router = Self::build_router(&config, state.clone());
        Ok(Self { router, state })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &BlogConfig, state: AppState) -> Router {
        let root = config.paths.blogs_root.trim_end_matches('/');

        let blogs = Router::new()
            .route(&format!("{root}/{{username}}"), get(blog_home))
            .route(&format!("{root}/{{username}}/"), get(blog_home))
            .route(&format!("{root}/{{username}}/{{*path}}"), any(blog_route))
            .route_layer(middleware::from_fn_with_state(state.clone(), resolve_blog));

        let mut router = Router::new()
            .route("/health", get(health))
            .merge(blogs)
            .fallback(not_found)
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

        if config.security.enable_headers {
            router = router
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::X_FRAME_OPTIONS,
                    HeaderValue::from_static("SAMEORIGIN"),
                ));
        }

        router
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %req.method(),
                    uri = %req.uri(),
                    request_id = %req.request_id_str().unwrap_or("unknown"),
                )
            }))
            .layer(set_request_id_layer())
    }

    /// A clone of the fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Stops on Ctrl+C, SIGTERM, or a message on `shutdown`.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<BlogConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let state = self.state.clone();
        tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                state.apply_config(&config);
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown.recv() => tracing::info!("Shutdown requested"),
                    _ = shutdown_signal() => {}
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// 1-based page number.
    p: Option<String>,
}

impl PageQuery {
    pub fn page(&self) -> usize {
        self.p
            .as_deref()
            .and_then(|p| p.parse::<usize>().ok())
            .filter(|p| *p > 0)
            .unwrap_or(1)
    }

    /// Page of an extracted query; a query that fails to parse means page 1.
    pub fn page_or_first(query: Result<Query<Self>, QueryRejection>) -> usize {
        match query {
            Ok(Query(query)) => query.page(),
            Err(rejection) => {
                tracing::debug!(error = %rejection, "Ignoring malformed query");
                1
            }
        }
    }
}

/// `GET /<root>/<username>`: the blog's article listing.
async fn blog_home(
    State(state): State<AppState>,
    Extension(ctx): Extension<Arc<BlogContext>>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let start = Instant::now();
    let result = articles::home(&state, &ctx, PageQuery::page_or_first(query)).await;
    metrics::record_dispatch(articles::HOME, start);
    result
}

/// `ANY /<root>/<username>/<rest>`: dispatch `<rest>` to a view.
async fn blog_route(
    State(state): State<AppState>,
    Extension(ctx): Extension<Arc<BlogContext>>,
    method: Method,
    uri: Uri,
    query: Result<Query<PageQuery>, QueryRejection>,
    body: Bytes,
) -> Result<Response, AppError> {
    let start = Instant::now();
    let decision = route_decision(&state, uri.path());

    tracing::debug!(
        blog_id = ctx.blog.id,
        view = %decision.kind,
        param = %decision.param,
        "Dispatched"
    );

    let result = views::render(
        &state,
        ViewRequest {
            ctx: &ctx,
            decision: &decision,
            method: &method,
            page: PageQuery::page_or_first(query),
            body: &body,
        },
    )
    .await;

    metrics::record_dispatch(decision.kind.as_str(), start);
    result
}

/// Extract the still-encoded route path of `path` and dispatch it.
fn route_decision(state: &AppState, path: &str) -> RouteDecision {
    match split_blog_path(&state.paths.blogs_root, path) {
        Some((_, raw)) => state.dispatcher.dispatch_encoded(raw),
        None => RouteDecision::unhandled(),
    }
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn not_found() -> AppError {
    AppError::NotFound
}
