//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layers)
//!     → request.rs (request ID)
//!     → middleware/blog_context.rs (resolve blog, attach BlogContext)
//!     → server.rs blog_route (decode route path, dispatch)
//!     → views (render decision)
//!     → response.rs (errors → status + JSON body)
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestIdExt, X_REQUEST_ID};
pub use response::AppError;
pub use server::{AppState, HttpServer, ServerError};
