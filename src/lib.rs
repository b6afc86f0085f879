//! Multi-user blog server library.

pub mod blog;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod store;
pub mod views;

pub use config::BlogConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
