//! Request middleware.

pub mod blog_context;

pub use blog_context::resolve_blog;
