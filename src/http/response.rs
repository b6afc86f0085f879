//! Error responses.
//!
//! # Responsibilities
//! - Map request failures to HTTP status codes
//! - Render a uniform JSON error body `{ code, msg }`
//!
//! # Design Decisions
//! - Unknown and disabled blogs both answer 404
//! - Data layer failures answer 500 with a generic message; details are logged

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::blog::ResolveError;
use crate::store::StoreError;

/// Failure of a single request.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found")]
    NotFound,

    #[error("{0}")]
    BadRequest(String),

    #[error("login required")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("method not allowed")]
    MethodNotAllowed { allow: &'static str },

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: u16,
    pub msg: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Resolve(ResolveError::Lookup(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Resolve(_) => StatusCode::NOT_FOUND,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::Resolve(ResolveError::Lookup(_)) | AppError::Store(_) => {
                "internal server error".to_string()
            }
            AppError::Resolve(_) => "blog not found".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(ErrorBody {
            code: status.as_u16(),
            msg: self.message(),
        });

        match self {
            AppError::MethodNotAllowed { allow } => {
                (status, [(header::ALLOW, allow)], body).into_response()
            }
            _ => (status, body).into_response(),
        }
    }
}
