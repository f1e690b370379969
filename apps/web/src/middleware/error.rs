//! Error handling - every failure becomes a rendered page, never a bare error.

use actix_web::{HttpResponse, ResponseError, http::StatusCode, http::header::ContentType};
use askama::Template;
use quill_core::error::{DomainError, RepoError};
use quill_core::ports::AuthError;
use quill_shared::ErrorResponse;

use crate::views::ErrorPage;

/// Application-level error type, rendered as an HTML problem page.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn problem(&self) -> ErrorResponse {
        match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::Forbidden => ErrorResponse::forbidden(),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let page = ErrorPage::from(self.problem());
        match page.render() {
            Ok(html) => HttpResponse::build(self.status_code())
                .content_type(ContentType::html())
                .body(html),
            Err(e) => {
                tracing::error!("Failed to render error page: {}", e);
                HttpResponse::build(self.status_code()).body(page.title)
            }
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, key } => {
                AppError::NotFound(format!("{entity_type} {key} not found"))
            }
            DomainError::Forbidden => AppError::Forbidden,
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            RepoError::Query(msg) | RepoError::Constraint(msg) => {
                tracing::error!("Database query error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<askama::Error> for AppError {
    fn from(err: askama::Error) -> Self {
        AppError::Internal(format!("Template rendering failed: {err}"))
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;

    use super::*;

    #[actix_web::test]
    async fn test_not_found_renders_html_page() {
        let err: AppError = DomainError::not_found("Post", "abc").into();

        let response = err.error_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(response.into_body()).await.unwrap();
        let html = std::str::from_utf8(&body).unwrap();
        assert!(html.contains("Not Found"));
        assert!(html.contains("Post abc not found"));
    }

    #[actix_web::test]
    async fn test_internal_error_hides_detail() {
        let err: AppError = RepoError::Query("relation posts does not exist".into()).into();

        let response = err.error_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body()).await.unwrap();
        assert!(!std::str::from_utf8(&body).unwrap().contains("relation posts"));
    }
}
