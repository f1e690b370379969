//! Template rendering helpers for handlers.

use actix_web::{HttpResponse, http::header::ContentType};
use askama::Template;

use crate::middleware::error::AppResult;

/// Render a page with `200 OK`.
///
/// A template failure becomes an `AppError::Internal`, which renders the
/// error page instead.
pub fn render<T: Template>(template: &T) -> AppResult<HttpResponse> {
    let html = template.render()?;
    Ok(HttpResponse::Ok().content_type(ContentType::html()).body(html))
}
