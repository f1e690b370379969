//! HTTP handlers and route configuration.

mod auth;
mod health;
mod posts;

#[cfg(test)]
mod tests;

use actix_web::http::header;
use actix_web::{HttpResponse, Scope, web};

/// Configure the blog and health routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health/", web::get().to(health::health_check))
        .route("/", web::get().to(posts::index))
        .route("/group/{slug}/", web::get().to(posts::group_list))
        .route("/profile/{username}/", web::get().to(posts::profile))
        .service(
            web::resource("/create/")
                .route(web::get().to(posts::post_create_form))
                .route(web::post().to(posts::post_create)),
        )
        .route("/posts/{post_id}/", web::get().to(posts::post_detail))
        .service(
            web::resource("/posts/{post_id}/edit/")
                .route(web::get().to(posts::post_edit_form))
                .route(web::post().to(posts::post_edit)),
        )
        .service(
            web::resource("/posts/{post_id}/comment/")
                .route(web::get().to(posts::comment_redirect))
                .route(web::post().to(posts::add_comment)),
        );
}

/// Account pages, mounted at `/auth`. Callers wrap it with the rate limiter.
pub fn auth_scope() -> Scope {
    web::scope("/auth")
        .service(
            web::resource("/signup/")
                .route(web::get().to(auth::signup_form))
                .route(web::post().to(auth::signup)),
        )
        .service(
            web::resource("/login/")
                .route(web::get().to(auth::login_form))
                .route(web::post().to(auth::login)),
        )
        .service(
            web::resource("/logout/")
                .route(web::get().to(auth::logout))
                .route(web::post().to(auth::logout)),
        )
}

/// 302 to `location`.
pub(crate) fn redirect(location: String) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}
