//! Session authentication: cookie handling and identity extractors.

use std::future::{Ready, ready};

use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use actix_web::http::{StatusCode, header};
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, dev::Payload, web};
use uuid::Uuid;

use quill_core::ports::{AuthError, TokenClaims};

use crate::state::AppState;
use crate::urls;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "quill_session";

/// Signed-in user identity extractor.
///
/// Handlers that take an `Identity` are login-only: anonymous requests are
/// redirected to the login page with `next` set to the requested path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
        }
    }
}

/// Rejection for login-only pages.
#[derive(Debug, thiserror::Error)]
#[error("login required for {next}: {reason}")]
pub struct LoginRequired {
    pub next: String,
    pub reason: AuthError,
}

impl ResponseError for LoginRequired {
    fn status_code(&self) -> StatusCode {
        StatusCode::FOUND
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::Found()
            .insert_header((header::LOCATION, urls::login_with_next(&self.next)))
            .finish()
    }
}

fn identify(req: &HttpRequest) -> Result<Identity, AuthError> {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
        tracing::error!("AppState not found in app data");
        return Err(AuthError::InvalidToken(
            "Server configuration error".to_string(),
        ));
    };

    let cookie = req.cookie(SESSION_COOKIE).ok_or(AuthError::MissingAuth)?;
    let claims = state.tokens.validate_token(cookie.value())?;
    Ok(Identity::from(claims))
}

impl FromRequest for Identity {
    type Error = LoginRequired;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(identify(req).map_err(|reason| {
            let next = req
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| req.path().to_string());
            tracing::debug!(%next, %reason, "Redirecting anonymous request to login");
            LoginRequired { next, reason }
        }))
    }
}

/// Optional identity extractor - read pages work for everyone.
#[derive(Debug, Clone, Default)]
pub struct OptionalIdentity(pub Option<Identity>);

impl OptionalIdentity {
    pub fn user_id(&self) -> Option<Uuid> {
        self.0.as_ref().map(|identity| identity.user_id)
    }
}

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(OptionalIdentity(identify(req).ok())))
    }
}

/// Session cookie holding a freshly issued token.
pub fn session_cookie(token: String, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(CookieDuration::seconds(max_age_secs))
        .finish()
}

/// Cookie that makes the browser drop the session.
pub fn expired_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish();
    cookie.make_removal();
    cookie
}
