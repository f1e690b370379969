//! Account handlers: signup, login and logout.

use actix_web::{HttpResponse, web};
use serde::Deserialize;

use quill_core::RepoError;
use quill_core::domain::User;
use quill_core::forms::{FormErrors, LoginForm, SignupForm};
use quill_core::ports::AuthError;

use super::redirect;
use crate::middleware::auth::{OptionalIdentity, expired_session_cookie, session_cookie};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use crate::urls;
use crate::views::{LoggedOutPage, LoginPage, Nav, SignupPage, render};

const DUPLICATE_USERNAME: &str = "A user with that username already exists.";
const BAD_CREDENTIALS: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// GET /auth/signup/
pub async fn signup_form(identity: OptionalIdentity) -> AppResult<HttpResponse> {
    render(&SignupPage::new(
        Nav::new(identity.0.as_ref()),
        &SignupForm::default(),
        &FormErrors::new(),
    ))
}

/// POST /auth/signup/
pub async fn signup(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    form: web::Form<SignupForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let nav = Nav::new(identity.0.as_ref());

    let credentials = match form.clean() {
        Ok(credentials) => credentials,
        Err(errors) => return render(&SignupPage::new(nav, &form, &errors)),
    };

    let duplicate = |nav: Nav| {
        let mut errors = FormErrors::new();
        errors.add("username", DUPLICATE_USERNAME);
        render(&SignupPage::new(nav, &form, &errors))
    };

    if state
        .repos
        .users
        .find_by_username(&credentials.username)
        .await?
        .is_some()
    {
        return duplicate(nav);
    }

    let password_hash = state.passwords.hash(&credentials.password)?;
    match state
        .repos
        .users
        .create(User::new(credentials.username, password_hash))
        .await
    {
        Ok(user) => {
            tracing::info!(user_id = %user.id, username = %user.username, "User signed up");
            Ok(redirect(urls::index()))
        }
        // Lost a race with a concurrent signup for the same name.
        Err(RepoError::Constraint(_)) => duplicate(nav),
        Err(e) => Err(e.into()),
    }
}

/// GET /auth/login/
pub async fn login_form(
    identity: OptionalIdentity,
    query: web::Query<NextQuery>,
) -> AppResult<HttpResponse> {
    let form = LoginForm {
        next: query.into_inner().next,
        ..LoginForm::default()
    };
    render(&LoginPage::new(
        Nav::new(identity.0.as_ref()),
        &form,
        &FormErrors::new(),
    ))
}

/// POST /auth/login/
pub async fn login(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    form: web::Form<LoginForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let nav = Nav::new(identity.0.as_ref());

    let credentials = match form.clean() {
        Ok(credentials) => credentials,
        Err(errors) => return render(&LoginPage::new(nav, &form, &errors)),
    };

    let user = match authenticate(&state, &credentials.username, &credentials.password).await? {
        Ok(user) => user,
        Err(e) => {
            tracing::info!(username = %credentials.username, error = %e, "Failed login attempt");
            let mut errors = FormErrors::new();
            errors.add_non_field(BAD_CREDENTIALS);
            return render(&LoginPage::new(nav, &form, &errors));
        }
    };

    let token = state.tokens.generate_token(user.id, &user.username)?;
    let cookie = session_cookie(
        token,
        state.tokens.expiration_seconds(),
        state.session_cookie_secure,
    );
    tracing::info!(user_id = %user.id, "User logged in");

    let mut response = redirect(urls::safe_next(form.next.as_deref()));
    response
        .add_cookie(&cookie)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(response)
}

/// Unknown usernames and wrong passwords are reported the same way.
async fn authenticate(
    state: &AppState,
    username: &str,
    password: &str,
) -> AppResult<Result<User, AuthError>> {
    let user = state.repos.users.find_by_username(username).await?;
    match user {
        Some(user) if state.passwords.verify(password, &user.password_hash)? => Ok(Ok(user)),
        _ => Ok(Err(AuthError::InvalidCredentials)),
    }
}

/// GET|POST /auth/logout/
pub async fn logout(identity: OptionalIdentity) -> AppResult<HttpResponse> {
    if let Some(identity) = identity.0 {
        tracing::info!(user_id = %identity.user_id, "User logged out");
    }

    let mut response = render(&LoggedOutPage::new())?;
    response
        .add_cookie(&expired_session_cookie())
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(response)
}
