//! Account pages.

use askama::Template;

use quill_core::forms::{FormErrors, LoginForm, SignupForm};

use super::{FieldView, Nav};
use crate::urls;

#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginPage {
    pub nav: Nav,
    pub action_url: String,
    pub next: String,
    pub username: FieldView,
    pub password: FieldView,
    pub non_field_errors: Vec<String>,
}

impl LoginPage {
    pub fn new(nav: Nav, form: &LoginForm, errors: &FormErrors) -> Self {
        Self {
            nav,
            action_url: urls::login(),
            next: form.next.clone().unwrap_or_default(),
            username: FieldView::new("username", "Username", form.username.as_str())
                .errors_from(errors),
            password: FieldView::new("password", "Password", "").errors_from(errors),
            non_field_errors: errors.non_field().to_vec(),
        }
    }
}

#[derive(Template)]
#[template(path = "auth/signup.html")]
pub struct SignupPage {
    pub nav: Nav,
    pub action_url: String,
    pub username: FieldView,
    pub password1: FieldView,
    pub password2: FieldView,
}

impl SignupPage {
    pub fn new(nav: Nav, form: &SignupForm, errors: &FormErrors) -> Self {
        Self {
            nav,
            action_url: urls::signup(),
            username: FieldView::new("username", "Username", form.username.as_str())
                .help("Required. 150 characters or fewer. Letters, digits and @/./+/-/_ only.")
                .errors_from(errors),
            password1: FieldView::new("password1", "Password", "")
                .help("Your password must contain at least 8 characters.")
                .errors_from(errors),
            password2: FieldView::new("password2", "Password confirmation", "")
                .help("Enter the same password as before, for verification.")
                .errors_from(errors),
        }
    }
}

#[derive(Template)]
#[template(path = "auth/logged_out.html")]
pub struct LoggedOutPage {
    pub nav: Nav,
}

impl LoggedOutPage {
    pub fn new() -> Self {
        Self {
            nav: Nav::anonymous(),
        }
    }
}
