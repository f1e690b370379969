use serde::{Deserialize, Serialize};

use super::{FormErrors, REQUIRED, required};
use crate::domain::User;

/// Minimum password length accepted at signup.
pub const PASSWORD_MIN_CHARS: usize = 8;

/// Username and password that passed form validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Login page fields. `next` is where to go after a successful login.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

impl LoginForm {
    pub fn clean(&self) -> Result<Credentials, FormErrors> {
        let mut errors = FormErrors::new();
        let username = required(&mut errors, "username", &self.username);
        if self.password.is_empty() {
            errors.add("password", REQUIRED);
        }
        errors.into_result(Credentials {
            username,
            password: self.password.clone(),
        })
    }
}

/// Signup page fields.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

impl SignupForm {
    /// Field-level checks. Username uniqueness is checked by the caller.
    pub fn clean(&self) -> Result<Credentials, FormErrors> {
        let mut errors = FormErrors::new();
        let username = required(&mut errors, "username", &self.username);
        if !username.is_empty() && !User::is_valid_username(&username) {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }

        if self.password1.is_empty() {
            errors.add("password1", REQUIRED);
        } else if self.password1.chars().count() < PASSWORD_MIN_CHARS {
            errors.add(
                "password1",
                format!(
                    "This password is too short. It must contain at least {PASSWORD_MIN_CHARS} characters."
                ),
            );
        }
        if self.password2.is_empty() {
            errors.add("password2", REQUIRED);
        } else if self.password1 != self.password2 {
            errors.add("password2", "The two password fields didn't match.");
        }

        errors.into_result(Credentials {
            username,
            password: self.password1.clone(),
        })
    }
}
