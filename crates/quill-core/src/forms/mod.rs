//! Form validation - turns submitted fields into cleaned values or errors.
//!
//! Forms never fail with an error the caller has to propagate: invalid input
//! comes back as [`FormErrors`] so the page can be redisplayed.

mod account;
mod comment;
mod post;

use std::collections::BTreeMap;

pub use account::{Credentials, LoginForm, SignupForm};
pub use comment::CommentForm;
pub use post::{CleanedPost, INVALID_CHOICE, PostForm};

pub const REQUIRED: &str = "This field is required.";

/// Validation errors keyed by field name, plus errors about the form as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<&'static str, Vec<String>>,
    non_field: Vec<String>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_default().push(message.into());
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.non_field.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.non_field.is_empty()
    }

    pub fn field(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn non_field(&self) -> &[String] {
        &self.non_field
    }

    /// `Ok(value)` when nothing was recorded, otherwise the collected errors.
    pub fn into_result<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

/// Trimmed value, or a "required" error on `field` when blank.
pub(crate) fn required(errors: &mut FormErrors, field: &'static str, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, REQUIRED);
    }
    trimmed.to_string()
}
