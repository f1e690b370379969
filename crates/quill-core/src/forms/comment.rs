use serde::{Deserialize, Serialize};

use super::{FormErrors, required};

/// Comment fields as submitted under a post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub text: String,
}

impl CommentForm {
    /// The trimmed comment text.
    pub fn clean(&self) -> Result<String, FormErrors> {
        let mut errors = FormErrors::new();
        let text = required(&mut errors, "text", &self.text);
        errors.into_result(text)
    }
}
