use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{FormErrors, required};
use crate::domain::{Group, Post};

pub const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// Post fields as submitted by the create/edit page.
///
/// `group` carries the selected group id, or an empty string for "no group".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub group: String,
}

/// A post form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedPost {
    pub text: String,
    pub group_id: Option<Uuid>,
}

impl PostForm {
    /// Pre-fill the form with an existing post's values.
    pub fn from_post(post: &Post) -> Self {
        Self {
            text: post.text.clone(),
            group: post.group_id.map(|id| id.to_string()).unwrap_or_default(),
        }
    }

    /// Validate against the groups a post may be filed under.
    pub fn clean(&self, groups: &[Group]) -> Result<CleanedPost, FormErrors> {
        let mut errors = FormErrors::new();
        let text = required(&mut errors, "text", &self.text);

        let group = self.group.trim();
        let group_id = if group.is_empty() {
            None
        } else {
            match Uuid::parse_str(group)
                .ok()
                .filter(|id| groups.iter().any(|g| g.id == *id))
            {
                Some(id) => Some(id),
                None => {
                    errors.add("group", INVALID_CHOICE);
                    None
                }
            }
        };

        errors.into_result(CleanedPost { text, group_id })
    }
}
