use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{FieldMeta, Group};
use crate::error::DomainError;

/// Number of characters a post shows when rendered as a short string.
pub const POST_PREVIEW_CHARS: usize = 15;

/// Post entity - a single authored text entry, optionally filed under a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub group_id: Option<Uuid>,
}

impl Post {
    pub const TEXT_FIELD: FieldMeta = FieldMeta {
        label: "Post text",
        help_text: "Enter the text of the post",
    };

    pub const GROUP_FIELD: FieldMeta = FieldMeta {
        label: "Group",
        help_text: "Group the post will belong to",
    };

    /// Create a new post published now.
    pub fn new(author_id: Uuid, text: String, group_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            text,
            pub_date: Utc::now(),
            group_id,
        }
    }

    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }

    /// Only the author may edit a post.
    pub fn ensure_editable_by(&self, user_id: Uuid) -> Result<(), DomainError> {
        if self.is_authored_by(user_id) {
            Ok(())
        } else {
            Err(DomainError::Forbidden)
        }
    }

    /// Replace the editable fields. Author and publication date never change.
    pub fn edit(&mut self, text: String, group_id: Option<Uuid>) {
        self.text = text;
        self.group_id = group_id;
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let preview: String = self.text.chars().take(POST_PREVIEW_CHARS).collect();
        f.write_str(&preview)
    }
}

/// A post joined with what listings show next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostEntry {
    pub post: Post,
    pub author: String,
    pub group: Option<Group>,
}
