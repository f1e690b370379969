use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::FieldMeta;

/// Comment entity - a reply attached to exactly one post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub pub_date: DateTime<Utc>,
}

impl Comment {
    pub const TEXT_FIELD: FieldMeta = FieldMeta {
        label: "Comment text",
        help_text: "Text of the new comment",
    };

    /// Create a new comment published now.
    pub fn new(post_id: Uuid, author_id: Uuid, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id,
            author_id,
            text,
            pub_date: Utc::now(),
        }
    }
}

/// A comment joined with its author's username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentEntry {
    pub comment: Comment,
    pub author: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_field_metadata() {
        assert_eq!(Comment::TEXT_FIELD.label, "Comment text");
        assert_eq!(Comment::TEXT_FIELD.help_text, "Text of the new comment");
    }
}
