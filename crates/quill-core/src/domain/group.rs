use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Maximum group title length.
pub const GROUP_TITLE_MAX_CHARS: usize = 200;

/// Group entity - a topical category posts can be filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl Group {
    /// Create a new group with a generated ID.
    pub fn new(title: String, slug: String, description: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            slug,
            description,
        }
    }

    /// Check the fields a management action supplies before the group is stored.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::Validation("Group title is required".into()));
        }
        if self.title.chars().count() > GROUP_TITLE_MAX_CHARS {
            return Err(DomainError::Validation(format!(
                "Group title must be at most {GROUP_TITLE_MAX_CHARS} characters"
            )));
        }
        if !Self::is_valid_slug(&self.slug) {
            return Err(DomainError::Validation(format!(
                "Invalid slug '{}': use letters, numbers, underscores or hyphens",
                self.slug
            )));
        }
        Ok(())
    }

    /// Slugs are non-empty ASCII `[A-Za-z0-9_-]+`.
    pub fn is_valid_slug(slug: &str) -> bool {
        !slug.is_empty()
            && slug
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}
