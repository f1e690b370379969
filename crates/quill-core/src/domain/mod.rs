//! Domain entities - the core business objects.

mod comment;
mod field;
mod group;
mod post;
mod user;

pub use comment::{Comment, CommentEntry};
pub use field::FieldMeta;
pub use group::Group;
pub use post::{POST_PREVIEW_CHARS, Post, PostEntry};
pub use user::User;
