use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Comment, CommentEntry, Group, Post, PostEntry, User};
use crate::error::RepoError;
use crate::pagination::{Page, PageRequest};

/// Generic repository trait defining the standard persistence operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity.
    async fn create(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity. Fails with `RepoError::NotFound` if it is gone.
    async fn update(&self, entity: T) -> Result<T, RepoError>;
}

#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

#[async_trait]
pub trait GroupRepository: BaseRepository<Group, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError>;

    /// Every group, ordered by title.
    async fn list_all(&self) -> Result<Vec<Group>, RepoError>;
}

/// Which posts a listing shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Group(Uuid),
    Author(Uuid),
}

/// Post repository. Listings are newest first.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// A post with its author and group resolved.
    async fn find_entry(&self, id: Uuid) -> Result<Option<PostEntry>, RepoError>;

    /// One page of posts matching `filter`, ordered by `pub_date` descending.
    async fn page(
        &self,
        filter: PostFilter,
        request: &PageRequest,
    ) -> Result<Page<PostEntry>, RepoError>;

    async fn count(&self, filter: PostFilter) -> Result<u64, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Comments under a post, oldest first.
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentEntry>, RepoError>;
}
