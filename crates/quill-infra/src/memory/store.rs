//! Single-process blog store backed by vectors behind an async RwLock.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Comment, CommentEntry, Group, Post, PostEntry, User};
use quill_core::error::RepoError;
use quill_core::pagination::{Page, PageRequest, Paginator};
use quill_core::ports::{
    BaseRepository, CommentRepository, GroupRepository, PostFilter, PostRepository,
    UserRepository,
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    groups: Vec<Group>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
}

impl Tables {
    fn username(&self, id: Uuid) -> Option<String> {
        self.users
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.username.clone())
    }

    fn entry(&self, post: &Post) -> PostEntry {
        PostEntry {
            post: post.clone(),
            author: self.username(post.author_id).unwrap_or_default(),
            group: post
                .group_id
                .and_then(|id| self.groups.iter().find(|g| g.id == id).cloned()),
        }
    }

    /// Newest first; among equal dates the later insert wins.
    fn posts_matching(&self, filter: PostFilter) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self
            .posts
            .iter()
            .rev()
            .filter(|p| match filter {
                PostFilter::All => true,
                PostFilter::Group(id) => p.group_id == Some(id),
                PostFilter::Author(id) => p.author_id == id,
            })
            .collect();
        posts.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));
        posts
    }

    fn check_post_refs(&self, post: &Post) -> Result<(), RepoError> {
        if !self.users.iter().any(|u| u.id == post.author_id) {
            return Err(RepoError::Constraint(format!(
                "post author {} does not exist",
                post.author_id
            )));
        }
        if let Some(group_id) = post.group_id {
            if !self.groups.iter().any(|g| g.id == group_id) {
                return Err(RepoError::Constraint(format!(
                    "group {group_id} does not exist"
                )));
            }
        }
        Ok(())
    }

    fn check_comment_refs(&self, comment: &Comment) -> Result<(), RepoError> {
        if !self.posts.iter().any(|p| p.id == comment.post_id) {
            return Err(RepoError::Constraint(format!(
                "post {} does not exist",
                comment.post_id
            )));
        }
        if !self.users.iter().any(|u| u.id == comment.author_id) {
            return Err(RepoError::Constraint(format!(
                "comment author {} does not exist",
                comment.author_id
            )));
        }
        Ok(())
    }
}

/// In-memory implementation of every blog repository.
///
/// Note: Data is lost on process restart.
#[derive(Default)]
pub struct InMemoryBlogStore {
    tables: RwLock<Tables>,
}

impl InMemoryBlogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Replace the row with the same id, or report that it is gone.
fn replace<T: Clone>(rows: &mut [T], entity: &T, same: impl Fn(&T) -> bool) -> Result<T, RepoError> {
    let slot = rows.iter_mut().find(|row| same(row)).ok_or(RepoError::NotFound)?;
    *slot = entity.clone();
    Ok(entity.clone())
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryBlogStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn create(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(RepoError::Constraint(format!(
                "username '{}' already exists",
                user.username
            )));
        }
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        replace(&mut tables.users, &user, |u| u.id == user.id)
    }
}

#[async_trait]
impl UserRepository for InMemoryBlogStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }
}

#[async_trait]
impl BaseRepository<Group, Uuid> for InMemoryBlogStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Group>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.groups.iter().find(|g| g.id == id).cloned())
    }

    async fn create(&self, group: Group) -> Result<Group, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.groups.iter().any(|g| g.slug == group.slug) {
            return Err(RepoError::Constraint(format!(
                "group slug '{}' already exists",
                group.slug
            )));
        }
        tables.groups.push(group.clone());
        Ok(group)
    }

    async fn update(&self, group: Group) -> Result<Group, RepoError> {
        let mut tables = self.tables.write().await;
        replace(&mut tables.groups, &group, |g| g.id == group.id)
    }
}

#[async_trait]
impl GroupRepository for InMemoryBlogStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.groups.iter().find(|g| g.slug == slug).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Group>, RepoError> {
        let tables = self.tables.read().await;
        let mut groups = tables.groups.clone();
        groups.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(groups)
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryBlogStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn create(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        tables.check_post_refs(&post)?;
        tables.posts.push(post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        tables.check_post_refs(&post)?;
        replace(&mut tables.posts, &post, |p| p.id == post.id)
    }
}

#[async_trait]
impl PostRepository for InMemoryBlogStore {
    async fn find_entry(&self, id: Uuid) -> Result<Option<PostEntry>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .iter()
            .find(|p| p.id == id)
            .map(|p| tables.entry(p)))
    }

    async fn page(
        &self,
        filter: PostFilter,
        request: &PageRequest,
    ) -> Result<Page<PostEntry>, RepoError> {
        let tables = self.tables.read().await;
        let entries: Vec<PostEntry> = tables
            .posts_matching(filter)
            .into_iter()
            .map(|p| tables.entry(p))
            .collect();
        Ok(Paginator::default().paginate(entries, request))
    }

    async fn count(&self, filter: PostFilter) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts_matching(filter).len() as u64)
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryBlogStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn create(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        tables.check_comment_refs(&comment)?;
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn update(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        replace(&mut tables.comments, &comment, |c| c.id == comment.id)
    }
}

#[async_trait]
impl CommentRepository for InMemoryBlogStore {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentEntry>, RepoError> {
        let tables = self.tables.read().await;
        let names: HashMap<Uuid, &str> = tables
            .users
            .iter()
            .map(|u| (u.id, u.username.as_str()))
            .collect();

        let mut comments: Vec<&Comment> = tables
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .collect();
        comments.sort_by(|a, b| a.pub_date.cmp(&b.pub_date));

        Ok(comments
            .into_iter()
            .map(|c| CommentEntry {
                comment: c.clone(),
                author: names.get(&c.author_id).copied().unwrap_or_default().to_string(),
            })
            .collect())
    }
}
