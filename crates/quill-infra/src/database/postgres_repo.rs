//! PostgreSQL repository implementations.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Select};
use uuid::Uuid;

use quill_core::domain::{CommentEntry, Group, PostEntry, User};
use quill_core::error::RepoError;
use quill_core::pagination::{POSTS_PER_PAGE, Page, PageRequest, Paginator};
use quill_core::ports::{
    CommentRepository, GroupRepository, PostFilter, PostRepository, UserRepository,
};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::group::{self, Entity as GroupEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, repo_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL group repository.
pub type PostgresGroupRepository = PostgresBaseRepository<GroupEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(%username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let result = GroupEntity::find()
            .filter(group::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(result.map(Into::into))
    }

    async fn list_all(&self) -> Result<Vec<Group>, RepoError> {
        let result = GroupEntity::find()
            .order_by_asc(group::Column::Title)
            .all(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

impl PostgresPostRepository {
    fn filtered(filter: PostFilter) -> Select<PostEntity> {
        let select = PostEntity::find();
        match filter {
            PostFilter::All => select,
            PostFilter::Group(group_id) => select.filter(post::Column::GroupId.eq(group_id)),
            PostFilter::Author(author_id) => select.filter(post::Column::AuthorId.eq(author_id)),
        }
    }

    /// Resolve authors and groups for a batch of posts with two lookups.
    async fn attach(&self, models: Vec<post::Model>) -> Result<Vec<PostEntry>, RepoError> {
        let author_ids: HashSet<Uuid> = models.iter().map(|m| m.author_id).collect();
        let group_ids: HashSet<Uuid> = models.iter().filter_map(|m| m.group_id).collect();

        let authors = usernames(&self.db, author_ids).await?;
        let groups: HashMap<Uuid, Group> = if group_ids.is_empty() {
            HashMap::new()
        } else {
            GroupEntity::find()
                .filter(group::Column::Id.is_in(group_ids))
                .all(&self.db)
                .await
                .map_err(repo_err)?
                .into_iter()
                .map(|g| (g.id, g.into()))
                .collect()
        };

        models
            .into_iter()
            .map(|model| {
                let author = authors
                    .get(&model.author_id)
                    .cloned()
                    .ok_or_else(|| RepoError::Query(format!("post {} has no author", model.id)))?;
                let group = model.group_id.and_then(|id| groups.get(&id).cloned());
                Ok(PostEntry {
                    post: model.into(),
                    author,
                    group,
                })
            })
            .collect()
    }
}

async fn usernames(
    db: &sea_orm::DbConn,
    ids: HashSet<Uuid>,
) -> Result<HashMap<Uuid, String>, RepoError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let users = UserEntity::find()
        .filter(user::Column::Id.is_in(ids))
        .all(db)
        .await
        .map_err(repo_err)?;

    Ok(users.into_iter().map(|u| (u.id, u.username)).collect())
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_entry(&self, id: Uuid) -> Result<Option<PostEntry>, RepoError> {
        let Some(model) = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(repo_err)?
        else {
            return Ok(None);
        };

        Ok(self.attach(vec![model]).await?.into_iter().next())
    }

    async fn page(
        &self,
        filter: PostFilter,
        request: &PageRequest,
    ) -> Result<Page<PostEntry>, RepoError> {
        let paginator = Self::filtered(filter)
            .order_by_desc(post::Column::PubDate)
            .order_by_desc(post::Column::Id)
            .paginate(&self.db, POSTS_PER_PAGE);

        let total = paginator.num_items().await.map_err(repo_err)?;
        let window = Paginator::new(POSTS_PER_PAGE).window(total, request);
        let models = paginator
            .fetch_page(window.number - 1)
            .await
            .map_err(repo_err)?;

        tracing::debug!(?filter, page = window.number, total, "Loaded post page");

        let entries = self.attach(models).await?;
        Ok(Page::new(entries, window.number, window.num_pages, total))
    }

    async fn count(&self, filter: PostFilter) -> Result<u64, RepoError> {
        Self::filtered(filter)
            .count(&self.db)
            .await
            .map_err(repo_err)
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentEntry>, RepoError> {
        let models = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::PubDate)
            .order_by_asc(comment::Column::Id)
            .all(&self.db)
            .await
            .map_err(repo_err)?;

        let authors = usernames(&self.db, models.iter().map(|m| m.author_id).collect()).await?;

        Ok(models
            .into_iter()
            .map(|model| CommentEntry {
                author: authors.get(&model.author_id).cloned().unwrap_or_default(),
                comment: model.into(),
            })
            .collect())
    }
}
