//! Post handlers: listings, post detail, create/edit and comments.

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

use quill_core::DomainError;
use quill_core::PageRequest;
use quill_core::domain::{Comment, Post};
use quill_core::forms::{CommentForm, FormErrors, PostForm};
use quill_core::ports::PostFilter;

use super::redirect;
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use crate::urls;
use crate::views::{
    GroupPage, IndexPage, Nav, PostDetailPage, PostFormPage, ProfilePage, render,
};

/// `?page=` as sent by the client; resolution happens in the paginator.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    fn request(&self) -> PageRequest {
        PageRequest::new(self.page.clone())
    }
}

/// Malformed ids are reported the same way as unknown ones.
fn parse_post_id(raw: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(raw).map_err(|_| DomainError::not_found("Post", raw))
}

/// GET /
pub async fn index(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state
        .repos
        .posts
        .page(PostFilter::All, &query.request())
        .await?;

    render(&IndexPage::new(Nav::new(identity.0.as_ref()), page))
}

/// GET /group/{slug}/
pub async fn group_list(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    let group = state
        .repos
        .groups
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| DomainError::not_found("Group", &slug))?;

    let page = state
        .repos
        .posts
        .page(PostFilter::Group(group.id), &query.request())
        .await?;

    render(&GroupPage::new(Nav::new(identity.0.as_ref()), group, page))
}

/// GET /profile/{username}/
pub async fn profile(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let username = path.into_inner();
    let author = state
        .repos
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| DomainError::not_found("User", &username))?;

    let page = state
        .repos
        .posts
        .page(PostFilter::Author(author.id), &query.request())
        .await?;

    render(&ProfilePage::new(
        Nav::new(identity.0.as_ref()),
        &author,
        page,
    ))
}

/// GET /posts/{post_id}/
pub async fn post_detail(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post_id = parse_post_id(&path)?;
    let entry = state
        .repos
        .posts
        .find_entry(post_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Post", post_id))?;

    let author_post_count = state
        .repos
        .posts
        .count(PostFilter::Author(entry.post.author_id))
        .await?;
    let comments = state.repos.comments.list_for_post(post_id).await?;

    render(&PostDetailPage::new(
        Nav::new(identity.0.as_ref()),
        entry,
        identity.user_id(),
        author_post_count,
        comments,
    ))
}

/// GET /create/
pub async fn post_create_form(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let groups = state.repos.groups.list_all().await?;

    render(&PostFormPage::create(
        Nav::new(Some(&identity)),
        &PostForm::default(),
        &groups,
        &FormErrors::new(),
    ))
}

/// POST /create/
pub async fn post_create(
    state: web::Data<AppState>,
    identity: Identity,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let groups = state.repos.groups.list_all().await?;

    let cleaned = match form.clean(&groups) {
        Ok(cleaned) => cleaned,
        Err(errors) => {
            return render(&PostFormPage::create(
                Nav::new(Some(&identity)),
                &form,
                &groups,
                &errors,
            ));
        }
    };

    let post = Post::new(identity.user_id, cleaned.text, cleaned.group_id);
    let post = state.repos.posts.create(post).await?;
    tracing::info!(post_id = %post.id, author = %identity.username, "Post created");

    Ok(redirect(urls::profile(&identity.username)))
}

/// Load a post for editing. A non-author gets `AppError::Forbidden`.
async fn editable_post(state: &AppState, identity: &Identity, post_id: Uuid) -> AppResult<Post> {
    let post = state
        .repos
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Post", post_id))?;

    post.ensure_editable_by(identity.user_id)?;
    Ok(post)
}

/// GET /posts/{post_id}/edit/
pub async fn post_edit_form(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post_id = parse_post_id(&path)?;
    let post = match editable_post(&state, &identity, post_id).await {
        Ok(post) => post,
        Err(AppError::Forbidden) => return Ok(non_author_redirect(&identity, post_id)),
        Err(e) => return Err(e),
    };
    let groups = state.repos.groups.list_all().await?;

    render(&PostFormPage::edit(
        Nav::new(Some(&identity)),
        post.id,
        &PostForm::from_post(&post),
        &groups,
        &FormErrors::new(),
    ))
}

/// POST /posts/{post_id}/edit/
pub async fn post_edit(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let post_id = parse_post_id(&path)?;
    let mut post = match editable_post(&state, &identity, post_id).await {
        Ok(post) => post,
        Err(AppError::Forbidden) => return Ok(non_author_redirect(&identity, post_id)),
        Err(e) => return Err(e),
    };
    let form = form.into_inner();
    let groups = state.repos.groups.list_all().await?;

    let cleaned = match form.clean(&groups) {
        Ok(cleaned) => cleaned,
        Err(errors) => {
            return render(&PostFormPage::edit(
                Nav::new(Some(&identity)),
                post.id,
                &form,
                &groups,
                &errors,
            ));
        }
    };

    post.edit(cleaned.text, cleaned.group_id);
    let post = state.repos.posts.update(post).await?;
    tracing::info!(post_id = %post.id, "Post updated");

    Ok(redirect(urls::post_detail(post.id)))
}

fn non_author_redirect(identity: &Identity, post_id: Uuid) -> HttpResponse {
    tracing::debug!(post_id = %post_id, user = %identity.username, "Non-author edit attempt");
    redirect(urls::post_detail(post_id))
}

/// POST /posts/{post_id}/comment/
pub async fn add_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    form: web::Form<CommentForm>,
) -> AppResult<HttpResponse> {
    let post_id = parse_post_id(&path)?;
    if state.repos.posts.find_by_id(post_id).await?.is_none() {
        return Err(DomainError::not_found("Post", post_id).into());
    }

    match form.clean() {
        Ok(text) => {
            let comment = state
                .repos
                .comments
                .create(Comment::new(post_id, identity.user_id, text))
                .await?;
            tracing::info!(comment_id = %comment.id, post_id = %post_id, "Comment added");
        }
        Err(errors) => {
            tracing::debug!(post_id = %post_id, ?errors, "Rejected empty comment");
        }
    }

    Ok(redirect(urls::post_detail(post_id)))
}

/// GET /posts/{post_id}/comment/
///
/// Reached when a login redirect replays the comment URL; sends the user
/// back to the post.
pub async fn comment_redirect(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post_id = parse_post_id(&path)?;
    if state.repos.posts.find_by_id(post_id).await?.is_none() {
        return Err(DomainError::not_found("Post", post_id).into());
    }
    Ok(redirect(urls::post_detail(post_id)))
}
