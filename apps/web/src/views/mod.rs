//! View models for the HTML pages.
//!
//! Each page is an askama template struct holding presentation-ready
//! values: formatted dates, resolved URLs, flags for optional blocks.
//! Handlers build these from domain data and hand them to [`render`].

mod auth;
mod posts;
mod render;

use quill_core::domain::{CommentEntry, PostEntry};
use quill_core::forms::FormErrors;
use quill_core::Page;
use quill_shared::ErrorResponse;

use askama::Template;

use crate::middleware::auth::Identity;
use crate::urls;

pub use auth::{LoggedOutPage, LoginPage, SignupPage};
pub use posts::{GroupPage, IndexPage, PostDetailPage, PostFormPage, ProfilePage};
pub use render::render;

const DATE_FORMAT: &str = "%d %B %Y";

/// Header navigation: who is signed in and where their links point.
#[derive(Debug, Clone)]
pub struct Nav {
    pub signed_in: bool,
    pub username: String,
    pub profile_url: String,
    pub index_url: String,
    pub create_url: String,
    pub login_url: String,
    pub signup_url: String,
    pub logout_url: String,
}

impl Nav {
    pub fn new(identity: Option<&Identity>) -> Self {
        let username = identity
            .map(|identity| identity.username.clone())
            .unwrap_or_default();
        Self {
            signed_in: identity.is_some(),
            profile_url: urls::profile(&username),
            username,
            index_url: urls::index(),
            create_url: urls::post_create(),
            login_url: urls::login(),
            signup_url: urls::signup(),
            logout_url: urls::logout(),
        }
    }

    pub fn anonymous() -> Self {
        Self::new(None)
    }
}

/// A post as shown in listings and on its own page.
#[derive(Debug, Clone)]
pub struct PostCard {
    pub text: String,
    pub author: String,
    pub profile_url: String,
    pub pub_date: String,
    pub detail_url: String,
    pub has_group: bool,
    pub group_title: String,
    pub group_url: String,
}

impl From<PostEntry> for PostCard {
    fn from(entry: PostEntry) -> Self {
        let (has_group, group_title, group_url) = match &entry.group {
            Some(group) => (true, group.title.clone(), urls::group_list(&group.slug)),
            None => (false, String::new(), String::new()),
        };
        Self {
            profile_url: urls::profile(&entry.author),
            pub_date: entry.post.pub_date.format(DATE_FORMAT).to_string(),
            detail_url: urls::post_detail(entry.post.id),
            text: entry.post.text,
            author: entry.author,
            has_group,
            group_title,
            group_url,
        }
    }
}

/// A comment under a post.
#[derive(Debug, Clone)]
pub struct CommentView {
    pub author: String,
    pub profile_url: String,
    pub pub_date: String,
    pub text: String,
}

impl From<CommentEntry> for CommentView {
    fn from(entry: CommentEntry) -> Self {
        Self {
            profile_url: urls::profile(&entry.author),
            pub_date: entry.comment.pub_date.format(DATE_FORMAT).to_string(),
            text: entry.comment.text,
            author: entry.author,
        }
    }
}

/// Previous/next links under a listing.
#[derive(Debug, Clone)]
pub struct PaginatorView {
    pub number: u64,
    pub num_pages: u64,
    pub show: bool,
    pub has_previous: bool,
    pub has_next: bool,
    pub first_url: String,
    pub previous_url: String,
    pub next_url: String,
    pub last_url: String,
}

impl PaginatorView {
    pub fn new<T>(page: &Page<T>, base_url: &str) -> Self {
        let url = |number: u64| format!("{base_url}?page={number}");
        Self {
            number: page.number,
            num_pages: page.num_pages,
            show: page.num_pages > 1,
            has_previous: page.has_previous(),
            has_next: page.has_next(),
            first_url: url(1),
            previous_url: page.previous_number().map(url).unwrap_or_default(),
            next_url: page.next_number().map(url).unwrap_or_default(),
            last_url: url(page.num_pages),
        }
    }
}

/// Cards plus paginator for one page of a listing.
pub(crate) fn listing(page: Page<PostEntry>, base_url: &str) -> (Vec<PostCard>, PaginatorView) {
    let paginator = PaginatorView::new(&page, base_url);
    (page.items.into_iter().map(PostCard::from).collect(), paginator)
}

/// Label, help text, and errors of a single form field.
#[derive(Debug, Clone)]
pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub help_text: &'static str,
    pub value: String,
    pub errors: Vec<String>,
}

impl FieldView {
    pub fn new(name: &'static str, label: &'static str, value: impl Into<String>) -> Self {
        Self {
            name,
            label,
            help_text: "",
            value: value.into(),
            errors: Vec::new(),
        }
    }

    pub fn help(mut self, help_text: &'static str) -> Self {
        self.help_text = help_text;
        self
    }

    pub fn errors_from(mut self, errors: &FormErrors) -> Self {
        self.errors = errors.field(self.name).to_vec();
        self
    }

    pub fn has_help(&self) -> bool {
        !self.help_text.is_empty()
    }
}

/// Error page rendered for 4xx/5xx responses.
#[derive(Template)]
#[template(path = "core/error.html")]
pub struct ErrorPage {
    pub status: u16,
    pub title: String,
    pub detail: String,
    pub index_url: String,
}

impl From<ErrorResponse> for ErrorPage {
    fn from(problem: ErrorResponse) -> Self {
        Self {
            status: problem.status,
            title: problem.title,
            detail: problem.detail.unwrap_or_default(),
            index_url: urls::index(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use quill_core::domain::{Group, Post};
    use quill_core::{PageRequest, Paginator};
    use uuid::Uuid;

    use super::*;

    fn entry(group: Option<Group>) -> PostEntry {
        let mut post = Post::new(Uuid::new_v4(), "Hello".to_string(), group.as_ref().map(|g| g.id));
        post.pub_date = Utc.with_ymd_and_hms(2022, 2, 12, 10, 0, 0).unwrap();
        PostEntry {
            post,
            author: "auth".to_string(),
            group,
        }
    }

    #[test]
    fn test_post_card_links() {
        let group = Group::new("Cats".into(), "cats".into(), String::new());
        let card = PostCard::from(entry(Some(group)));

        assert_eq!(card.pub_date, "12 February 2022");
        assert_eq!(card.profile_url, "/profile/auth/");
        assert!(card.has_group);
        assert_eq!(card.group_url, "/group/cats/");
    }

    #[test]
    fn test_post_card_without_group() {
        let card = PostCard::from(entry(None));
        assert!(!card.has_group);
        assert!(card.group_url.is_empty());
    }

    #[test]
    fn test_paginator_links() {
        let page = Paginator::default().paginate((0..25).collect::<Vec<_>>(), &PageRequest::number(2));
        let view = PaginatorView::new(&page, "/group/cats/");

        assert!(view.show);
        assert_eq!(view.previous_url, "/group/cats/?page=1");
        assert_eq!(view.next_url, "/group/cats/?page=3");
        assert_eq!(view.last_url, "/group/cats/?page=3");
    }

    #[test]
    fn test_single_page_hides_paginator() {
        let page = Paginator::default().paginate(vec![1, 2], &PageRequest::first());
        assert!(!PaginatorView::new(&page, "/").show);
    }

    #[test]
    fn test_error_page_renders_detail() {
        let html = ErrorPage::from(ErrorResponse::not_found("Group cats not found"))
            .render()
            .unwrap();
        assert!(html.contains("404"));
        assert!(html.contains("Group cats not found"));
    }
}
