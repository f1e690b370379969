//! Post pages: listings, post detail, and the create/edit form.

use askama::Template;
use uuid::Uuid;

use quill_core::Page;
use quill_core::domain::{Comment, CommentEntry, Group, Post, PostEntry, User};
use quill_core::forms::{FormErrors, PostForm};

use super::{CommentView, FieldView, Nav, PaginatorView, PostCard, listing};
use crate::urls;

const DETAIL_TITLE_CHARS: usize = 30;

#[derive(Template)]
#[template(path = "posts/index.html")]
pub struct IndexPage {
    pub nav: Nav,
    pub posts: Vec<PostCard>,
    pub paginator: PaginatorView,
}

impl IndexPage {
    pub fn new(nav: Nav, page: Page<PostEntry>) -> Self {
        let (posts, paginator) = listing(page, &urls::index());
        Self {
            nav,
            posts,
            paginator,
        }
    }
}

#[derive(Template)]
#[template(path = "posts/group_list.html")]
pub struct GroupPage {
    pub nav: Nav,
    pub title: String,
    pub description: String,
    pub posts: Vec<PostCard>,
    pub paginator: PaginatorView,
}

impl GroupPage {
    pub fn new(nav: Nav, group: Group, page: Page<PostEntry>) -> Self {
        let (posts, paginator) = listing(page, &urls::group_list(&group.slug));
        Self {
            nav,
            title: group.title,
            description: group.description,
            posts,
            paginator,
        }
    }
}

#[derive(Template)]
#[template(path = "posts/profile.html")]
pub struct ProfilePage {
    pub nav: Nav,
    pub author: String,
    pub post_count: u64,
    pub posts: Vec<PostCard>,
    pub paginator: PaginatorView,
}

impl ProfilePage {
    pub fn new(nav: Nav, author: &User, page: Page<PostEntry>) -> Self {
        let post_count = page.total;
        let (posts, paginator) = listing(page, &urls::profile(&author.username));
        Self {
            nav,
            author: author.username.clone(),
            post_count,
            posts,
            paginator,
        }
    }
}

#[derive(Template)]
#[template(path = "posts/post_detail.html")]
pub struct PostDetailPage {
    pub nav: Nav,
    pub title: String,
    pub post: PostCard,
    pub author_post_count: u64,
    pub can_edit: bool,
    pub edit_url: String,
    pub comments: Vec<CommentView>,
    pub comment_url: String,
    pub comment_field: FieldView,
}

impl PostDetailPage {
    pub fn new(
        nav: Nav,
        entry: PostEntry,
        viewer: Option<Uuid>,
        author_post_count: u64,
        comments: Vec<CommentEntry>,
    ) -> Self {
        let post_id = entry.post.id;
        let can_edit = viewer.is_some_and(|user_id| entry.post.is_authored_by(user_id));
        Self {
            nav,
            title: entry.post.text.chars().take(DETAIL_TITLE_CHARS).collect(),
            can_edit,
            edit_url: urls::post_edit(post_id),
            comment_url: urls::add_comment(post_id),
            comment_field: FieldView::new("text", Comment::TEXT_FIELD.label, "")
                .help(Comment::TEXT_FIELD.help_text),
            comments: comments.into_iter().map(CommentView::from).collect(),
            post: PostCard::from(entry),
            author_post_count,
        }
    }
}

/// One `<option>` of the group select.
#[derive(Debug, Clone)]
pub struct GroupOption {
    pub value: String,
    pub title: String,
    pub selected: bool,
}

/// The create/edit form. `is_edit` and `post_id` are only set when editing.
#[derive(Template)]
#[template(path = "posts/create_post.html")]
pub struct PostFormPage {
    pub nav: Nav,
    pub is_edit: bool,
    pub post_id: Option<Uuid>,
    pub action_url: String,
    pub text: FieldView,
    pub group: FieldView,
    pub group_options: Vec<GroupOption>,
    pub no_group_selected: bool,
}

impl PostFormPage {
    pub fn create(nav: Nav, form: &PostForm, groups: &[Group], errors: &FormErrors) -> Self {
        Self::build(nav, None, urls::post_create(), form, groups, errors)
    }

    pub fn edit(
        nav: Nav,
        post_id: Uuid,
        form: &PostForm,
        groups: &[Group],
        errors: &FormErrors,
    ) -> Self {
        Self::build(nav, Some(post_id), urls::post_edit(post_id), form, groups, errors)
    }

    fn build(
        nav: Nav,
        post_id: Option<Uuid>,
        action_url: String,
        form: &PostForm,
        groups: &[Group],
        errors: &FormErrors,
    ) -> Self {
        let selected = form.group.trim();
        let group_options: Vec<GroupOption> = groups
            .iter()
            .map(|group| {
                let value = group.id.to_string();
                GroupOption {
                    selected: value == selected,
                    title: group.to_string(),
                    value,
                }
            })
            .collect();

        Self {
            nav,
            is_edit: post_id.is_some(),
            post_id,
            action_url,
            text: FieldView::new("text", Post::TEXT_FIELD.label, form.text.as_str())
                .help(Post::TEXT_FIELD.help_text)
                .errors_from(errors),
            group: FieldView::new("group", Post::GROUP_FIELD.label, selected)
                .help(Post::GROUP_FIELD.help_text)
                .errors_from(errors),
            no_group_selected: !group_options.iter().any(|option| option.selected),
            group_options,
        }
    }
}

#[cfg(test)]
mod tests {
    use quill_core::forms::INVALID_CHOICE;

    use super::*;

    fn groups() -> Vec<Group> {
        vec![
            Group::new("Cats".into(), "cats".into(), String::new()),
            Group::new("Dogs".into(), "dogs".into(), String::new()),
        ]
    }

    #[test]
    fn test_create_form_is_not_edit() {
        let page = PostFormPage::create(
            Nav::anonymous(),
            &PostForm::default(),
            &groups(),
            &FormErrors::new(),
        );
        assert!(!page.is_edit);
        assert_eq!(page.post_id, None);
        assert!(page.no_group_selected);
        assert_eq!(page.action_url, "/create/");
    }

    #[test]
    fn test_edit_form_preselects_group() {
        let groups = groups();
        let post = Post::new(Uuid::new_v4(), "Body".into(), Some(groups[1].id));
        let page = PostFormPage::edit(
            Nav::anonymous(),
            post.id,
            &PostForm::from_post(&post),
            &groups,
            &FormErrors::new(),
        );

        assert!(page.is_edit);
        assert_eq!(page.post_id, Some(post.id));
        assert_eq!(page.text.value, "Body");
        assert!(!page.group_options[0].selected);
        assert!(page.group_options[1].selected);

        let html = page.render().unwrap();
        assert!(html.contains("selected"));
        assert!(html.contains(Post::TEXT_FIELD.help_text));
    }

    #[test]
    fn test_form_errors_are_attached_to_fields() {
        let mut errors = FormErrors::new();
        errors.add("group", INVALID_CHOICE);
        let page = PostFormPage::create(Nav::anonymous(), &PostForm::default(), &groups(), &errors);

        assert!(page.text.errors.is_empty());
        assert_eq!(page.group.errors, vec![INVALID_CHOICE.to_string()]);
    }
}
