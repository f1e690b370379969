//! HTTP tests against the in-memory store.

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use chrono::{Duration, Utc};
use uuid::Uuid;

use quill_core::domain::{Group, Post, User};
use quill_core::forms::{CommentForm, LoginForm, PostForm, SignupForm};
use quill_core::ports::{
    BaseRepository, CommentRepository, PasswordService, PostFilter, PostRepository, TokenService,
    UserRepository,
};
use quill_infra::{Argon2PasswordService, JwtConfig, JwtTokenService};

use super::{auth_scope, configure_routes};
use crate::middleware::auth::SESSION_COOKIE;
use crate::state::{AppState, Repositories};

const CARD: &str = "<article class=\"post-card\">";

struct Fixture {
    state: web::Data<AppState>,
    tokens: Arc<JwtTokenService>,
    clock: chrono::DateTime<Utc>,
    created: std::cell::Cell<i64>,
}

impl Fixture {
    fn new() -> Self {
        let tokens = Arc::new(JwtTokenService::new(JwtConfig {
            secret: "test-secret".to_string(),
            ..JwtConfig::default()
        }));
        let state = AppState::with_repositories(
            Repositories::in_memory(),
            tokens.clone(),
            Arc::new(Argon2PasswordService::new()),
        );
        Self {
            state: web::Data::new(state),
            tokens,
            clock: Utc::now() - Duration::days(1),
            created: std::cell::Cell::new(0),
        }
    }

    fn repos(&self) -> &Repositories {
        &self.state.repos
    }

    async fn user(&self, username: &str) -> User {
        self.repos()
            .users
            .create(User::new(username.to_string(), "!".to_string()))
            .await
            .unwrap()
    }

    async fn user_with_password(&self, username: &str, password: &str) -> User {
        let hash = self.state.passwords.hash(password).unwrap();
        self.repos()
            .users
            .create(User::new(username.to_string(), hash))
            .await
            .unwrap()
    }

    async fn group(&self, title: &str, slug: &str) -> Group {
        self.repos()
            .groups
            .create(Group::new(title.to_string(), slug.to_string(), "Test description".to_string()))
            .await
            .unwrap()
    }

    /// Posts get strictly increasing dates in creation order.
    async fn post(&self, author: &User, text: &str, group: Option<&Group>) -> Post {
        let n = self.created.get();
        self.created.set(n + 1);
        let mut post = Post::new(author.id, text.to_string(), group.map(|g| g.id));
        post.pub_date = self.clock + Duration::minutes(n);
        self.repos().posts.create(post).await.unwrap()
    }

    async fn post_count(&self) -> u64 {
        self.repos().posts.count(PostFilter::All).await.unwrap()
    }

    fn session(&self, user: &User) -> Cookie<'static> {
        let token = self.tokens.generate_token(user.id, &user.username).unwrap();
        Cookie::new(SESSION_COOKIE, token)
    }
}

macro_rules! app {
    ($fixture:expr) => {
        test::init_service(
            App::new()
                .app_data($fixture.state.clone())
                .service(auth_scope())
                .configure(configure_routes),
        )
        .await
    };
}

fn location<B>(res: &ServiceResponse<B>) -> String {
    res.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn body_text<B: actix_web::body::MessageBody>(res: ServiceResponse<B>) -> String {
    let bytes = test::read_body(res).await;
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// 13 posts: 11 in group A, 2 in group B; 12 by `auth`, 1 by `NoName`.
async fn seed_listing(f: &Fixture) -> (User, Group, Group) {
    let user = f.user("auth").await;
    let other = f.user("NoName").await;
    let group = f.group("Test title", "test-slug").await;
    let other_group = f.group("Test title 2", "test_2-slug").await;

    for i in 1..=13 {
        let author = if i == 11 { &other } else { &user };
        let target = if i == 10 || i == 13 { &other_group } else { &group };
        f.post(author, &format!("Test post {i}"), Some(target)).await;
    }
    (user, group, other_group)
}

#[actix_web::test]
async fn test_listings_paginate_by_ten() {
    let f = Fixture::new();
    seed_listing(&f).await;
    let app = app!(f);

    let cases = [
        ("/", 10, 3),
        ("/group/test-slug/", 10, 1),
        ("/profile/auth/", 10, 2),
    ];
    for (path, first, second) in cases {
        let res = test::call_service(&app, test::TestRequest::get().uri(path).to_request()).await;
        assert_eq!(res.status(), StatusCode::OK, "{path}");
        assert_eq!(body_text(res).await.matches(CARD).count(), first, "{path}");

        let uri = format!("{path}?page=2");
        let res = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
        assert_eq!(body_text(res).await.matches(CARD).count(), second, "{uri}");
    }
}

#[actix_web::test]
async fn test_out_of_range_pages_fall_back() {
    let f = Fixture::new();
    seed_listing(&f).await;
    let app = app!(f);

    for (query, expected) in [("abc", 10), ("99", 3), ("0", 3)] {
        let uri = format!("/?page={query}");
        let res = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_text(res).await.matches(CARD).count(), expected, "{uri}");
    }
}

#[actix_web::test]
async fn test_index_is_newest_first() {
    let f = Fixture::new();
    seed_listing(&f).await;
    let app = app!(f);

    let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    let body = body_text(res).await;

    let newest = body.find("Test post 13").unwrap();
    let older = body.find("Test post 12").unwrap();
    assert!(newest < older);
}

#[actix_web::test]
async fn test_post_stays_out_of_other_groups() {
    let f = Fixture::new();
    let user = f.user("auth").await;
    let group = f.group("Cats", "cats").await;
    f.group("Dogs", "dogs").await;
    f.post(&user, "Only for cats", Some(&group)).await;
    let app = app!(f);

    let res = test::call_service(&app, test::TestRequest::get().uri("/group/dogs/").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_text(res).await;
    assert_eq!(body.matches(CARD).count(), 0);
    assert!(!body.contains("Only for cats"));

    let res = test::call_service(&app, test::TestRequest::get().uri("/group/cats/").to_request()).await;
    assert!(body_text(res).await.contains("Only for cats"));
}

#[actix_web::test]
async fn test_unknown_objects_are_not_found() {
    let f = Fixture::new();
    let app = app!(f);

    let missing_post = format!("/posts/{}/", Uuid::new_v4());
    for path in ["/group/nope/", "/profile/nobody/", missing_post.as_str(), "/posts/not-a-uuid/"] {
        let res = test::call_service(&app, test::TestRequest::get().uri(path).to_request()).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{path}");
        assert!(body_text(res).await.contains("Not Found"));
    }
}

#[actix_web::test]
async fn test_anonymous_can_read_every_listing() {
    let f = Fixture::new();
    let user = f.user("auth").await;
    let group = f.group("Cats", "cats").await;
    let post = f.post(&user, "Hello world", Some(&group)).await;
    let app = app!(f);

    let detail = format!("/posts/{}/", post.id);
    for path in ["/", "/group/cats/", "/profile/auth/", detail.as_str()] {
        let res = test::call_service(&app, test::TestRequest::get().uri(path).to_request()).await;
        assert_eq!(res.status(), StatusCode::OK, "{path}");
    }
}

#[actix_web::test]
async fn test_post_detail_shows_author_count_and_edit_link_for_author() {
    let f = Fixture::new();
    let user = f.user("auth").await;
    let reader = f.user("reader").await;
    f.post(&user, "First", None).await;
    let post = f.post(&user, "Second post text", None).await;
    let app = app!(f);
    let uri = format!("/posts/{}/", post.id);
    let edit_link = format!("/posts/{}/edit/", post.id);

    let req = test::TestRequest::get().uri(&uri).cookie(f.session(&user)).to_request();
    let body = body_text(test::call_service(&app, req).await).await;
    assert!(body.contains("Second post text"));
    assert!(body.contains("<span class=\"post-count\">2</span>"));
    assert!(body.contains(&edit_link));

    let req = test::TestRequest::get().uri(&uri).cookie(f.session(&reader)).to_request();
    let body = body_text(test::call_service(&app, req).await).await;
    assert!(!body.contains(&edit_link));
}

#[actix_web::test]
async fn test_anonymous_create_redirects_to_login() {
    let f = Fixture::new();
    f.user("auth").await;
    let app = app!(f);

    let res = test::call_service(&app, test::TestRequest::get().uri("/create/").to_request()).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/auth/login/?next=/create/");

    let req = test::TestRequest::post()
        .uri("/create/")
        .set_form(PostForm {
            text: "Sneaky".to_string(),
            group: String::new(),
        })
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/auth/login/?next=/create/");
    assert_eq!(f.post_count().await, 0);
}

#[actix_web::test]
async fn test_create_post_adds_one_and_redirects_to_profile() {
    let f = Fixture::new();
    let user = f.user("auth").await;
    let group = f.group("Cats", "cats").await;
    f.post(&user, "Existing", None).await;
    let app = app!(f);
    let before = f.post_count().await;

    let req = test::TestRequest::post()
        .uri("/create/")
        .cookie(f.session(&user))
        .set_form(PostForm {
            text: "Brand new post".to_string(),
            group: group.id.to_string(),
        })
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/profile/auth/");
    assert_eq!(f.post_count().await, before + 1);

    let page = f
        .repos()
        .posts
        .page(PostFilter::Author(user.id), &quill_core::PageRequest::first())
        .await
        .unwrap();
    let newest = &page.items[0];
    assert_eq!(newest.post.text, "Brand new post");
    assert_eq!(newest.post.author_id, user.id);
    assert_eq!(newest.group.as_ref().map(|g| g.id), Some(group.id));
}

#[actix_web::test]
async fn test_create_with_blank_text_redisplays_form() {
    let f = Fixture::new();
    let user = f.user("auth").await;
    let app = app!(f);

    let req = test::TestRequest::post()
        .uri("/create/")
        .cookie(f.session(&user))
        .set_form(PostForm {
            text: "   ".to_string(),
            group: String::new(),
        })
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_text(res).await.contains("This field is required."));
    assert_eq!(f.post_count().await, 0);
}

#[actix_web::test]
async fn test_create_and_edit_forms_differ() {
    let f = Fixture::new();
    let user = f.user("auth").await;
    let post = f.post(&user, "Editable body", None).await;
    let app = app!(f);

    let req = test::TestRequest::get().uri("/create/").cookie(f.session(&user)).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_text(res).await;
    assert!(body.contains("New post"));
    assert!(body.contains("Enter the text of the post"));

    let uri = format!("/posts/{}/edit/", post.id);
    let req = test::TestRequest::get().uri(&uri).cookie(f.session(&user)).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_text(res).await;
    assert!(body.contains("Edit post"));
    assert!(body.contains("Editable body"));
    assert!(body.contains(&format!("action=\"{uri}\"")));
}

#[actix_web::test]
async fn test_author_edit_updates_in_place() {
    let f = Fixture::new();
    let user = f.user("auth").await;
    let post = f.post(&user, "Before", None).await;
    let app = app!(f);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit/", post.id))
        .cookie(f.session(&user))
        .set_form(PostForm {
            text: "After".to_string(),
            group: String::new(),
        })
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), format!("/posts/{}/", post.id));
    assert_eq!(f.post_count().await, 1);
    let stored = f.repos().posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "After");
    assert_eq!(stored.pub_date, post.pub_date);
}

#[actix_web::test]
async fn test_edit_with_blank_text_redisplays_form() {
    let f = Fixture::new();
    let user = f.user("auth").await;
    let post = f.post(&user, "Keep me", None).await;
    let app = app!(f);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit/", post.id))
        .cookie(f.session(&user))
        .set_form(PostForm {
            text: "   ".to_string(),
            group: String::new(),
        })
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    let body = body_text(res).await;
    assert!(body.contains("This field is required."));
    assert!(body.contains("Edit post"));
    let stored = f.repos().posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "Keep me");
}

#[actix_web::test]
async fn test_non_author_edit_is_redirected_without_change() {
    let f = Fixture::new();
    let author = f.user("auth").await;
    let intruder = f.user("NoName").await;
    let post = f.post(&author, "Original", None).await;
    let app = app!(f);
    let uri = format!("/posts/{}/edit/", post.id);
    let detail = format!("/posts/{}/", post.id);

    let req = test::TestRequest::get().uri(&uri).cookie(f.session(&intruder)).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), detail);

    let req = test::TestRequest::post()
        .uri(&uri)
        .cookie(f.session(&intruder))
        .set_form(PostForm {
            text: "Hijacked".to_string(),
            group: String::new(),
        })
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), detail);

    let stored = f.repos().posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "Original");
}

#[actix_web::test]
async fn test_comment_appears_on_post_detail() {
    let f = Fixture::new();
    let author = f.user("auth").await;
    let reader = f.user("reader").await;
    let post = f.post(&author, "Commentable", None).await;
    let app = app!(f);
    let detail = format!("/posts/{}/", post.id);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/comment/", post.id))
        .cookie(f.session(&reader))
        .set_form(CommentForm {
            text: "Great post!".to_string(),
        })
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), detail);

    let res = test::call_service(&app, test::TestRequest::get().uri(&detail).to_request()).await;
    let body = body_text(res).await;
    assert!(body.contains("Great post!"));
    assert!(body.contains("/profile/reader/"));
}

#[actix_web::test]
async fn test_blank_or_anonymous_comments_are_not_stored() {
    let f = Fixture::new();
    let author = f.user("auth").await;
    let post = f.post(&author, "Quiet post", None).await;
    let app = app!(f);
    let uri = format!("/posts/{}/comment/", post.id);

    let req = test::TestRequest::post()
        .uri(&uri)
        .set_form(CommentForm {
            text: "Drive-by".to_string(),
        })
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert!(location(&res).starts_with("/auth/login/?next="));

    let req = test::TestRequest::post()
        .uri(&uri)
        .cookie(f.session(&author))
        .set_form(CommentForm {
            text: " ".to_string(),
        })
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);

    assert!(f.repos().comments.list_for_post(post.id).await.unwrap().is_empty());
}

#[actix_web::test]
async fn test_login_from_comment_form_returns_to_post() {
    let f = Fixture::new();
    let author = f.user("auth").await;
    f.user_with_password("reader", "secret-pass").await;
    let post = f.post(&author, "Commentable", None).await;
    let app = app!(f);
    let comment_uri = format!("/posts/{}/comment/", post.id);

    let req = test::TestRequest::post()
        .uri(&comment_uri)
        .set_form(CommentForm {
            text: "First!".to_string(),
        })
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(location(&res), format!("/auth/login/?next={comment_uri}"));

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_form(LoginForm {
            username: "reader".to_string(),
            password: "secret-pass".to_string(),
            next: Some(comment_uri.clone()),
        })
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(location(&res), comment_uri);
    let session = res
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| Cookie::new(SESSION_COOKIE, c.value().to_string()))
        .unwrap();

    let req = test::TestRequest::get().uri(&comment_uri).cookie(session).to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), format!("/posts/{}/", post.id));
    assert!(f.repos().comments.list_for_post(post.id).await.unwrap().is_empty());
}

#[actix_web::test]
async fn test_comment_on_missing_post_is_not_found() {
    let f = Fixture::new();
    let user = f.user("auth").await;
    let app = app!(f);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/comment/", Uuid::new_v4()))
        .cookie(f.session(&user))
        .set_form(CommentForm {
            text: "Hello?".to_string(),
        })
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_signup_creates_user_once() {
    let f = Fixture::new();
    let app = app!(f);
    let form = SignupForm {
        username: "leo".to_string(),
        password1: "war-and-peace".to_string(),
        password2: "war-and-peace".to_string(),
    };

    let req = test::TestRequest::post().uri("/auth/signup/").set_form(&form).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/");
    assert!(f.repos().users.find_by_username("leo").await.unwrap().is_some());

    let req = test::TestRequest::post().uri("/auth/signup/").set_form(&form).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_text(res).await.contains("A user with that username already exists."));
}

#[actix_web::test]
async fn test_login_sets_session_and_follows_local_next() {
    let f = Fixture::new();
    f.user_with_password("auth", "secret-pass").await;
    let app = app!(f);

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_form(LoginForm {
            username: "auth".to_string(),
            password: "secret-pass".to_string(),
            next: Some("/create/".to_string()),
        })
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/create/");
    let cookie = res
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .unwrap();
    assert!(cookie.http_only().unwrap_or(false));
    let claims = f.tokens.validate_token(cookie.value()).unwrap();
    assert_eq!(claims.username, "auth");

    let req = test::TestRequest::get()
        .uri("/create/")
        .cookie(Cookie::new(SESSION_COOKIE, cookie.value().to_string()))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_login_ignores_offsite_next() {
    let f = Fixture::new();
    f.user_with_password("auth", "secret-pass").await;
    let app = app!(f);

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_form(LoginForm {
            username: "auth".to_string(),
            password: "secret-pass".to_string(),
            next: Some("//evil.example/".to_string()),
        })
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/");
}

#[actix_web::test]
async fn test_login_with_wrong_password_redisplays_form() {
    let f = Fixture::new();
    f.user_with_password("auth", "secret-pass").await;
    let app = app!(f);

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_form(LoginForm {
            username: "auth".to_string(),
            password: "wrong-pass".to_string(),
            next: None,
        })
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.response().cookies().all(|c| c.name() != SESSION_COOKIE));
    assert!(body_text(res).await.contains("Please enter a correct username and password."));
}

#[actix_web::test]
async fn test_login_page_carries_next() {
    let f = Fixture::new();
    let app = app!(f);

    let req = test::TestRequest::get().uri("/auth/login/?next=/create/").to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_text(res).await.contains("name=\"next\" value=\"/create/\""));
}

#[actix_web::test]
async fn test_logout_clears_session() {
    let f = Fixture::new();
    let user = f.user("auth").await;
    let app = app!(f);

    let req = test::TestRequest::get()
        .uri("/auth/logout/")
        .cookie(f.session(&user))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    let cookie = res
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .unwrap();
    assert_eq!(cookie.value(), "");
    assert!(body_text(res).await.contains("logged out"));
}

#[actix_web::test]
async fn test_health_reports_storage() {
    let f = Fixture::new();
    let app = app!(f);

    let res = test::call_service(&app, test::TestRequest::get().uri("/health/").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body: quill_shared::HealthResponse = test::read_body_json(res).await;
    assert_eq!(body.status, "ok");
    assert_eq!(body.storage, "memory");
}
