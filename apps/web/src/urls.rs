//! URL builders for every named route, so handlers and views agree on paths.

use uuid::Uuid;

pub fn index() -> String {
    "/".to_string()
}

pub fn group_list(slug: &str) -> String {
    format!("/group/{}/", encode(slug))
}

pub fn profile(username: &str) -> String {
    format!("/profile/{}/", encode(username))
}

pub fn post_detail(post_id: Uuid) -> String {
    format!("/posts/{post_id}/")
}

pub fn post_create() -> String {
    "/create/".to_string()
}

pub fn post_edit(post_id: Uuid) -> String {
    format!("/posts/{post_id}/edit/")
}

pub fn add_comment(post_id: Uuid) -> String {
    format!("/posts/{post_id}/comment/")
}

pub fn login() -> String {
    "/auth/login/".to_string()
}

pub fn login_with_next(next: &str) -> String {
    format!("{}?next={}", login(), encode_keeping_slashes(next))
}

pub fn signup() -> String {
    "/auth/signup/".to_string()
}

pub fn logout() -> String {
    "/auth/logout/".to_string()
}

/// Only same-site absolute paths are followed after login.
pub fn safe_next(next: Option<&str>) -> String {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path.to_string()
        }
        _ => index(),
    }
}

/// Percent-encode a single path segment or query value.
pub fn encode(value: &str) -> String {
    percent_encode(value, |_| false)
}

fn encode_keeping_slashes(value: &str) -> String {
    percent_encode(value, |b| b == b'/')
}

fn percent_encode(value: &str, keep: impl Fn(u8) -> bool) -> String {
    let mut out = String::with_capacity(value.len());
    for b in value.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~' | b'@') || keep(b) {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}
