//! # Quill Core
//!
//! The domain layer of the Quill blog.
//! Entities, pagination, form validation and the ports infrastructure must implement.
//! No infrastructure dependencies live here.

pub mod domain;
pub mod error;
pub mod forms;
pub mod pagination;
pub mod ports;

pub use error::{DomainError, RepoError};
pub use pagination::{POSTS_PER_PAGE, Page, PageRequest, Paginator};
