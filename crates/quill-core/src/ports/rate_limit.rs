//! Throttling port for endpoints that attract brute force, such as login.

use async_trait::async_trait;
use std::time::Duration;

/// Per-client request throttle.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Record one request from `key` (usually the client address).
    async fn check(&self, key: &str) -> Result<RateLimitResult, RateLimitError>;
}

/// Outcome of recording a request.
#[derive(Debug, Clone)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub reset_after: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("Backend error: {0}")]
    Backend(String),
}
