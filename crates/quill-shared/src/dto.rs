//! Data Transfer Objects for the JSON endpoints.

use serde::{Deserialize, Serialize};

/// Liveness probe body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub storage: String,
    pub timestamp: String,
}
