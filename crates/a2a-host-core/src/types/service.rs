use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SERVICE_ID: &str = "a2a-host-agent";
pub const SERVICE_NAME: &str = "A2A Host Agent API";
pub const SERVICE_VERSION: &str = "1.0.0";
pub const SERVICE_DESCRIPTION: &str =
    "This assistant can help you to check weather and find Airbnb accommodation";

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            service: SERVICE_ID.to_string(),
            version: SERVICE_VERSION.to_string(),
        }
    }
}

/// Body of `GET /`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub service: String,
    pub description: String,
    pub version: String,
    pub endpoints: BTreeMap<String, String>,
}

impl ServiceInfo {
    /// Metadata for a service mounted under `prefix` (empty for the root).
    pub fn with_prefix(prefix: &str) -> Self {
        let endpoints = [
            ("health", "/health"),
            ("chat", "/chat"),
            ("chat_stream", "/chat/stream"),
        ]
        .into_iter()
        .map(|(name, path)| (name.to_string(), format!("{prefix}{path}")))
        .collect();

        Self {
            service: SERVICE_NAME.to_string(),
            description: SERVICE_DESCRIPTION.to_string(),
            version: SERVICE_VERSION.to_string(),
            endpoints,
        }
    }
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self::with_prefix("")
    }
}
