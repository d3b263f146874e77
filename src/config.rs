use std::time::Duration;

const DEFAULT_LOCATION: &str = "us-central1";
const DEFAULT_MODEL: &str = "gemini-1.5-pro-001";
const DEFAULT_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

/// Settings for the AI-backed intent parser. A missing project id or access
/// token leaves the keyword parser in charge.
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub project_id: Option<String>,
    pub location: String,
    pub model: String,
    pub access_token: Option<String>,
    /// Full `generateContent` URL; overrides the one derived from location and model.
    pub endpoint: Option<String>,
    pub timeout: Duration,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            location: DEFAULT_LOCATION.to_string(),
            model: DEFAULT_MODEL.to_string(),
            access_token: None,
            endpoint: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl AiConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let timeout_secs = non_empty("VERTEX_TIMEOUT_SECS")
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            project_id: non_empty("PROJECT_ID"),
            location: non_empty("VERTEX_LOCATION").unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            model: non_empty("VERTEX_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            access_token: non_empty("VERTEX_ACCESS_TOKEN"),
            endpoint: non_empty("VERTEX_ENDPOINT"),
            timeout: Duration::from_secs(timeout_secs.max(1)),
        }
    }
}

pub fn bind_addr_from_env() -> String {
    std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
}
