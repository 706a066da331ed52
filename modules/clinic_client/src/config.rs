use serde::{Deserialize, Serialize};

/// Connection settings for the remote clinic API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Origin of the API server; `/api` is appended to every request path.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Transport timeout in seconds; 0 disables it.
    #[serde(default)]
    pub timeout_sec: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_sec: 0,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}
