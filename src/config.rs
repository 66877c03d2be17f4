use serde::Serialize;
use std::time::Duration;

/// Sider relay deployed on Deno
pub const BASE_URL: &str = "https://deno-sider2api.spdt.work";
pub const AUTH_TOKEN: &str = "sk-deno-free-key-123456";

pub const MODELS: [&str; 9] = [
    "gpt-4o",
    "claude-3.5-sonnet",
    "claude-3.7-sonnet",
    "deepseek-reasoner",
    "o3-mini",
    "o1",
    "llama-3.1-405b",
    "gemini-2.0-pro",
    "gemini-2.5-pro",
];

pub const DEFAULT_PROMPT: &str = "介绍一下你自己";

#[derive(Debug, Clone, Serialize)]
pub struct ProbeConfig {
    /// API root, without the `/v1` suffix
    pub base_url: String,

    /// Bearer token sent on every request
    #[serde(skip_serializing)]
    pub auth_token: String,

    /// Models probed by `run_all`, in order
    pub models: Vec<String>,

    pub prompt: String,

    pub temperature: f32,

    /// Per-request cap applied to chat probes
    pub request_timeout: Duration,

    /// Pause after every chat probe
    pub pause: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig {
            base_url: BASE_URL.to_string(),
            auth_token: AUTH_TOKEN.to_string(),
            models: MODELS.iter().map(|m| m.to_string()).collect(),
            prompt: DEFAULT_PROMPT.to_string(),
            temperature: 0.7,
            request_timeout: Duration::from_secs(30),
            pause: Duration::from_secs(2),
        }
    }
}

impl ProbeConfig {
    /// Join `path` onto the base URL, tolerating a trailing slash.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_carries_the_fixed_suite() {
        let config = ProbeConfig::default();
        assert_eq!(config.models.len(), 9);
        assert_eq!(config.models[0], "gpt-4o");
        assert_eq!(config.models[8], "gemini-2.5-pro");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.pause, Duration::from_secs(2));
    }

    #[test]
    fn url_joins_without_double_slash() {
        let config = ProbeConfig {
            base_url: "http://localhost:8000/".to_string(),
            ..ProbeConfig::default()
        };
        assert_eq!(config.url("/v1/models"), "http://localhost:8000/v1/models");
        assert_eq!(
            config.url("v1/chat/completions"),
            "http://localhost:8000/v1/chat/completions"
        );
    }

    #[test]
    fn token_is_not_serialized() {
        let json = serde_json::to_string(&ProbeConfig::default()).unwrap();
        assert!(!json.contains(AUTH_TOKEN));
        assert!(json.contains("deno-sider2api"));
    }
}
