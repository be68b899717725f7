//! Gateway configuration.
//!
//! Built from `Default`, from `BLOG_*` environment variables, or from a JSON
//! document. Missing keys keep their defaults in every case.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Transport ceiling before a call is reported as a network failure.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(15_000);

/// Settle time before an invalidation navigates, and again before the
/// redirect guard is released.
pub const INVALIDATION_DELAY: Duration = Duration::from_millis(1_000);

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    /// Prefix placed before the token, e.g. `Bearer abc`.
    pub auth_scheme: String,
    pub home_path: String,
    pub login_path: String,
    /// Paths that need a session; invalidation sends these home instead of
    /// reloading them.
    pub protected_prefixes: Vec<String>,
    pub redirect_delay_ms: u64,
    pub guard_release_delay_ms: u64,
    pub default_headers: Vec<(String, String)>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
            auth_scheme: "Bearer".to_string(),
            home_path: "/".to_string(),
            login_path: "/login".to_string(),
            protected_prefixes: vec![
                "/blog/edit".to_string(),
                "/blog/create".to_string(),
                "/picture".to_string(),
                "/user/center".to_string(),
            ],
            redirect_delay_ms: INVALIDATION_DELAY.as_millis() as u64,
            guard_release_delay_ms: INVALIDATION_DELAY.as_millis() as u64,
            default_headers: vec![(
                "content-type".to_string(),
                "application/json;charset=utf-8".to_string(),
            )],
        }
    }
}

impl GatewayConfig {
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like `from_env`, reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(url) = lookup("BLOG_API_BASE_URL") {
            config = config.with_base_url(&url);
        }
        if let Some(raw) = lookup("BLOG_API_TIMEOUT_MS") {
            config.timeout_ms = parse_millis("BLOG_API_TIMEOUT_MS", raw)?;
        }
        if let Some(path) = lookup("BLOG_HOME_PATH") {
            config.home_path = path;
        }
        if let Some(path) = lookup("BLOG_LOGIN_PATH") {
            config.login_path = path;
        }
        if let Some(raw) = lookup("BLOG_PROTECTED_PREFIXES") {
            config.protected_prefixes = raw
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(raw) = lookup("BLOG_REDIRECT_DELAY_MS") {
            let ms = parse_millis("BLOG_REDIRECT_DELAY_MS", raw)?;
            config.redirect_delay_ms = ms;
            config.guard_release_delay_ms = ms;
        }
        Ok(config)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        Ok(config.normalized())
    }

    fn normalized(self) -> Self {
        let base_url = self.base_url.clone();
        self.with_base_url(&base_url)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }

    pub fn guard_release_delay(&self) -> Duration {
        Duration::from_millis(self.guard_release_delay_ms)
    }

    /// Absolute URL for an API path.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    pub fn is_protected(&self, path: &str) -> bool {
        self.protected_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    pub fn is_home_or_login(&self, path: &str) -> bool {
        path == self.home_path || path == self.login_path
    }
}

fn parse_millis(key: &'static str, raw: String) -> Result<u64, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value: raw })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(15));
        assert_eq!(config.redirect_delay(), Duration::from_millis(1000));
        assert_eq!(config.auth_scheme, "Bearer");
        assert!(config.is_protected("/blog/edit/12"));
        assert!(!config.is_protected("/blogs"));
    }

    #[test]
    fn env_overrides() {
        let config = GatewayConfig::from_lookup(lookup(&[
            ("BLOG_API_BASE_URL", "http://api.example.com/"),
            ("BLOG_API_TIMEOUT_MS", "2500"),
            ("BLOG_PROTECTED_PREFIXES", "/admin, /drafts,"),
            ("BLOG_REDIRECT_DELAY_MS", "10"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://api.example.com");
        assert_eq!(config.timeout_ms, 2500);
        assert_eq!(config.protected_prefixes, vec!["/admin", "/drafts"]);
        assert_eq!(config.guard_release_delay_ms, 10);
        assert_eq!(config.home_path, "/");
    }

    #[test]
    fn bad_number_is_rejected() {
        let err = GatewayConfig::from_lookup(lookup(&[("BLOG_API_TIMEOUT_MS", "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "BLOG_API_TIMEOUT_MS",
                ..
            }
        ));
    }

    #[test]
    fn json_keeps_defaults_for_missing_keys() {
        let config =
            GatewayConfig::from_json_str(r#"{"base_url":"http://x/","login_path":"/signin"}"#)
                .unwrap();
        assert_eq!(config.base_url, "http://x");
        assert_eq!(config.login_path, "/signin");
        assert_eq!(config.timeout_ms, 15_000);
    }

    #[test]
    fn url_for_joins_paths() {
        let config = GatewayConfig::default().with_base_url("http://h:1/");
        assert_eq!(config.url_for("/user/info"), "http://h:1/user/info");
        assert_eq!(config.url_for("user/info"), "http://h:1/user/info");
        assert_eq!(config.url_for("https://other/x"), "https://other/x");
    }

    #[test]
    fn home_and_login() {
        let config = GatewayConfig::default();
        assert!(config.is_home_or_login("/"));
        assert!(config.is_home_or_login("/login"));
        assert!(!config.is_home_or_login("/about"));
    }
}
