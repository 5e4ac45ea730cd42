//! Session persistence configuration.

use serde::{Deserialize, Serialize};

/// Session store and cookie configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Session store path (redb database file).
    #[serde(default = "default_store_path")]
    pub store_path: String,

    /// Session TTL in seconds (default: 24 hours).
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,

    /// Cookie name for the session token.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Cookie path.
    #[serde(default = "default_cookie_path")]
    pub cookie_path: String,

    /// Cookie lifespan in seconds. 0 means a browser-session cookie.
    #[serde(default)]
    pub cookie_lifespan_secs: u64,

    /// Expired-session sweep interval in seconds.
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,
}

fn default_store_path() -> String {
    "/var/lib/zentinel-openid/sessions.redb".to_string()
}

fn default_session_ttl() -> u64 {
    24 * 60 * 60 // 24 hours
}

fn default_cookie_name() -> String {
    "open_id_session_id".to_string()
}

fn default_cookie_path() -> String {
    "/".to_string()
}

fn default_cleanup_interval() -> u64 {
    300 // 5 minutes
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            session_ttl_secs: default_session_ttl(),
            cookie_name: default_cookie_name(),
            cookie_path: default_cookie_path(),
            cookie_lifespan_secs: 0,
            cleanup_interval_secs: default_cleanup_interval(),
        }
    }
}

impl SessionConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.store_path.is_empty() {
            return Err("store_path is required".to_string());
        }

        if self.session_ttl_secs == 0 {
            return Err("session_ttl_secs must be greater than zero".to_string());
        }

        if self.cookie_name.is_empty()
            || self
                .cookie_name
                .chars()
                .any(|c| c.is_whitespace() || matches!(c, '=' | ';' | ','))
        {
            return Err(format!("invalid cookie_name: {:?}", self.cookie_name));
        }

        if !self.cookie_path.starts_with('/') || self.cookie_path.contains(';') {
            return Err(format!("invalid cookie_path: {:?}", self.cookie_path));
        }

        if self.cleanup_interval_secs == 0 {
            return Err("cleanup_interval_secs must be greater than zero".to_string());
        }

        Ok(())
    }
}

/// JSON configuration overlay; only present keys are applied.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct SessionConfigJson {
    pub store_path: Option<String>,
    pub session_ttl_secs: Option<u64>,
    pub cookie_name: Option<String>,
    pub cookie_path: Option<String>,
    pub cookie_lifespan_secs: Option<u64>,
    pub cleanup_interval_secs: Option<u64>,
}

impl SessionConfigJson {
    /// Merge JSON config into existing config.
    pub fn apply_to(&self, config: &mut SessionConfig) {
        if let Some(ref path) = self.store_path {
            config.store_path = path.clone();
        }
        if let Some(ttl) = self.session_ttl_secs {
            config.session_ttl_secs = ttl;
        }
        if let Some(ref name) = self.cookie_name {
            config.cookie_name = name.clone();
        }
        if let Some(ref path) = self.cookie_path {
            config.cookie_path = path.clone();
        }
        if let Some(lifespan) = self.cookie_lifespan_secs {
            config.cookie_lifespan_secs = lifespan;
        }
        if let Some(interval) = self.cleanup_interval_secs {
            config.cleanup_interval_secs = interval;
        }
    }
}
