use std::sync::{Arc, LazyLock, RwLock, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use crate::utils::http::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};

fn default_listen_address() -> String {
    "0.0.0.0".to_string()
}

fn default_listen_port() -> u16 {
    7777
}

fn default_max_concur_threads() -> usize {
    4
}

fn default_database_path() -> String {
    "subprofile.db".to_string()
}

fn default_max_proxies() -> usize {
    1000
}

fn default_fetch_timeout() -> u64 {
    DEFAULT_TIMEOUT
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_info_log_level() -> String {
    "info".to_string()
}

fn default_admin() -> String {
    "admin".to_string()
}

fn default_true() -> bool {
    true
}

fn default_github_api() -> String {
    "https://api.github.com".to_string()
}

fn default_cache_duration() -> u64 {
    3600
}

fn default_github_timeout() -> u64 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
    /// Prefix under which every route is mounted, e.g. `/sub`.
    pub base_path: String,
    #[serde(default = "default_max_concur_threads")]
    pub max_concur_threads: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            listen_address: default_listen_address(),
            listen_port: default_listen_port(),
            base_path: String::new(),
            max_concur_threads: default_max_concur_threads(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    #[serde(default = "default_database_path")]
    pub path: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_database_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterSettings {
    #[serde(default = "default_max_proxies")]
    pub max_proxies: usize,
    /// Seconds allowed for fetching a remote subscription
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ConverterSettings {
    fn default() -> Self {
        ConverterSettings {
            max_proxies: default_max_proxies(),
            fetch_timeout: default_fetch_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    #[serde(default = "default_info_log_level")]
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        LogSettings {
            level: default_info_log_level(),
        }
    }
}

/// Account created on first start when the users table is empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultUserSettings {
    #[serde(default = "default_admin")]
    pub username: String,
    #[serde(default = "default_admin")]
    pub password: String,
}

impl Default for DefaultUserSettings {
    fn default() -> Self {
        DefaultUserSettings {
            username: default_admin(),
            password: default_admin(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_github_api")]
    pub api_url: String,
    pub owner: String,
    pub repo: String,
    /// Seconds a fetched answer is served from cache
    #[serde(default = "default_cache_duration")]
    pub cache_duration: u64,
    #[serde(default = "default_github_timeout")]
    pub timeout: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for GithubSettings {
    fn default() -> Self {
        GithubSettings {
            enabled: default_true(),
            api_url: default_github_api(),
            owner: String::new(),
            repo: String::new(),
            cache_duration: default_cache_duration(),
            timeout: default_github_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Settings structure to hold global configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub converter: ConverterSettings,
    pub log: LogSettings,
    pub default_user: DefaultUserSettings,
    pub github: GithubSettings,
    /// Path the settings were loaded from, empty for built-in defaults
    #[serde(skip)]
    pub pref_path: String,
}

// Global settings instance
static GLOBAL: LazyLock<RwLock<Arc<Settings>>> =
    LazyLock::new(|| RwLock::new(Arc::new(Settings::default())));

impl Settings {
    /// Snapshot of the active settings.
    pub fn current() -> Arc<Settings> {
        match GLOBAL.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Write access to the active settings, for command line overrides.
    pub fn current_mut() -> RwLockWriteGuard<'static, Arc<Settings>> {
        match GLOBAL.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn load_from_content(content: &str) -> Result<Self, toml::de::Error> {
        let mut settings: Settings = toml::from_str(content)?;
        if settings.server.listen_address.trim().is_empty() {
            settings.server.listen_address = default_listen_address();
        }
        settings.server.base_path = normalize_base_path(&settings.server.base_path);
        Ok(settings)
    }

    pub fn load_from_file(path: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let content = std::fs::read_to_string(path)?;
        let mut settings = Settings::load_from_content(&content)?;
        settings.pref_path = path.to_owned();
        Ok(settings)
    }
}

/// Turns `sub/`, `/sub/` or `/sub` into `/sub`; empty and `/` become empty.
pub fn normalize_base_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

/// Load settings from `path` into the global instance. An empty path keeps
/// the defaults.
pub fn init_settings(path: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if path.is_empty() {
        return Ok(());
    }
    let settings = Settings::load_from_file(path)?;
    *Settings::current_mut() = Arc::new(settings);
    Ok(())
}

pub fn update_settings_from_content(
    content: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = Settings::load_from_content(content)?;
    *Settings::current_mut() = Arc::new(settings);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::load_from_content("").unwrap();
        assert_eq!(settings.server.listen_port, 7777);
        assert_eq!(settings.server.base_path, "");
        assert_eq!(settings.converter.max_proxies, 1000);
        assert_eq!(settings.github.cache_duration, 3600);
        assert_eq!(settings.default_user.username, "admin");
    }

    #[test]
    fn test_normalize_base_path() {
        assert_eq!(normalize_base_path("sub/"), "/sub");
        assert_eq!(normalize_base_path("/"), "");
        assert_eq!(normalize_base_path(" /a/b/ "), "/a/b");
    }
}
