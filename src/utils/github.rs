use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::settings::GithubSettings;
use crate::utils::cache::{Clock, SystemClock, TtlCache};
use crate::utils::http::{web_get_async, FetchOptions};

/// Repository summary shown by the management page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoInfo {
    pub full_name: String,
    pub description: Option<String>,
    pub html_url: String,
    pub stargazers_count: u64,
    pub forks_count: u64,
    pub open_issues_count: u64,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseInfo {
    pub tag_name: String,
    pub name: Option<String>,
    pub html_url: String,
    pub published_at: Option<String>,
    pub body: Option<String>,
}

const INFO_KEY: &str = "repo";
const RELEASE_KEY: &str = "release";

/// Read-only client for repository metadata, fronted by a TTL cache.
pub struct RepoMetadataClient<C: Clock = SystemClock> {
    settings: GithubSettings,
    cache: TtlCache<Value, C>,
}

impl RepoMetadataClient<SystemClock> {
    pub fn new(settings: GithubSettings) -> Self {
        Self::with_clock(settings, SystemClock)
    }
}

impl<C: Clock> RepoMetadataClient<C> {
    pub fn with_clock(settings: GithubSettings, clock: C) -> Self {
        let ttl = Duration::from_secs(settings.cache_duration);
        RepoMetadataClient {
            settings,
            cache: TtlCache::with_clock(ttl, clock),
        }
    }

    fn repo_url(&self) -> String {
        format!(
            "{}/repos/{}/{}",
            self.settings.api_url.trim_end_matches('/'),
            self.settings.owner,
            self.settings.repo
        )
    }

    async fn fetch_json(&self, key: &str, url: &str) -> Result<Value, String> {
        if !self.settings.enabled {
            return Err("repository lookup is disabled".to_string());
        }
        if let Some(cached) = self.cache.get(key) {
            return Ok(cached);
        }

        let options = FetchOptions::new(self.settings.timeout, &self.settings.user_agent)
            .header("Accept", "application/vnd.github+json");
        let (body, _) = web_get_async(url, &options).await.map_err(|e| {
            warn!("Repository lookup {} failed: {}", url, e);
            e
        })?;
        let value: Value =
            serde_json::from_str(&body).map_err(|e| format!("Invalid JSON from {}: {}", url, e))?;

        info!("Cached repository metadata for {}", key);
        self.cache.insert(key, value.clone());
        Ok(value)
    }

    pub async fn repo_info(&self) -> Result<RepoInfo, String> {
        let value = self.fetch_json(INFO_KEY, &self.repo_url()).await?;
        serde_json::from_value(value).map_err(|e| e.to_string())
    }

    pub async fn latest_release(&self) -> Result<ReleaseInfo, String> {
        let url = format!("{}/releases/latest", self.repo_url());
        let value = self.fetch_json(RELEASE_KEY, &url).await?;
        serde_json::from_value(value).map_err(|e| e.to_string())
    }

    /// Seeds the cache, mainly so callers can serve without network access.
    pub fn prime(&self, repo: Option<&RepoInfo>, release: Option<&ReleaseInfo>) {
        if let Some(value) = repo.and_then(|r| serde_json::to_value(r).ok()) {
            self.cache.insert(INFO_KEY, value);
        }
        if let Some(value) = release.and_then(|r| serde_json::to_value(r).ok()) {
            self.cache.insert(RELEASE_KEY, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::cache::ManualClock;

    fn settings() -> GithubSettings {
        GithubSettings {
            enabled: true,
            // Unroutable, so a cache miss fails fast instead of reaching out
            api_url: "http://127.0.0.1:9".to_string(),
            timeout: 1,
            ..GithubSettings::default()
        }
    }

    fn repo() -> RepoInfo {
        RepoInfo {
            full_name: "owner/repo".to_string(),
            description: Some("profiles".to_string()),
            html_url: "https://github.com/owner/repo".to_string(),
            stargazers_count: 10,
            forks_count: 2,
            open_issues_count: 0,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_serves_from_cache_until_expiry() {
        let clock = ManualClock::default();
        let client = RepoMetadataClient::with_clock(settings(), clock.clone());
        client.prime(Some(&repo()), None);

        assert_eq!(client.repo_info().await, Ok(repo()));

        clock.advance(Duration::from_secs(client.settings.cache_duration));
        assert!(client.repo_info().await.is_err());
    }

    #[tokio::test]
    async fn test_disabled() {
        let client = RepoMetadataClient::new(GithubSettings {
            enabled: false,
            ..settings()
        });
        client.prime(Some(&repo()), None);
        assert!(client.repo_info().await.is_err());
    }
}
