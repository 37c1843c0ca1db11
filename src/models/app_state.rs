use std::sync::Arc;

use log::warn;

use crate::interfaces::Converter;
use crate::rulesets::RuleCatalog;
use crate::settings::{normalize_base_path, Settings};
use crate::storage::accounts::AccountStore;
use crate::storage::runtime_config::{RuntimeConfig, BASE_PATH_KEY};
use crate::storage::{Database, SubscriptionStore};
use crate::utils::github::RepoMetadataClient;

/// Application state structure for the web server
pub struct AppState {
    pub subscriptions: SubscriptionStore,
    pub catalog: RuleCatalog,
    pub converter: Converter,
    pub accounts: AccountStore,
    pub runtime_config: RuntimeConfig,
    pub github: RepoMetadataClient,
    /// Base path from the settings file, used when no runtime override is set
    configured_base_path: String,
}

impl AppState {
    pub fn new(db: Arc<Database>, settings: &Settings) -> Self {
        let subscriptions = SubscriptionStore::new(db.clone());
        let catalog = RuleCatalog::new(db.clone());
        let converter = Converter::new(
            subscriptions.clone(),
            catalog.clone(),
            settings.converter.max_proxies,
        );
        Self {
            subscriptions,
            catalog,
            converter,
            accounts: AccountStore::new(db.clone()),
            runtime_config: RuntimeConfig::new(db),
            github: RepoMetadataClient::new(settings.github.clone()),
            configured_base_path: settings.server.base_path.clone(),
        }
    }

    /// Path prefix for generated subscription URLs: the runtime override if
    /// one is stored, otherwise the configured base path.
    pub fn base_path(&self) -> String {
        match self.runtime_config.get::<String>(BASE_PATH_KEY) {
            Ok(Some(path)) => normalize_base_path(&path),
            Ok(None) => self.configured_base_path.clone(),
            Err(err) => {
                warn!("Failed to read base path override: {}", err);
                self.configured_base_path.clone()
            }
        }
    }

    /// Public URL of a stored profile.
    pub fn subscription_url(&self, scheme: &str, host: &str, token: &str) -> String {
        format!("{}://{}{}/clash/{}", scheme, host, self.base_path(), token)
    }
}
