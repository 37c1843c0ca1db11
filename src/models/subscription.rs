use serde::{Deserialize, Serialize};

pub const DEFAULT_UPDATE_INTERVAL_HOURS: u32 = 24;

/// Metadata advertised to clients alongside a stored profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionMeta {
    pub display_name: Option<String>,
    #[serde(default = "default_true")]
    pub auto_update: bool,
    #[serde(default = "default_update_interval")]
    pub update_interval_hours: u32,
    #[serde(default)]
    pub traffic_limit_gb: u64,
}

fn default_true() -> bool {
    true
}

fn default_update_interval() -> u32 {
    DEFAULT_UPDATE_INTERVAL_HOURS
}

impl Default for SubscriptionMeta {
    fn default() -> Self {
        SubscriptionMeta {
            display_name: None,
            auto_update: true,
            update_interval_hours: DEFAULT_UPDATE_INTERVAL_HOURS,
            traffic_limit_gb: 0,
        }
    }
}

/// A generated profile persisted under its token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionRecord {
    pub token: String,
    pub document: String,
    pub display_name: String,
    pub proxies_count: usize,
    pub auto_update: bool,
    pub update_interval_hours: u32,
    pub traffic_limit_gb: u64,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub token: String,
    pub display_name: String,
    pub proxies_count: usize,
    pub created_at: String,
}

/// Name stored when the caller gave none.
pub fn default_display_name(token: &str) -> String {
    format!("config_{}", token)
}
