use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::headers::{retrieval_headers, safe_display_name, HeaderList};
use crate::error::{Error, Result};
use crate::generator::ProfileBuilder;
use crate::models::subscription::DEFAULT_UPDATE_INTERVAL_HOURS;
use crate::models::{ProxyNode, SubscriptionMeta};
use crate::parser::{explode_batch, explode_sub, ParseOutcome};
use crate::rulesets::RuleCatalog;
use crate::settings::Settings;
use crate::storage::token::is_valid_token;
use crate::storage::SubscriptionStore;
use crate::utils::http::{web_get_async, FetchOptions};
use crate::utils::node_manip::preprocess_nodes;

fn default_rule() -> String {
    "default".to_string()
}

fn default_true() -> bool {
    true
}

fn default_update_interval() -> u32 {
    DEFAULT_UPDATE_INTERVAL_HOURS
}

/// What to build and how to advertise it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionOptions {
    /// Rule set name; unknown names fall back to the default rule set
    #[serde(default = "default_rule")]
    pub rule: String,
    #[serde(default)]
    pub config_name: Option<String>,
    #[serde(default = "default_true")]
    pub auto_update: bool,
    #[serde(default = "default_update_interval")]
    pub update_interval_hours: u32,
    #[serde(default)]
    pub traffic_limit_gb: u64,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        ConversionOptions {
            rule: default_rule(),
            config_name: None,
            auto_update: true,
            update_interval_hours: DEFAULT_UPDATE_INTERVAL_HOURS,
            traffic_limit_gb: 0,
        }
    }
}

impl ConversionOptions {
    pub fn rule(mut self, rule: &str) -> Self {
        self.rule = rule.to_string();
        self
    }

    pub fn config_name(mut self, name: &str) -> Self {
        self.config_name = Some(name.to_string());
        self
    }

    /// Fills in `name` when the caller did not choose a display name.
    pub fn config_name_or(mut self, name: &str) -> Self {
        if self.config_name.as_deref().map_or(true, |n| n.trim().is_empty()) {
            self.config_name = Some(name.to_string());
        }
        self
    }

    fn meta(&self) -> SubscriptionMeta {
        SubscriptionMeta {
            display_name: self.config_name.clone(),
            auto_update: self.auto_update,
            update_interval_hours: self.update_interval_hours,
            traffic_limit_gb: self.traffic_limit_gb,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionResult {
    pub token: String,
    pub proxies_count: usize,
    /// Links that could not be parsed
    pub failures: usize,
    /// Rule set actually used, after fallback
    pub rule: String,
    pub auto_update: bool,
    pub update_interval_hours: u32,
    pub traffic_limit_gb: u64,
}

/// A stored profile ready to be served.
#[derive(Debug, Clone)]
pub struct ProfileResponse {
    pub document: String,
    pub display_name: String,
    pub headers: HeaderList,
}

/// Runs link parsing, rule resolution, rendering and storage as one step.
#[derive(Clone)]
pub struct Converter {
    store: SubscriptionStore,
    catalog: RuleCatalog,
    max_proxies: usize,
}

impl Converter {
    pub fn new(store: SubscriptionStore, catalog: RuleCatalog, max_proxies: usize) -> Self {
        Converter {
            store,
            catalog,
            max_proxies,
        }
    }

    pub fn convert_links<S: AsRef<str>>(
        &self,
        links: &[S],
        options: &ConversionOptions,
    ) -> Result<ConversionResult> {
        if links.iter().all(|link| link.as_ref().trim().is_empty()) {
            return Err(Error::Validation("No links given".to_string()));
        }
        self.convert_outcome(explode_batch(links), options, "No valid proxy links")
    }

    /// Builds a profile from nodes the caller may have edited after parsing.
    pub fn generate_from_nodes(
        &self,
        nodes: Vec<ProxyNode>,
        options: &ConversionOptions,
    ) -> Result<ConversionResult> {
        let outcome = ParseOutcome { nodes, failures: 0 };
        self.convert_outcome(outcome, options, "No valid nodes")
    }

    /// Downloads and parses a subscription body. No storage is touched.
    pub async fn fetch_subscription(url: &str) -> Result<ParseOutcome> {
        let url = url.trim();
        if url.is_empty() {
            return Err(Error::Validation("Missing subscription URL".to_string()));
        }
        let settings = Settings::current();
        let options = FetchOptions::new(
            settings.converter.fetch_timeout,
            &settings.converter.user_agent,
        );
        let (body, _) = web_get_async(url, &options)
            .await
            .map_err(Error::ExternalFetch)?;
        let outcome = explode_sub(&body);
        debug!(
            "Subscription {} gave {} nodes, {} bad links",
            url,
            outcome.nodes.len(),
            outcome.failures
        );
        Ok(outcome)
    }

    pub async fn convert_subscription(
        &self,
        url: &str,
        options: &ConversionOptions,
    ) -> Result<ConversionResult> {
        let outcome = Self::fetch_subscription(url).await?;
        let converter = self.clone();
        let options = options.clone();
        tokio::task::spawn_blocking(move || {
            converter.convert_outcome(outcome, &options, "No valid proxies in subscription")
        })
        .await
        .map_err(|e| Error::Storage(format!("conversion task failed: {}", e)))?
    }

    fn convert_outcome(
        &self,
        outcome: ParseOutcome,
        options: &ConversionOptions,
        empty_message: &str,
    ) -> Result<ConversionResult> {
        let ParseOutcome {
            mut nodes,
            failures,
        } = outcome;
        if nodes.is_empty() {
            return Err(Error::Validation(empty_message.to_string()));
        }
        if failures > 0 {
            warn!("{} links could not be parsed", failures);
        }

        let resolved = self.catalog.resolve(&options.rule);
        preprocess_nodes(
            &mut nodes,
            self.max_proxies,
            &resolved.template.reserved_names(),
        );
        let names: Vec<String> = nodes.iter().map(|node| node.name.clone()).collect();
        let groups = self.catalog.build_groups(&names, resolved.template);
        let document = ProfileBuilder::build(&nodes, &resolved.rules, &groups)?;

        let token = self.store.save(&document, nodes.len(), &options.meta())?;
        info!(
            "Converted {} nodes with rule set '{}' into {}",
            nodes.len(),
            resolved.name,
            token
        );
        Ok(ConversionResult {
            token,
            proxies_count: nodes.len(),
            failures,
            rule: resolved.name,
            auto_update: options.auto_update,
            update_interval_hours: options.update_interval_hours,
            traffic_limit_gb: options.traffic_limit_gb,
        })
    }

    pub fn fetch_profile(&self, token: &str) -> Result<ProfileResponse> {
        if !is_valid_token(token) {
            return Err(Error::NotFound(format!("subscription {}", token)));
        }
        let record = self.store.get(token)?;
        let display_name = safe_display_name(&record.display_name, &record.token);
        let headers = retrieval_headers(
            &display_name,
            record.auto_update,
            record.update_interval_hours,
            record.traffic_limit_gb,
        );
        Ok(ProfileResponse {
            document: record.document,
            display_name,
            headers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;
    use std::sync::Arc;

    const VLESS: &str = "vless://b831381d-6324-4d53-ad4f-8cda48b30811@v.example.com:443?security=tls&type=ws&path=%2Fws#HK";
    const TROJAN: &str = "trojan://pw@t.example.com:443#HK";

    fn converter(max_proxies: usize) -> Converter {
        let db = Arc::new(Database::open_in_memory().unwrap());
        Converter::new(
            SubscriptionStore::new(db.clone()),
            RuleCatalog::new(db),
            max_proxies,
        )
    }

    #[test]
    fn test_convert_links_skips_bad_links() {
        let converter = converter(1000);
        let links = [VLESS, "ss://bm9hdA", "", TROJAN];
        let result = converter
            .convert_links(&links, &ConversionOptions::default())
            .unwrap();
        assert_eq!(result.proxies_count, 2);
        assert_eq!(result.failures, 1);
        assert_eq!(result.rule, "Default Routing (Chinese Interface)");
        assert_eq!(result.token.len(), 16);

        let profile = converter.fetch_profile(&result.token).unwrap();
        let parsed: serde_yaml::Value = serde_yaml::from_str(&profile.document).unwrap();
        assert_eq!(parsed["proxies"][0]["name"], "HK");
        assert_eq!(parsed["proxies"][1]["name"], "HK 2");
        assert_eq!(parsed["proxy-groups"][0]["name"], "🚀 节点选择");
    }

    #[test]
    fn test_node_names_never_shadow_groups() {
        let converter = converter(1000);
        let links = [
            "trojan://pw@a.example:443#DIRECT",
            "trojan://pw@b.example:443#%F0%9F%9A%80%20%E8%8A%82%E7%82%B9%E9%80%89%E6%8B%A9",
        ];
        let result = converter
            .convert_links(&links, &ConversionOptions::default())
            .unwrap();

        let profile = converter.fetch_profile(&result.token).unwrap();
        let parsed: serde_yaml::Value = serde_yaml::from_str(&profile.document).unwrap();
        assert_eq!(parsed["proxies"][0]["name"], "DIRECT 2");
        assert_eq!(parsed["proxies"][1]["name"], "🚀 节点选择 2");

        let top = &parsed["proxy-groups"][0];
        assert_eq!(top["name"], "🚀 节点选择");
        let members: Vec<&str> = top["proxies"]
            .as_sequence()
            .unwrap()
            .iter()
            .map(|m| m.as_str().unwrap())
            .collect();
        assert_eq!(
            members,
            vec!["♻️ 自动选择", "DIRECT", "DIRECT 2", "🚀 节点选择 2"]
        );
    }

    #[test]
    fn test_convert_links_requires_a_node() {
        let converter = converter(1000);
        let empty: [&str; 1] = [" "];
        assert!(matches!(
            converter.convert_links(&empty, &ConversionOptions::default()),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            converter.convert_links(&["ftp://x"], &ConversionOptions::default()),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_generate_from_nodes_truncates() {
        let converter = converter(1);
        let nodes = explode_batch([VLESS, TROJAN]).nodes;
        let options = ConversionOptions::default()
            .rule("Minimal Rules")
            .config_name("Office");
        let result = converter.generate_from_nodes(nodes, &options).unwrap();
        assert_eq!(result.proxies_count, 1);
        assert_eq!(result.rule, "Minimal Rules");

        let profile = converter.fetch_profile(&result.token).unwrap();
        assert_eq!(profile.display_name, "Office");
        assert!(profile
            .headers
            .contains(&("profile-update-interval", "24".to_string())));
    }

    #[test]
    fn test_fetch_profile_unknown() {
        assert!(matches!(
            converter(10).fetch_profile("ffffffffffffffff"),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            converter(10).fetch_profile("../../etc/passwd"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_options_from_json() {
        let options: ConversionOptions =
            serde_json::from_str(r#"{"config_name":"x","traffic_limit_gb":5}"#).unwrap();
        assert_eq!(options.rule, "default");
        assert!(options.auto_update);
        assert_eq!(options.update_interval_hours, 24);
        assert_eq!(options.traffic_limit_gb, 5);
        assert_eq!(
            ConversionOptions::default()
                .config_name_or("Fallback")
                .config_name,
            Some("Fallback".to_string())
        );
    }

    #[tokio::test]
    async fn test_convert_subscription_rejects_empty_url() {
        assert!(matches!(
            converter(10)
                .convert_subscription("  ", &ConversionOptions::default())
                .await,
            Err(Error::Validation(_))
        ));
    }
}
