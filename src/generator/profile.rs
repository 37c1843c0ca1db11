use log::debug;

use super::exports::{convert_proxy_groups, proxy_to_clash};
use super::yaml::clash::ClashYamlOutput;
use crate::error::Result;
use crate::models::{ProxyGroupConfig, ProxyNode};

/// Renders profiles with the fixed general and DNS sections.
pub struct ProfileBuilder;

impl ProfileBuilder {
    /// Renders the YAML document. Nodes are written as given; nothing is
    /// probed for reachability.
    pub fn build(
        nodes: &[ProxyNode],
        rules: &[String],
        groups: &[ProxyGroupConfig],
    ) -> Result<String> {
        let output = ClashYamlOutput {
            proxies: proxy_to_clash(nodes),
            proxy_groups: convert_proxy_groups(groups),
            rules: rules.to_vec(),
            ..Default::default()
        };
        let document = serde_yaml::to_string(&output)?;
        debug!(
            "Rendered profile with {} proxies, {} groups, {} rules",
            nodes.len(),
            groups.len(),
            rules.len()
        );
        Ok(document)
    }
}
