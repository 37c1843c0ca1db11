use std::collections::HashSet;

use log::{debug, warn};

use crate::models::ProxyNode;

/// Gives nodes without a name the `<type>-<server>` name a parser would
/// have produced.
fn fill_blank_name(node: &mut ProxyNode) {
    let trimmed = node.name.trim();
    if trimmed.is_empty() {
        node.name = format!("{}-{}", node.type_str(), node.server);
    } else if trimmed.len() != node.name.len() {
        node.name = trimmed.to_string();
    }
}

/// Makes display names unique by suffixing ` 2`, ` 3`... to repeats.
/// Clash rejects profiles where two proxies share a name, or where a proxy
/// shares a name with a group or a built-in policy.
fn dedupe_names(nodes: &mut [ProxyNode], reserved: &[&str]) {
    let mut seen: HashSet<String> = reserved.iter().map(|name| name.to_string()).collect();
    for node in nodes.iter_mut() {
        if seen.insert(node.name.clone()) {
            continue;
        }
        let mut index = 2;
        let renamed = loop {
            let candidate = format!("{} {}", node.name, index);
            if !seen.contains(&candidate) {
                break candidate;
            }
            index += 1;
        };
        debug!("Renaming duplicate node '{}' to '{}'", node.name, renamed);
        seen.insert(renamed.clone());
        node.name = renamed;
    }
}

/// Preprocesses nodes before they go into a profile. Names listed in
/// `reserved` are never handed to a node.
pub fn preprocess_nodes(nodes: &mut Vec<ProxyNode>, max_proxies: usize, reserved: &[&str]) {
    if max_proxies > 0 && nodes.len() > max_proxies {
        warn!(
            "Got {} nodes, keeping the first {}",
            nodes.len(),
            max_proxies
        );
        nodes.truncate(max_proxies);
    }

    nodes.iter_mut().for_each(fill_blank_name);
    dedupe_names(nodes, reserved);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProxyProtocol;

    fn node(name: &str) -> ProxyNode {
        ProxyNode::new(
            name.to_string(),
            "s.example".to_string(),
            443,
            ProxyProtocol::Trojan {
                password: "pw".to_string(),
            },
        )
    }

    #[test]
    fn test_preprocess_dedupes_and_fills() {
        let mut nodes = vec![node("HK"), node("HK"), node(" "), node("HK 2"), node("HK")];
        preprocess_nodes(&mut nodes, 0, &[]);

        let names: Vec<&str> = nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["HK", "HK 2", "trojan-s.example", "HK 2 2", "HK 3"]
        );
    }

    #[test]
    fn test_preprocess_truncates() {
        let mut nodes = vec![node("a"), node("b"), node("c")];
        preprocess_nodes(&mut nodes, 2, &[]);
        assert_eq!(nodes.len(), 2);
    }

    #[test]
    fn test_preprocess_avoids_reserved_names() {
        let mut nodes = vec![node("DIRECT"), node("Proxy"), node("Proxy"), node("HK")];
        preprocess_nodes(&mut nodes, 0, &["DIRECT", "REJECT", "Proxy"]);

        let names: Vec<&str> = nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["DIRECT 2", "Proxy 2", "Proxy 3", "HK"]);
    }
}
