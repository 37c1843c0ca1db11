use log::{debug, warn};

use crate::parser::types::{ParseFailure, ParseOutcome, ParseResult};
use crate::utils::base64::base64_decode_text;

/// Explode a proxy link into a node
///
/// This function detects the type of proxy link and calls the appropriate parser
pub fn explode(link: &str) -> ParseResult {
    let link = link.trim();

    if link.starts_with("vless://") {
        super::vless::explode_vless(link)
    } else if link.starts_with("vmess://") {
        super::vmess::explode_vmess(link)
    } else if link.starts_with("trojan://") {
        super::trojan::explode_trojan(link)
    } else if link.starts_with("ss://") {
        super::ss::explode_ss(link)
    } else {
        let scheme = link.split("://").next().unwrap_or_default();
        Err(ParseFailure::UnsupportedScheme(scheme.to_string()))
    }
}

/// Explode a list of links, keeping every node that parses.
///
/// Blank entries are skipped silently; every other failure is logged and
/// counted, never propagated.
pub fn explode_batch<I, S>(links: I) -> ParseOutcome
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    links
        .into_iter()
        .filter(|link| !link.as_ref().trim().is_empty())
        .fold(ParseOutcome::default(), |mut outcome, link| {
            match explode(link.as_ref()) {
                Ok(node) => outcome.nodes.push(node),
                Err(err) => {
                    warn!("Skipping link: {}", err);
                    outcome.failures += 1;
                }
            }
            outcome
        })
}

/// Explode a subscription body into nodes
///
/// The body is tried as base64 first; if that fails it is taken as plain
/// newline separated links.
pub fn explode_sub(sub: &str) -> ParseOutcome {
    let sub = sub.trim();

    let decoded = match base64_decode_text(sub) {
        Some(decoded) => {
            debug!("Subscription body decoded as base64");
            decoded
        }
        None => sub.to_string(),
    };

    explode_batch(decoded.lines())
}
