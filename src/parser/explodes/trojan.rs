use std::collections::HashMap;

use url::Url;

use crate::models::{ProxyNode, ProxyProtocol, Transport, DEFAULT_PORT};
use crate::parser::types::{ParseFailure, ParseResult};
use crate::utils::url::{bare_host, url_decode};

const SCHEME: &str = "trojan";

/// Parse a Trojan link
/// Format: trojan://password@server:port?sni=...&remarks=...#remark
pub fn explode_trojan(link: &str) -> ParseResult {
    let (body, fragment) = match link.split_once('#') {
        Some((body, fragment)) => (body, url_decode(fragment)),
        None => (link, String::new()),
    };

    let url = Url::parse(body).map_err(|e| ParseFailure::malformed(SCHEME, e))?;

    let password = url_decode(url.username());
    if password.is_empty() {
        return Err(ParseFailure::missing(SCHEME, "password"));
    }
    let server = match url.host_str().map(bare_host) {
        Some(host) if !host.is_empty() => host.to_string(),
        _ => return Err(ParseFailure::missing(SCHEME, "server")),
    };
    let port = url.port().unwrap_or(DEFAULT_PORT);

    let params: HashMap<String, String> = url.query_pairs().into_owned().collect();
    let param = |key: &str| params.get(key).filter(|v| !v.is_empty()).cloned();

    let name = param("remarks")
        .or_else(|| Some(fragment).filter(|f| !f.is_empty()))
        .unwrap_or_else(|| format!("trojan-{}", server));

    let transport = match param("type").as_deref() {
        Some("ws") => Transport::websocket(
            param("path").as_deref(),
            param("host").as_deref(),
            &server,
        ),
        Some("grpc") => Transport::Grpc {
            service_name: param("serviceName").unwrap_or_default(),
        },
        _ => Transport::Tcp,
    };

    let mut node = ProxyNode::new(name, server, port, ProxyProtocol::Trojan { password });
    node.transport = transport;
    node.tls = true;
    node.sni = param("sni").or_else(|| param("peer"));
    node.skip_cert_verify = true;
    Ok(node)
}
