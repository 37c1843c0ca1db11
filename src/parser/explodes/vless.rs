use std::collections::HashMap;

use url::Url;

use crate::models::{ProxyNode, ProxyProtocol, Transport, DEFAULT_PORT};
use crate::parser::types::{ParseFailure, ParseResult};
use crate::utils::url::{bare_host, url_decode};

const SCHEME: &str = "vless";

/// Parse a VLESS link
/// Format: vless://uuid@server:port?type=ws&security=tls&sni=...#remark
pub fn explode_vless(link: &str) -> ParseResult {
    // The fragment is split off by hand so that `#` inside it survives intact
    let (body, fragment) = match link.split_once('#') {
        Some((body, fragment)) => (body, url_decode(fragment)),
        None => (link, String::new()),
    };

    let url = Url::parse(body).map_err(|e| ParseFailure::malformed(SCHEME, e))?;

    let uuid = url_decode(url.username());
    if uuid.is_empty() {
        return Err(ParseFailure::missing(SCHEME, "uuid"));
    }
    let server = match url.host_str().map(bare_host) {
        Some(host) if !host.is_empty() => host.to_string(),
        _ => return Err(ParseFailure::missing(SCHEME, "server")),
    };
    let port = url.port().unwrap_or(DEFAULT_PORT);

    let params: HashMap<String, String> = url.query_pairs().into_owned().collect();
    let param = |key: &str| params.get(key).map(String::as_str).filter(|v| !v.is_empty());

    let transport = match param("type") {
        Some("ws") => Transport::websocket(param("path"), param("host"), &server),
        Some("grpc") => Transport::Grpc {
            service_name: param("serviceName").unwrap_or_default().to_string(),
        },
        _ => Transport::Tcp,
    };

    let tls = param("security") == Some("tls");
    let sni = if tls { param("sni").map(str::to_string) } else { None };
    let flow = if tls && transport.is_tcp() {
        param("flow").map(str::to_string)
    } else {
        None
    };

    let name = if !fragment.is_empty() {
        fragment
    } else if let Some(remarks) = param("remarks") {
        remarks.to_string()
    } else {
        format!("vless-{}", server)
    };

    let mut node = ProxyNode::new(name, server, port, ProxyProtocol::Vless { uuid, flow });
    node.transport = transport;
    node.tls = tls;
    node.sni = sni;
    node.udp = true;
    node.skip_cert_verify = true;
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    const UUID: &str = "b831381d-6324-4d53-ad4f-8cda48b30811";

    #[test]
    fn test_explode_vless_ws_tls() {
        let link = format!(
            "vless://{}@example.com:8443?type=ws&path=%2Fray&host=cdn.example.com&security=tls&sni=sni.example.com#My%20Node",
            UUID
        );
        let node = explode_vless(&link).unwrap();

        assert_eq!(node.name, "My Node");
        assert_eq!(node.server, "example.com");
        assert_eq!(node.port, 8443);
        assert_eq!(
            node.protocol,
            ProxyProtocol::Vless {
                uuid: UUID.to_string(),
                flow: None
            }
        );
        assert_eq!(
            node.transport,
            Transport::WebSocket {
                path: "/ray".to_string(),
                host: "cdn.example.com".to_string()
            }
        );
        assert!(node.tls);
        assert_eq!(node.sni, Some("sni.example.com".to_string()));
        assert!(node.udp);
    }

    #[test]
    fn test_explode_vless_defaults() {
        let node = explode_vless(&format!("vless://{}@1.2.3.4?type=ws", UUID)).unwrap();

        assert_eq!(node.port, 443);
        assert_eq!(node.name, "vless-1.2.3.4");
        assert_eq!(
            node.transport,
            Transport::WebSocket {
                path: "/".to_string(),
                host: "1.2.3.4".to_string()
            }
        );
        assert!(!node.tls);
        assert_eq!(node.sni, None);
    }

    #[test]
    fn test_explode_vless_remarks_param() {
        let node =
            explode_vless(&format!("vless://{}@h.example:443?remarks=From%20Query", UUID)).unwrap();
        assert_eq!(node.name, "From Query");
    }

    #[test]
    fn test_explode_vless_flow_only_on_tcp_tls() {
        let tcp = explode_vless(&format!(
            "vless://{}@h.example:443?security=tls&flow=xtls-rprx-vision",
            UUID
        ))
        .unwrap();
        assert_eq!(
            tcp.protocol,
            ProxyProtocol::Vless {
                uuid: UUID.to_string(),
                flow: Some("xtls-rprx-vision".to_string())
            }
        );

        let grpc = explode_vless(&format!(
            "vless://{}@h.example:443?type=grpc&serviceName=svc&security=tls&flow=xtls-rprx-vision",
            UUID
        ))
        .unwrap();
        assert_eq!(
            grpc.transport,
            Transport::Grpc {
                service_name: "svc".to_string()
            }
        );
        assert_eq!(
            grpc.protocol,
            ProxyProtocol::Vless {
                uuid: UUID.to_string(),
                flow: None
            }
        );

        let plain = explode_vless(&format!(
            "vless://{}@h.example:443?flow=xtls-rprx-vision",
            UUID
        ))
        .unwrap();
        assert!(matches!(plain.protocol, ProxyProtocol::Vless { flow: None, .. }));
    }

    #[test]
    fn test_explode_vless_unicode_fragment() {
        let node = explode_vless(&format!(
            "vless://{}@h.example:443#%F0%9F%87%AD%F0%9F%87%B0%20%E9%A6%99%E6%B8%AF",
            UUID
        ))
        .unwrap();
        assert_eq!(node.name, "🇭🇰 香港");
    }

    #[test]
    fn test_explode_vless_missing_uuid() {
        assert_eq!(
            explode_vless("vless://h.example:443"),
            Err(ParseFailure::missing(SCHEME, "uuid"))
        );
    }

    #[test]
    fn test_explode_vless_bad_port() {
        assert!(matches!(
            explode_vless(&format!("vless://{}@h.example:99999", UUID)),
            Err(ParseFailure::MalformedEncoding { .. })
        ));
    }
}
