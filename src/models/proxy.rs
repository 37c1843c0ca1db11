use serde::{Deserialize, Serialize};

/// Port assumed when a link omits it.
pub const DEFAULT_PORT: u16 = 443;

/// Protocol specific part of a node, carrying only the secrets that
/// protocol understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProxyProtocol {
    Vless {
        uuid: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        flow: Option<String>,
    },
    Vmess {
        uuid: String,
        #[serde(default)]
        alter_id: u16,
        #[serde(default = "default_vmess_cipher")]
        cipher: String,
    },
    Trojan {
        password: String,
    },
    #[serde(rename = "ss")]
    Shadowsocks {
        cipher: String,
        password: String,
    },
}

fn default_vmess_cipher() -> String {
    "auto".to_string()
}

impl ProxyProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyProtocol::Vless { .. } => "vless",
            ProxyProtocol::Vmess { .. } => "vmess",
            ProxyProtocol::Trojan { .. } => "trojan",
            ProxyProtocol::Shadowsocks { .. } => "ss",
        }
    }
}

/// Stream transport between the client and the server.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "network", rename_all = "lowercase")]
pub enum Transport {
    #[default]
    Tcp,
    #[serde(rename = "ws")]
    WebSocket { path: String, host: String },
    Grpc {
        #[serde(default)]
        service_name: String,
    },
}

impl Transport {
    /// Builds a websocket transport, filling the conventional defaults:
    /// path `/` and the server itself as host header.
    pub fn websocket(path: Option<&str>, host: Option<&str>, server: &str) -> Self {
        Transport::WebSocket {
            path: path.filter(|p| !p.is_empty()).unwrap_or("/").to_string(),
            host: host.filter(|h| !h.is_empty()).unwrap_or(server).to_string(),
        }
    }

    pub fn is_tcp(&self) -> bool {
        matches!(self, Transport::Tcp)
    }
}

/// A decoded proxy endpoint, independent of the link format it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyNode {
    /// Display name, free to be edited by the caller after parsing.
    pub name: String,
    pub server: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub protocol: ProxyProtocol,
    #[serde(default)]
    pub transport: Transport,
    #[serde(default)]
    pub tls: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sni: Option<String>,
    #[serde(default)]
    pub udp: bool,
    #[serde(default)]
    pub skip_cert_verify: bool,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl ProxyNode {
    pub fn new(name: String, server: String, port: u16, protocol: ProxyProtocol) -> Self {
        ProxyNode {
            name,
            server,
            port,
            protocol,
            transport: Transport::Tcp,
            tls: false,
            sni: None,
            udp: false,
            skip_cert_verify: false,
        }
    }

    /// Short protocol tag, as it appears in the profile's `type` key.
    pub fn type_str(&self) -> &'static str {
        self.protocol.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_websocket_defaults() {
        assert_eq!(
            Transport::websocket(None, Some(""), "a.example"),
            Transport::WebSocket {
                path: "/".to_string(),
                host: "a.example".to_string()
            }
        );
    }

    #[test]
    fn test_node_json_shape() {
        let mut node = ProxyNode::new(
            "n1".to_string(),
            "1.2.3.4".to_string(),
            443,
            ProxyProtocol::Trojan {
                password: "pw".to_string(),
            },
        );
        node.tls = true;
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["protocol"]["type"], "trojan");
        assert_eq!(json["transport"]["network"], "tcp");
        assert!(json.get("sni").is_none());

        let back: ProxyNode = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn test_node_json_defaults() {
        let node: ProxyNode = serde_json::from_str(
            r#"{"name":"x","server":"h","protocol":{"type":"ss","cipher":"aes-128-gcm","password":"p"}}"#,
        )
        .unwrap();
        assert_eq!(node.port, DEFAULT_PORT);
        assert_eq!(node.transport, Transport::Tcp);
        assert!(!node.tls);
    }
}
