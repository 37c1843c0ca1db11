use serde_json::Value;

use crate::models::{ProxyNode, ProxyProtocol, Transport, DEFAULT_PORT};
use crate::parser::types::{ParseFailure, ParseResult};
use crate::utils::base64::base64_decode_lenient;

const SCHEME: &str = "vmess";

/// Reads a JSON field that clients emit either as a string or as a number.
/// Whole floats such as `443.0` read as integers.
fn json_string(json: &Value, key: &str) -> Option<String> {
    match &json[key] {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => match (n.as_u64(), n.as_f64()) {
            (Some(whole), _) => Some(whole.to_string()),
            (None, Some(f)) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => {
                Some((f as u64).to_string())
            }
            _ => Some(n.to_string()),
        },
        _ => None,
    }
}

/// Parse a VMess link into a node
/// Format: vmess://base64({"ps":..,"add":..,"port":..,"id":..,"aid":..,"net":..})
pub fn explode_vmess(link: &str) -> ParseResult {
    let encoded = link
        .strip_prefix("vmess://")
        .ok_or_else(|| ParseFailure::UnsupportedScheme(link.to_string()))?;

    let decoded = base64_decode_lenient(encoded).map_err(|e| ParseFailure::malformed(SCHEME, e))?;
    let decoded = String::from_utf8(decoded).map_err(|e| ParseFailure::malformed(SCHEME, e))?;

    let json: Value =
        serde_json::from_str(&decoded).map_err(|e| ParseFailure::malformed(SCHEME, e))?;
    if !json.is_object() {
        return Err(ParseFailure::malformed(SCHEME, "payload is not a JSON object"));
    }

    let server = json_string(&json, "add").ok_or_else(|| ParseFailure::missing(SCHEME, "add"))?;
    let uuid = json_string(&json, "id").ok_or_else(|| ParseFailure::missing(SCHEME, "id"))?;

    let port = match json_string(&json, "port") {
        Some(port) => port
            .parse::<u16>()
            .map_err(|e| ParseFailure::malformed(SCHEME, format!("port {}: {}", port, e)))?,
        None => DEFAULT_PORT,
    };
    let alter_id = json_string(&json, "aid")
        .and_then(|aid| aid.parse::<u16>().ok())
        .unwrap_or(0);
    let cipher = json_string(&json, "scy").unwrap_or_else(|| "auto".to_string());
    let name = json_string(&json, "ps").unwrap_or_else(|| format!("vmess-{}", server));

    let path = json_string(&json, "path");
    let host = json_string(&json, "host");
    let transport = match json_string(&json, "net").as_deref() {
        Some("ws") => Transport::websocket(path.as_deref(), host.as_deref(), &server),
        Some("grpc") => Transport::Grpc {
            service_name: path.unwrap_or_default(),
        },
        _ => Transport::Tcp,
    };

    let tls = json_string(&json, "tls").as_deref() == Some("tls");

    let mut node = ProxyNode::new(
        name,
        server,
        port,
        ProxyProtocol::Vmess {
            uuid,
            alter_id,
            cipher,
        },
    );
    node.transport = transport;
    node.tls = tls;
    node.sni = if tls { json_string(&json, "sni") } else { None };
    node.skip_cert_verify = true;
    Ok(node)
}
