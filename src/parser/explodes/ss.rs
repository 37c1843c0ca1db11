use crate::models::{ProxyNode, ProxyProtocol};
use crate::parser::types::{ParseFailure, ParseResult};
use crate::utils::base64::base64_decode_text;
use crate::utils::url::{bare_host, url_decode};

const SCHEME: &str = "ss";

/// Splits `server:port`, tolerating a bracketed IPv6 host.
fn split_server_port(authority: &str) -> Result<(String, u16), ParseFailure> {
    let (server, port) = authority
        .rsplit_once(':')
        .ok_or_else(|| ParseFailure::missing(SCHEME, "port"))?;
    let server = bare_host(server.trim());
    if server.is_empty() {
        return Err(ParseFailure::missing(SCHEME, "server"));
    }
    let port = port
        .trim()
        .parse::<u16>()
        .map_err(|e| ParseFailure::malformed(SCHEME, format!("port {}: {}", port, e)))?;
    Ok((server.to_string(), port))
}

/// Splits `method:password`; the password may itself contain `:`.
fn split_user_info(user_info: &str) -> Result<(String, String), ParseFailure> {
    let (method, password) = user_info
        .split_once(':')
        .ok_or_else(|| ParseFailure::malformed(SCHEME, "user info is not method:password"))?;
    if method.is_empty() {
        return Err(ParseFailure::missing(SCHEME, "method"));
    }
    Ok((method.to_string(), password.to_string()))
}

/// Parse a Shadowsocks link into a node
///
/// Two encodings are accepted:
/// - SIP002: `ss://base64(method:password)@server:port[/?plugin=...][#remark]`
/// - legacy: `ss://base64(method:password@server:port)[#remark]`
///
/// Base64 parts may come without padding or in the URL-safe alphabet.
pub fn explode_ss(link: &str) -> ParseResult {
    let content = link
        .strip_prefix("ss://")
        .ok_or_else(|| ParseFailure::UnsupportedScheme(link.to_string()))?;

    // Fragment and query never carry anything the node keeps
    let content = content.split('#').next().unwrap_or_default();

    let (user_info, authority) = match content.rsplit_once('@') {
        Some((encoded, authority)) => {
            let user_info = base64_decode_text(encoded)
                .unwrap_or_else(|| url_decode(encoded));
            (user_info, authority.to_string())
        }
        None => {
            let decoded = base64_decode_text(content.split(['/', '?']).next().unwrap_or_default())
                .ok_or_else(|| ParseFailure::malformed(SCHEME, "missing '@' and not base64"))?;
            match decoded.rsplit_once('@') {
                Some((user_info, authority)) => (user_info.to_string(), authority.to_string()),
                None => return Err(ParseFailure::malformed(SCHEME, "missing '@'")),
            }
        }
    };

    let authority = authority
        .split(['/', '?'])
        .next()
        .unwrap_or_default();
    let (server, port) = split_server_port(authority)?;
    let (cipher, password) = split_user_info(&user_info)?;

    Ok(ProxyNode::new(
        format!("ss-{}", server),
        server,
        port,
        ProxyProtocol::Shadowsocks { cipher, password },
    ))
}
