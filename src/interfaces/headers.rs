//! Response headers for profile retrieval.
//!
//! Clash clients read the profile name from `profile-title` or
//! `Content-Disposition`, the refresh period from `profile-update-interval`
//! and the quota from `subscription-userinfo`.

use crate::utils::url_encode;

/// Byte length above which a display name is shortened.
const MAX_NAME_BYTES: usize = 200;
/// Characters kept from an over-long display name.
const SHORTENED_NAME_CHARS: usize = 50;

const GIB: u64 = 1024 * 1024 * 1024;

pub type HeaderList = Vec<(&'static str, String)>;

/// Makes a stored display name safe for use as a file name.
pub fn safe_display_name(name: &str, token: &str) -> String {
    let name = name
        .strip_suffix(".yaml")
        .or_else(|| name.strip_suffix(".yml"))
        .unwrap_or(name);

    let safe: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '/' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if safe.trim().is_empty() {
        return format!("clash_{}", token);
    }
    if safe.len() > MAX_NAME_BYTES {
        let head: String = safe.chars().take(SHORTENED_NAME_CHARS).collect();
        return format!("{}_{}", head, token);
    }
    safe
}

/// `Content-Disposition` value for an already sanitized name.
pub fn content_disposition(name: &str) -> String {
    if !name.is_ascii() || name.contains(' ') {
        format!("inline; filename*=UTF-8''{}", url_encode(name))
    } else if name.contains('"') || name.contains('\\') {
        let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
        format!("inline; filename=\"{}\"", escaped)
    } else {
        format!("inline; filename={}", name)
    }
}

/// Headers describing a subscription; `display_name` must already have gone
/// through [`safe_display_name`].
pub fn subscription_headers(
    display_name: &str,
    auto_update: bool,
    interval_hours: u32,
    traffic_limit_gb: u64,
) -> HeaderList {
    let mut headers: HeaderList = vec![
        ("Content-Disposition", content_disposition(display_name)),
        ("profile-title", url_encode(display_name)),
    ];
    if auto_update {
        headers.push(("profile-update-interval", interval_hours.to_string()));
    }
    if traffic_limit_gb > 0 {
        headers.push((
            "subscription-userinfo",
            format!(
                "upload=0; download=0; total={}",
                traffic_limit_gb.saturating_mul(GIB)
            ),
        ));
    }
    headers
}

/// Full header set of a profile retrieval response.
pub fn retrieval_headers(
    display_name: &str,
    auto_update: bool,
    interval_hours: u32,
    traffic_limit_gb: u64,
) -> HeaderList {
    let mut headers: HeaderList = vec![
        ("Content-Type", "text/yaml; charset=utf-8".to_string()),
        ("Cache-Control", "no-cache".to_string()),
        ("Access-Control-Allow-Origin", "*".to_string()),
        ("Access-Control-Allow-Headers", "Content-Type".to_string()),
    ];
    headers.extend(subscription_headers(
        display_name,
        auto_update,
        interval_hours,
        traffic_limit_gb,
    ));
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header<'a>(headers: &'a HeaderList, key: &str) -> Option<&'a str> {
        headers
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_safe_display_name() {
        assert_eq!(safe_display_name("office.yaml", "t"), "office");
        assert_eq!(safe_display_name("office.yml", "t"), "office");
        assert_eq!(safe_display_name("a/b:c?", "t"), "a_b_c_");
        assert_eq!(safe_display_name("  ", "abc"), "clash_abc");
        assert_eq!(safe_display_name(".yaml", "abc"), "clash_abc");

        let long = "节".repeat(100);
        let shortened = safe_display_name(&long, "tok");
        assert_eq!(shortened, format!("{}_tok", "节".repeat(50)));
    }

    #[test]
    fn test_control_characters_replaced() {
        let safe = safe_display_name("a\nb\x7f", "t");
        assert_eq!(safe, "a_b_");
        assert_eq!(safe_display_name("\r\n", "abc"), "__");

        let headers = subscription_headers(&safe_display_name("Team\tA\u{0}", "t"), true, 24, 0);
        for (key, value) in &headers {
            assert!(
                reqwest::header::HeaderValue::from_str(value).is_ok(),
                "{} is not a valid header value: {:?}",
                key,
                value
            );
        }
    }

    #[test]
    fn test_content_disposition_forms() {
        assert_eq!(content_disposition("Office"), "inline; filename=Office");
        assert_eq!(
            content_disposition("My Sub"),
            "inline; filename*=UTF-8''My%20Sub"
        );
        assert_eq!(
            content_disposition("a\"b\\c"),
            "inline; filename=\"a\\\"b\\\\c\""
        );
        assert_eq!(
            content_disposition("香港"),
            "inline; filename*=UTF-8''%E9%A6%99%E6%B8%AF"
        );
    }

    #[test]
    fn test_optional_headers() {
        let headers = subscription_headers("Office", true, 12, 0);
        assert_eq!(header(&headers, "profile-title"), Some("Office"));
        assert_eq!(header(&headers, "profile-update-interval"), Some("12"));
        assert_eq!(header(&headers, "subscription-userinfo"), None);

        let headers = subscription_headers("Office", false, 12, 5);
        assert_eq!(header(&headers, "profile-update-interval"), None);
        assert_eq!(
            header(&headers, "subscription-userinfo"),
            Some("upload=0; download=0; total=5368709120")
        );
    }

    #[test]
    fn test_retrieval_headers_fixed_set() {
        let headers = retrieval_headers("我的 订阅", true, 24, 0);
        assert_eq!(
            header(&headers, "Content-Type"),
            Some("text/yaml; charset=utf-8")
        );
        assert_eq!(header(&headers, "Cache-Control"), Some("no-cache"));
        assert_eq!(header(&headers, "Access-Control-Allow-Origin"), Some("*"));
        assert_eq!(
            header(&headers, "Access-Control-Allow-Headers"),
            Some("Content-Type")
        );
        assert_eq!(
            header(&headers, "profile-title"),
            Some("%E6%88%91%E7%9A%84%20%E8%AE%A2%E9%98%85")
        );
    }
}
