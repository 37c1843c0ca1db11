//! URL encoding/decoding utilities

/// Encodes a string using URL encoding.
///
/// Only unreserved characters (alphanumerics and `-_.~`) are kept as-is,
/// everything else is percent-encoded as UTF-8.
///
/// ```
/// use subprofile::utils::url::url_encode;
///
/// assert_eq!(url_encode("Hello World!"), "Hello%20World%21");
/// ```
pub fn url_encode(input: &str) -> String {
    urlencoding::encode(input).into_owned()
}

/// Decodes a URL-encoded string, returning the input unchanged if the
/// escapes do not form valid UTF-8.
///
/// ```
/// use subprofile::utils::url::url_decode;
///
/// assert_eq!(url_decode("Hello%20World%21"), "Hello World!");
/// ```
pub fn url_decode(input: &str) -> String {
    urlencoding::decode(input)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| input.to_string())
}

/// Strips the brackets `url` keeps around IPv6 hosts.
pub fn bare_host(host: &str) -> &str {
    host.strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_encode_unicode() {
        assert_eq!(url_encode("订阅"), "%E8%AE%A2%E9%98%85");
        assert_eq!(url_encode("a-b_c.d~e"), "a-b_c.d~e");
    }

    #[test]
    fn test_bare_host() {
        assert_eq!(bare_host("[::1]"), "::1");
        assert_eq!(bare_host("example.com"), "example.com");
    }
}
