use base64::{engine::general_purpose, DecodeError, Engine as _};

/// Encodes a string to Base64 format.
pub fn base64_encode(input: &str) -> String {
    general_purpose::STANDARD.encode(input)
}

/// Reverses a URL-safe Base64 string to standard Base64 format.
pub fn url_safe_base64_reverse(input: &str) -> String {
    input.replace('-', "+").replace('_', "/")
}

/// Decodes Base64 the way share links actually carry it: standard or
/// URL-safe alphabet, with or without `=` padding, whitespace ignored.
pub fn base64_decode_lenient(input: &str) -> Result<Vec<u8>, DecodeError> {
    let mut cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    cleaned = url_safe_base64_reverse(cleaned.trim_end_matches('='));
    let missing = (4 - cleaned.len() % 4) % 4;
    cleaned.extend(std::iter::repeat('=').take(missing));
    general_purpose::STANDARD.decode(cleaned)
}

/// Lenient decode into UTF-8 text; `None` when the input is not Base64
/// or the payload is not valid UTF-8.
pub fn base64_decode_text(input: &str) -> Option<String> {
    base64_decode_lenient(input)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding_tolerance() {
        let padded = base64_encode("aes-256-gcm:pass");
        let unpadded = padded.trim_end_matches('=');
        assert_ne!(padded, unpadded);
        assert_eq!(
            base64_decode_text(&padded),
            Some("aes-256-gcm:pass".to_string())
        );
        assert_eq!(base64_decode_text(unpadded), base64_decode_text(&padded));
    }

    #[test]
    fn test_url_safe_alphabet() {
        // "??>" encodes to "Pz8+" in the standard alphabet
        assert_eq!(base64_decode_text("Pz8-"), Some("??>".to_string()));
    }

    #[test]
    fn test_rejects_non_base64() {
        assert!(base64_decode_text("vless://abc@host:443").is_none());
    }
}
