use std::time::{SystemTime, UNIX_EPOCH};

use md5::{Digest, Md5};

/// Length of every subscription token.
pub const TOKEN_LEN: usize = 16;

/// Derives a token from the document, the current time and a random nonce.
///
/// The nonce keeps two identical documents saved in the same instant from
/// colliding; the store still retries on a UNIQUE violation.
pub fn generate_token(document: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let nonce: u64 = rand::random();

    let mut hasher = Md5::new();
    hasher.update(document.as_bytes());
    hasher.update(nanos.to_le_bytes());
    hasher.update(nonce.to_le_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..TOKEN_LEN].to_string()
}

/// Whether `token` has the shape `generate_token` produces.
pub fn is_valid_token(token: &str) -> bool {
    token.len() == TOKEN_LEN
        && token
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}
