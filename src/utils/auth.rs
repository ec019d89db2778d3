// HTTP Basic credential helpers

use crate::core::error::AuthError;
use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Compare two byte strings in constant time.
///
/// Only the length is leaked; the content comparison always touches every byte.
pub fn constant_time_eq(provided: &[u8], expected: &[u8]) -> bool {
    provided.len() == expected.len()
        && provided
            .iter()
            .zip(expected.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

/// Split an `Authorization` header value into its token.
///
/// The value must be exactly `<scheme> <token>` with scheme `basic` in any case.
pub fn parse_basic_header(value: &str) -> Result<&str, AuthError> {
    let parts: Vec<&str> = value.split(' ').collect();
    match parts.as_slice() {
        [scheme, token] if scheme.eq_ignore_ascii_case("basic") => Ok(*token),
        _ => Err(AuthError::InvalidFormat),
    }
}

/// Base64 token for `username:password`
pub fn encode_basic_token(username: &str, password: &str) -> String {
    STANDARD.encode(format!("{}:{}", username, password))
}

/// Check a Basic token against the expected username and password.
///
/// Undecodable tokens never match.
pub fn verify_basic_token(token: &str, username: &str, password: &str) -> bool {
    let Ok(decoded) = STANDARD.decode(token.trim()) else {
        return false;
    };
    let expected = format!("{}:{}", username, password);
    constant_time_eq(&decoded, expected.as_bytes())
}
