use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Prefix some providers put in front of the signing secret.
pub const SECRET_PREFIX: &str = "whsec_";

pub fn strip_secret_prefix(secret: &str) -> &str {
    secret.strip_prefix(SECRET_PREFIX).unwrap_or(secret)
}

/// Lowercase hex HMAC-SHA256 of `body` under `key`.
pub fn sign_hex(key: &[u8], body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Compares two signatures without short-circuiting on the first mismatch.
pub fn signatures_match(expected: &str, provided: &str) -> bool {
    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vector() {
        // RFC 4231 test case 2
        let sig = sign_hex(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(
            sig,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn prefix_is_stripped_once() {
        assert_eq!(strip_secret_prefix("whsec_abc123"), "abc123");
        assert_eq!(strip_secret_prefix("abc123"), "abc123");
        assert_eq!(strip_secret_prefix("whsec_whsec_x"), "whsec_x");
    }

    #[test]
    fn comparison_rejects_length_and_content_mismatch() {
        assert!(signatures_match("abcd", "abcd"));
        assert!(!signatures_match("abcd", "abce"));
        assert!(!signatures_match("abcd", "abc"));
        assert!(!signatures_match("abcd", "ABCD"));
    }
}
