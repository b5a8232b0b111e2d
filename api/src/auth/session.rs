//! Tamper-evident session token codec.
//!
//! A token is `base64url(JSON(payload)) + "." + base64url(HMAC-SHA256(secret, body))`,
//! where the MAC covers the encoded body segment. Decoding fails closed:
//! any missing separator, signature mismatch or JSON parse failure yields
//! `None`, never a panic. The codec carries no expiry claim; session expiry
//! is delegated to the cookie's `Max-Age`.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Identity carried by the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPayload {
    /// User id.
    pub sub: i64,
    /// Issued-at, unix seconds.
    pub iat: i64,
}

impl SessionPayload {
    pub fn new(user_id: i64) -> Self {
        Self {
            sub: user_id,
            iat: chrono::Utc::now().timestamp(),
        }
    }
}

/// Signs a payload into a cookie-ready token.
pub fn encode(secret: &str, payload: &SessionPayload) -> String {
    let json = serde_json::to_vec(payload).expect("session payload serializes");
    let body = URL_SAFE_NO_PAD.encode(json);

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    format!("{body}.{signature}")
}

/// Validates and decodes a token. Returns `None` on any defect: missing
/// separator, bad base64, signature mismatch (constant-time comparison via
/// `Mac::verify_slice`) or unparsable payload.
pub fn decode(secret: &str, token: &str) -> Option<SessionPayload> {
    let (body, signature) = token.split_once('.')?;
    let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(body.as_bytes());
    mac.verify_slice(&signature).ok()?;

    let json = URL_SAFE_NO_PAD.decode(body).ok()?;
    serde_json::from_slice(&json).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn round_trip_preserves_the_payload() {
        let payload = SessionPayload { sub: 42, iat: 1_700_000_000 };
        let token = encode(SECRET, &payload);
        assert_eq!(decode(SECRET, &token), Some(payload));
    }

    #[test]
    fn any_single_character_mutation_invalidates_the_token() {
        let token = encode(SECRET, &SessionPayload { sub: 42, iat: 1_700_000_000 });

        for i in 0..token.len() {
            let mut bytes = token.clone().into_bytes();
            bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
            let Ok(mutated) = String::from_utf8(bytes) else {
                continue;
            };
            if mutated == token {
                continue;
            }
            assert_eq!(decode(SECRET, &mutated), None, "mutation at byte {i} must fail");
        }
    }

    #[test]
    fn tokens_do_not_verify_under_a_different_secret() {
        let token = encode("secret-one", &SessionPayload { sub: 1, iat: 0 });
        assert_eq!(decode("secret-two", &token), None);
    }

    #[test]
    fn malformed_tokens_fail_closed() {
        assert_eq!(decode(SECRET, ""), None);
        assert_eq!(decode(SECRET, "no-separator"), None);
        assert_eq!(decode(SECRET, "a.b.c"), None);
        assert_eq!(decode(SECRET, "!!!.???"), None);

        // Correctly signed garbage body still fails on the JSON parse.
        let body = URL_SAFE_NO_PAD.encode(b"not json");
        let mut mac = HmacSha256::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(body.as_bytes());
        let sig = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        assert_eq!(decode(SECRET, &format!("{body}.{sig}")), None);
    }
}
