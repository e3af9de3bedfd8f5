use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use truetag_core::{DomainError, ProductId};

type HmacSha256 = Hmac<Sha256>;

/// Bytes of entropy in a freshly minted identity token (256 bits).
const IDENTITY_TOKEN_BYTES: usize = 32;

/// High-entropy credential bound 1:1 to a physical product.
///
/// Hex-encoded, always `2 * IDENTITY_TOKEN_BYTES` characters. The token is the
/// sole credential a holder needs to operate on the product, so it is never
/// logged in full.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityToken(String);

impl IdentityToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for IdentityToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for IdentityToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl core::fmt::Display for IdentityToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // Redacted: show a prefix only, enough makes its way into traces.
        let prefix = self.0.get(..8).unwrap_or(&self.0);
        write!(f, "{prefix}…")
    }
}

/// Generates and verifies product tokens.
///
/// Holds the server MAC secret for the whole process lifetime. Construction
/// fails if the secret is absent or empty — a configuration error, never a
/// request-time one.
#[derive(Clone)]
pub struct TokenService {
    mac: HmacSha256,
}

impl core::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenService").finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, DomainError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(DomainError::configuration("MAC secret must not be empty"));
        }
        let mac = HmacSha256::new_from_slice(&secret)
            .map_err(|e| DomainError::configuration(format!("invalid MAC secret: {e}")))?;
        Ok(Self { mac })
    }

    /// Read the MAC secret from the given environment variable.
    pub fn from_env(var: &str) -> Result<Self, DomainError> {
        let secret = std::env::var(var)
            .map_err(|_| DomainError::configuration(format!("{var} is not set")))?;
        Self::new(secret.into_bytes())
    }

    /// Mint a fresh identity token (cryptographically random, hex-encoded).
    ///
    /// Collision probability across 2^256 is negligible; uniqueness is still
    /// enforced by the repository's unique index as a backstop.
    pub fn generate_identity_token(&self) -> IdentityToken {
        let mut bytes = [0u8; IDENTITY_TOKEN_BYTES];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        IdentityToken(hex::encode(bytes))
    }

    /// Deterministic keyed MAC over `subject ‖ timestamp`, hex-encoded.
    pub fn generate_action_token(&self, subject: ProductId, timestamp: DateTime<Utc>) -> String {
        let mut mac = self.mac();
        mac.update(Self::action_message(subject, timestamp).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Recompute the expected MAC and compare in constant time.
    ///
    /// Returns `false` (never errors) on malformed hex, length mismatch, or
    /// computed mismatch. The comparison must not early-exit on the first
    /// differing byte, or the secret leaks byte-by-byte through timing.
    pub fn verify_action_token(
        &self,
        token: &str,
        subject: ProductId,
        timestamp: DateTime<Utc>,
    ) -> bool {
        let Ok(supplied) = hex::decode(token) else {
            return false;
        };
        let mut mac = self.mac();
        mac.update(Self::action_message(subject, timestamp).as_bytes());
        // `verify_slice` is constant-time (it compares a Choice, not bytes).
        mac.verify_slice(&supplied).is_ok()
    }

    fn action_message(subject: ProductId, timestamp: DateTime<Utc>) -> String {
        format!("{}-{}", subject, timestamp.timestamp_millis())
    }

    fn mac(&self) -> HmacSha256 {
        // Keyed at construction; cloning resets the message state only.
        self.mac.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn service() -> TokenService {
        TokenService::new(b"test-secret".to_vec()).unwrap()
    }

    #[test]
    fn rejects_empty_secret() {
        let err = TokenService::new(Vec::new()).unwrap_err();
        assert!(matches!(err, DomainError::Configuration(_)));
    }

    #[test]
    fn identity_tokens_are_64_hex_chars_and_distinct() {
        let svc = service();
        let a = svc.generate_identity_token();
        let b = svc.generate_identity_token();
        assert_eq!(a.as_str().len(), 64);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn action_token_round_trips() {
        let svc = service();
        let subject = ProductId::new();
        let at = Utc::now();
        let token = svc.generate_action_token(subject, at);
        assert!(svc.verify_action_token(&token, subject, at));
    }

    #[test]
    fn action_token_is_bound_to_subject_and_time() {
        let svc = service();
        let subject = ProductId::new();
        let at = Utc::now();
        let token = svc.generate_action_token(subject, at);
        assert!(!svc.verify_action_token(&token, ProductId::new(), at));
        assert!(!svc.verify_action_token(
            &token,
            subject,
            at + chrono::Duration::milliseconds(1)
        ));
    }

    #[test]
    fn verification_never_panics_on_garbage() {
        let svc = service();
        let subject = ProductId::new();
        let at = Utc::now();
        assert!(!svc.verify_action_token("", subject, at));
        assert!(!svc.verify_action_token("zz-not-hex", subject, at));
        assert!(!svc.verify_action_token("deadbeef", subject, at));
    }

    #[test]
    fn different_secrets_produce_different_macs() {
        let a = TokenService::new(b"secret-a".to_vec()).unwrap();
        let b = TokenService::new(b"secret-b".to_vec()).unwrap();
        let subject = ProductId::new();
        let at = Utc::now();
        let token = a.generate_action_token(subject, at);
        assert!(!b.verify_action_token(&token, subject, at));
    }

    proptest! {
        /// Any single-bit flip of a valid token must fail verification.
        #[test]
        fn single_bit_flip_breaks_verification(byte_idx in 0usize..32, bit in 0u8..8) {
            let svc = service();
            let subject = ProductId::new();
            let at = Utc::now();
            let token = svc.generate_action_token(subject, at);

            let mut raw = hex::decode(&token).unwrap();
            raw[byte_idx] ^= 1 << bit;
            let tampered = hex::encode(raw);

            prop_assert!(!svc.verify_action_token(&tampered, subject, at));
        }
    }
}
