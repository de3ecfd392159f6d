//! Secret key derivation for the broadcast gateway and session tokens.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use sha2::{Digest, Sha256};

static SESSION_NONCE: AtomicU64 = AtomicU64::new(0);

/// Derive a topic secret key from the topic id and the current time.
///
/// The key is the lowercase hex SHA-256 digest of the topic id concatenated
/// with the current unix timestamp in milliseconds. Issued once per topic and
/// immutable afterwards.
pub fn generate_secret_key(topic_id: &str) -> String {
    secret_key_at(topic_id, Utc::now().timestamp_millis())
}

/// Mint an opaque session token for a user.
///
/// A per-process nonce is mixed into the digest so two logins by the same
/// user in the same millisecond still yield distinct tokens.
pub fn generate_session_token(user_id: &str) -> String {
    let nonce = SESSION_NONCE.fetch_add(1, Ordering::Relaxed);
    let mut hasher = Sha256::new();
    hasher.update(format!("{user_id}{}{nonce}", Utc::now().timestamp_millis()));
    format!("{:x}", hasher.finalize())
}

fn secret_key_at(topic_id: &str, millis: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{topic_id}{millis}"));
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_64_lowercase_hex_chars() {
        let key = generate_secret_key("topic-abc");

        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn key_is_deterministic_for_same_inputs() {
        assert_eq!(secret_key_at("topic-abc", 1_700_000_000_000), secret_key_at("topic-abc", 1_700_000_000_000));
    }

    #[test]
    fn session_tokens_are_unique_for_the_same_user() {
        let first = generate_session_token("alice");
        let second = generate_session_token("alice");

        assert_eq!(first.len(), 64);
        assert_ne!(first, second);
    }

    #[test]
    fn key_varies_with_topic_and_time() {
        let base = secret_key_at("topic-abc", 1_700_000_000_000);

        assert_ne!(base, secret_key_at("topic-xyz", 1_700_000_000_000));
        assert_ne!(base, secret_key_at("topic-abc", 1_700_000_000_001));
    }
}
