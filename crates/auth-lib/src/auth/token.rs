// ============================
// crates/auth-lib/src/auth/token.rs
// ============================
//! Bearer token issuance, expiry and the reuse-or-mint policy.
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use fablepress_common::EpochMs;
use rand::RngCore;
use std::time::{SystemTime, UNIX_EPOCH};

/// Token size in bytes (512 bits of entropy)
pub const TOKEN_BYTES: usize = 64;

/// Token TTL: 10 days, in milliseconds
pub const TOKEN_TTL_MS: EpochMs = 86_400 * 1000 * 10;

/// Mint a fresh opaque bearer token
pub fn issue() -> String {
    let mut buffer = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut buffer);
    URL_SAFE_NO_PAD.encode(buffer)
}

/// Expiry for a token minted at `now`
pub fn expiry_for(now: EpochMs) -> EpochMs {
    now + TOKEN_TTL_MS
}

/// Current time as epoch milliseconds
pub fn now_ms() -> EpochMs {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as EpochMs
}

/// Is a presented token acceptable against the stored one?
pub fn is_valid(
    presented: &str,
    stored: Option<&str>,
    expires_at: Option<EpochMs>,
    now: EpochMs,
) -> bool {
    match (stored, expires_at) {
        (Some(stored), Some(expires_at)) => expires_at > now && presented == stored,
        _ => false,
    }
}

/// Outcome of the reuse-or-mint policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A still-valid token is returned unchanged; its expiry does not move
    Reused { token: String, expires_at: EpochMs },
    /// No usable token was stored; a fresh one with a fresh expiry
    Minted { token: String, expires_at: EpochMs },
}

impl Resolution {
    pub fn into_parts(self) -> (String, EpochMs) {
        match self {
            Resolution::Reused { token, expires_at }
            | Resolution::Minted { token, expires_at } => (token, expires_at),
        }
    }
}

/// Reuse the stored token while it is still valid, mint otherwise. Repeated
/// logins before expiry therefore see an unchanged token, and reuse never
/// extends the expiry.
pub fn resolve(stored: Option<&str>, expires_at: Option<EpochMs>, now: EpochMs) -> Resolution {
    if let (Some(token), Some(expires_at)) = (stored, expires_at) {
        if expires_at > now {
            return Resolution::Reused {
                token: token.to_string(),
                expires_at,
            };
        }
    }

    Resolution::Minted {
        token: issue(),
        expires_at: expiry_for(now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_are_distinct_and_opaque() {
        let token1 = issue();
        let token2 = issue();

        assert_ne!(token1, token2);

        // 64 bytes of entropy in unpadded base64
        assert_eq!(token1.len(), 86);
    }

    #[test]
    fn expiry_is_ten_days_out() {
        assert_eq!(expiry_for(0), 864_000_000);
        assert_eq!(expiry_for(1_000), 864_001_000);
    }

    #[test]
    fn validity_requires_presence_future_expiry_and_match() {
        let now = 1_000;
        assert!(is_valid("t", Some("t"), Some(now + 1), now));
        assert!(!is_valid("t", Some("t"), Some(now), now));
        assert!(!is_valid("t", Some("t"), Some(now - 1), now));
        assert!(!is_valid("t", Some("other"), Some(now + 1), now));
        assert!(!is_valid("t", None, Some(now + 1), now));
        assert!(!is_valid("t", Some("t"), None, now));
    }

    #[test]
    fn still_valid_tokens_are_reused_without_extension() {
        let now = 5_000;
        let resolution = resolve(Some("existing"), Some(now + 100), now);
        assert_eq!(
            resolution,
            Resolution::Reused {
                token: "existing".to_string(),
                expires_at: now + 100,
            }
        );
    }

    #[test]
    fn expired_or_absent_tokens_trigger_a_mint() {
        let now = 5_000;

        match resolve(Some("stale"), Some(now - 1), now) {
            Resolution::Minted { token, expires_at } => {
                assert_ne!(token, "stale");
                assert_eq!(expires_at, now + TOKEN_TTL_MS);
            },
            Resolution::Reused { .. } => panic!("expired token must not be reused"),
        }

        assert!(matches!(
            resolve(None, None, now),
            Resolution::Minted { .. }
        ));
    }
}
