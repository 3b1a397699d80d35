// ============================
// crates/auth-lib/src/auth/verifier.rs
// ============================
//! Credential verification.
//!
//! Both entry points collapse every non-match (unknown e-mail, wrong
//! password, absent, expired or mismatched token) into the same
//! undifferentiated `Denied`, so a caller cannot probe which e-mails exist.
use fablepress_common::CredentialRecord;
use serde_json::json;

use super::{loader, token};
use crate::auth::password;
use crate::error::AppError;
use crate::AppState;

/// Result of a verification attempt. `Denied` deliberately carries no detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Granted,
    Denied,
}

/// Verify an e-mail/password pair and, on success, attach session state to
/// the identity's branch. A still-valid stored token is reused as-is; only
/// an absent or expired one triggers a fresh mint, which is persisted before
/// the branch switch.
pub async fn auth_by_password(
    state: &AppState,
    email: &str,
    password_plain: &str,
) -> Result<AuthOutcome, AppError> {
    let Some(value) = state.master.get(&["auth", email]).await? else {
        return Ok(AuthOutcome::Denied);
    };
    let record: CredentialRecord = serde_json::from_value(value)?;

    if !password::verify_password(password_plain, &record.salt, &record.hash)? {
        return Ok(AuthOutcome::Denied);
    }

    let resolution = token::resolve(
        record.token.as_deref(),
        record.token_expires_at,
        token::now_ms(),
    );
    if let token::Resolution::Minted { token, expires_at } = &resolution {
        state
            .master
            .merge(
                &["auth", email],
                json!({ "token": token, "tokenExpiresAt": expires_at }),
            )
            .await?;
    }

    let (bearer, expires_at) = resolution.into_parts();
    loader::load_user(state, email, &bearer, &record.id, expires_at).await?;
    Ok(AuthOutcome::Granted)
}

/// Verify a bearer token for an e-mail and, on success, refresh the session
/// state on the identity's branch. Token validation never extends expiry.
pub async fn auth_by_token(
    state: &AppState,
    email: &str,
    presented: &str,
) -> Result<AuthOutcome, AppError> {
    let Some(value) = state.master.get(&["auth", email]).await? else {
        return Ok(AuthOutcome::Denied);
    };
    let record: CredentialRecord = serde_json::from_value(value)?;

    if !token::is_valid(
        presented,
        record.token.as_deref(),
        record.token_expires_at,
        token::now_ms(),
    ) {
        return Ok(AuthOutcome::Denied);
    }

    let expires_at = record.token_expires_at.unwrap_or_default();
    loader::load_user(state, email, presented, &record.id, expires_at).await?;
    Ok(AuthOutcome::Granted)
}
