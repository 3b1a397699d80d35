// ============================
// crates/auth-lib/src/auth/loader.rs
// ============================
//! Loads a verified identity's own branch and attaches session state.
use fablepress_common::{EpochMs, SessionIdentity};
use serde_json::json;

use crate::error::AppError;
use crate::store::Branch;
use crate::AppState;

/// Switch to the branch owned by `email` and write session state into it.
///
/// On the first login the full `real` identity is written along with a
/// one-time `route = "/me"` hint. Afterwards only `token`/`tokenExpiresAt`
/// are refreshed; `type`, `author` and `email` never change once set.
pub async fn load_user(
    state: &AppState,
    email: &str,
    token: &str,
    author_id: &str,
    expires_at: EpochMs,
) -> Result<(), AppError> {
    let branch = Branch::switch(state.store.clone(), email).await?;

    if branch.get(&["user", "type"]).await?.is_none() {
        let identity = SessionIdentity::Real {
            author: author_id.to_string(),
            email: email.to_string(),
            token: token.to_string(),
            token_expires_at: expires_at,
        };
        branch
            .merge(&["user"], serde_json::to_value(&identity)?)
            .await?;
        branch.merge(&[], json!({ "route": "/me" })).await?;
        tracing::debug!(branch = email, "attached new session identity");
    } else {
        branch
            .merge(
                &["user"],
                json!({ "token": token, "tokenExpiresAt": expires_at }),
            )
            .await?;
    }

    Ok(())
}
