// ============================
// crates/auth-lib/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod dispatcher;
pub mod loader;
pub mod password;
pub mod registrar;
pub mod token;
pub mod verifier;

pub use dispatcher::switch_branch;
pub use registrar::create_user;
pub use token::{TOKEN_BYTES, TOKEN_TTL_MS};
pub use verifier::AuthOutcome;

use crate::error::{AppError, AuthError};
use crate::store::Branch;
use fablepress_common::AuthStatus;
use metrics::counter;

/// Write a status into the `user` node of a branch, merging so it can sit
/// next to a `SessionIdentity` in the same node.
pub(crate) async fn set_status(branch: &Branch, status: AuthStatus) -> Result<(), AppError> {
    branch
        .merge(&["user"], serde_json::to_value(&status)?)
        .await
}

/// Report a recoverable failure through the caller's status channel
pub(crate) async fn set_error_status(branch: &Branch, err: AuthError) -> Result<(), AppError> {
    counter!("auth.status_errors").increment(1);
    tracing::debug!(error = %err, branch = branch.id(), "auth attempt failed");
    set_status(branch, AuthStatus::error(err.to_string())).await
}
