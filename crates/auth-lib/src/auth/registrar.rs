// ============================
// crates/auth-lib/src/auth/registrar.rs
// ============================
//! Account registration.
use base64::{engine::general_purpose::STANDARD, Engine as _};
use fablepress_common::{AuthStatus, AuthorRecord, CredentialRecord, NewUser};
use metrics::counter;
use uuid::Uuid;
use zeroize::Zeroize;

use super::{password, set_error_status, set_status};
use crate::error::{AppError, AuthError};
use crate::store::Branch;
use crate::validation;
use crate::AppState;

/// Register a new account from a raw `{name, email, password}` payload.
///
/// The outcome is reported exclusively through the caller branch's status
/// channel; the returned `Result` only carries store-level faults. The
/// `createStarted` status is written before any validation runs.
pub async fn create_user(state: &AppState, caller: &Branch, raw: &[u8]) -> Result<(), AppError> {
    set_status(caller, AuthStatus::create_started()).await?;

    let user: NewUser = match serde_json::from_slice(raw) {
        Ok(user) => user,
        Err(_) => return set_error_status(caller, AuthError::MalformedUser).await,
    };
    let NewUser {
        name,
        email,
        mut password,
    } = user;

    if validation::validate_email(&email).is_err() {
        return set_error_status(caller, AuthError::InvalidEmail).await;
    }

    if state.master.get(&["auth", &email]).await?.is_some() {
        return set_error_status(caller, AuthError::UserExists).await;
    }

    let id = Uuid::new_v4().to_string();
    let salt = password::new_salt();
    let hash = password::hash_password(&password, &salt)?;
    password.zeroize();

    let record = CredentialRecord {
        salt: STANDARD.encode(salt),
        hash,
        id: id.clone(),
        token: None,
        token_expires_at: None,
    };
    state
        .master
        .merge(&["auth", &email], serde_json::to_value(&record)?)
        .await?;

    // the author record lands next to the credentials in the shared branch;
    // the two writes are not transactional
    state
        .master
        .merge(&["author", &id], serde_json::to_value(AuthorRecord::new(name))?)
        .await?;

    set_status(caller, AuthStatus::created()).await?;
    counter!("auth.users_created").increment(1);
    tracing::info!(author = %id, "registered new user");

    Ok(())
}
