// ============================
// crates/auth-lib/src/auth/dispatcher.rs
// ============================
//! Inbound authentication request dispatch.
//!
//! Classifies a raw request and routes it to the anonymous, token or
//! password path. Every attempt starts by stamping `loginStarted` into the
//! caller's status channel; failures overwrite it with an error status.
//! Successful token/password logins write no explicit success status; the
//! session identity materializing in the target branch is the signal.
use fablepress_common::{AuthRequest, AuthStatus, SessionIdentity};
use serde_json::Value;

use super::{set_error_status, set_status, verifier};
use crate::auth::verifier::AuthOutcome;
use crate::error::{AppError, AuthError};
use crate::store::Branch;
use crate::AppState;

/// Handle one raw authentication request on behalf of `caller`
pub async fn switch_branch(state: &AppState, caller: &Branch, raw: &[u8]) -> Result<(), AppError> {
    set_status(caller, AuthStatus::login_started()).await?;

    let request: Value = match serde_json::from_slice(raw) {
        Ok(value) => value,
        Err(_) => return set_error_status(caller, AuthError::MalformedRequest).await,
    };

    let request = match classify(&request) {
        Ok(request) => request,
        Err(err) => return set_error_status(caller, err).await,
    };

    match request {
        AuthRequest::Anonymous { id } => {
            let target = Branch::switch(state.store.clone(), &id).await?;
            // unlike the real-user path there is no reuse guard: an
            // anonymous switch replaces whatever identity was there
            target
                .put(
                    &["user"],
                    serde_json::to_value(SessionIdentity::Anonymous { id })?,
                )
                .await?;
            Ok(())
        },
        AuthRequest::Token { email, token } => {
            match verifier::auth_by_token(state, &email, &token).await? {
                AuthOutcome::Granted => Ok(()),
                AuthOutcome::Denied => {
                    set_error_status(caller, AuthError::AuthenticationFailed).await
                },
            }
        },
        AuthRequest::Password { email, password } => {
            match verifier::auth_by_password(state, &email, &password).await? {
                AuthOutcome::Granted => Ok(()),
                AuthOutcome::Denied => {
                    set_error_status(caller, AuthError::AuthenticationFailed).await
                },
            }
        },
    }
}

/// Sort a decoded request into one of the three shapes. A missing, null or
/// empty `type` is its own failure; anything else that does not shape-match
/// (wrong type tag, missing or empty credential fields) is unknown.
fn classify(request: &Value) -> Result<AuthRequest, AuthError> {
    let kind = match request.get("type") {
        None | Some(Value::Null) => return Err(AuthError::MissingType),
        Some(Value::String(s)) if s.is_empty() => return Err(AuthError::MissingType),
        Some(Value::String(s)) => s.as_str(),
        Some(_) => return Err(AuthError::UnknownType),
    };

    let field = |key: &str| {
        request
            .get(key)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
            .map(str::to_owned)
    };

    match kind {
        "anonymous" => field("id")
            .map(|id| AuthRequest::Anonymous { id })
            .ok_or(AuthError::UnknownType),
        "token" => match (field("email"), field("token")) {
            (Some(email), Some(token)) => Ok(AuthRequest::Token { email, token }),
            _ => Err(AuthError::UnknownType),
        },
        "password" => match (field("email"), field("password")) {
            (Some(email), Some(password)) => Ok(AuthRequest::Password { email, password }),
            _ => Err(AuthError::UnknownType),
        },
        _ => Err(AuthError::UnknownType),
    }
}
