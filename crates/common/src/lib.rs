// ================
// common/src/lib.rs
// ================
//! Record and wire types shared between the FablePress auth service and its
//! clients: what is stored in the master branch, what is written into a
//! user's own branch, and the payloads the two auth entry points accept.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Epoch-millisecond timestamp, matching `Date.now()` style values on the wire
pub type EpochMs = i64;

/// One credential entry in the master branch, keyed by e-mail at `auth.<email>`
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRecord {
    /// Base64 of the 64 random bytes generated once at registration
    pub salt: String,
    /// Base64 of the scrypt-derived key of (password, salt)
    pub hash: String,
    /// Opaque author id, links to the `AuthorRecord`
    pub id: String,
    /// Current bearer token, absent until the first password login
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Expiry of `token`; present exactly when `token` is
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_expires_at: Option<EpochMs>,
}

/// Author entry in the master branch, keyed by credential id at `author.<id>`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuthorRecord {
    /// Display name given at registration
    pub name: String,
    /// Published stories by slug; empty at registration
    pub published: Map<String, Value>,
}

impl AuthorRecord {
    pub fn new(name: String) -> Self {
        Self {
            name,
            published: Map::new(),
        }
    }
}

/// Who is "logged in" on a branch, written at path `user` of that branch
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SessionIdentity {
    /// A verified account; `author`/`email` never change once written
    #[serde(rename_all = "camelCase")]
    Real {
        author: String,
        email: String,
        token: String,
        token_expires_at: EpochMs,
    },
    /// A caller-named branch with no credential behind it
    Anonymous { id: String },
}

/// Registration payload accepted by `create_user`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// An inbound authentication request, tagged by its `type` field
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AuthRequest {
    /// Switch straight to the branch named by `id`
    Anonymous { id: String },
    /// Prove a prior login with a still-valid bearer token
    Token { email: String, token: String },
    /// Full credential check
    Password { email: String, password: String },
}

/// Phase of an in-progress auth operation, as observed by the caller
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AuthPhase {
    CreateStarted,
    Created,
    LoginStarted,
    Error,
}

/// Transient status feedback written into the caller's branch at path `user`.
/// Overwritten at the start of every operation; `error` is null unless the
/// phase is `Error`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AuthStatus {
    pub status: AuthPhase,
    pub error: Option<String>,
}

impl AuthStatus {
    pub fn create_started() -> Self {
        Self {
            status: AuthPhase::CreateStarted,
            error: None,
        }
    }

    pub fn created() -> Self {
        Self {
            status: AuthPhase::Created,
            error: None,
        }
    }

    pub fn login_started() -> Self {
        Self {
            status: AuthPhase::LoginStarted,
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: AuthPhase::Error,
            error: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_record_omits_absent_token_fields() {
        let record = CredentialRecord {
            salt: "c2FsdA==".to_string(),
            hash: "aGFzaA==".to_string(),
            id: "abc-123".to_string(),
            token: None,
            token_expires_at: None,
        };

        let value = serde_json::to_value(&record).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 3);
        assert!(object.contains_key("salt"));
        assert!(object.contains_key("hash"));
        assert!(object.contains_key("id"));
    }

    #[test]
    fn credential_record_uses_camel_case_expiry() {
        let record = CredentialRecord {
            salt: "s".to_string(),
            hash: "h".to_string(),
            id: "i".to_string(),
            token: Some("t".to_string()),
            token_expires_at: Some(42),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["tokenExpiresAt"], 42);
        assert_eq!(value["token"], "t");
    }

    #[test]
    fn session_identity_is_tagged_on_type() {
        let real = SessionIdentity::Real {
            author: "author-1".to_string(),
            email: "a@b.c".to_string(),
            token: "tok".to_string(),
            token_expires_at: 99,
        };
        let value = serde_json::to_value(&real).unwrap();
        assert_eq!(value["type"], "real");
        assert_eq!(value["author"], "author-1");
        assert_eq!(value["tokenExpiresAt"], 99);

        let anon = SessionIdentity::Anonymous {
            id: "guest".to_string(),
        };
        let value = serde_json::to_value(&anon).unwrap();
        assert_eq!(value["type"], "anonymous");
        assert_eq!(value["id"], "guest");
    }

    #[test]
    fn auth_request_round_trips_from_wire_shapes() {
        let parsed: AuthRequest =
            serde_json::from_str(r#"{"type":"password","email":"a@b.c","password":"pw"}"#).unwrap();
        match parsed {
            AuthRequest::Password { email, password } => {
                assert_eq!(email, "a@b.c");
                assert_eq!(password, "pw");
            },
            _ => panic!("Wrong variant"),
        }

        let parsed: AuthRequest =
            serde_json::from_str(r#"{"type":"anonymous","id":"guest"}"#).unwrap();
        assert!(matches!(parsed, AuthRequest::Anonymous { id } if id == "guest"));
    }

    #[test]
    fn auth_status_uses_camel_case_phases() {
        let value = serde_json::to_value(AuthStatus::create_started()).unwrap();
        assert_eq!(value["status"], "createStarted");
        assert_eq!(value["error"], Value::Null);

        let value = serde_json::to_value(AuthStatus::error("User exists")).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["error"], "User exists");

        let value = serde_json::to_value(AuthStatus::login_started()).unwrap();
        assert_eq!(value["status"], "loginStarted");
    }
}
