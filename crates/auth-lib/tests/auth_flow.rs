//! End-to-end flows through the two public entry points, the way the
//! application layer drives them: register, log in by password, come back
//! with the bearer token, and drop to an anonymous branch.
use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;

use fablepress_auth::config::Settings;
use fablepress_auth::store::{Branch, BranchStore, FlatFileStore};
use fablepress_auth::AppState;

const EMAIL: &str = "ada@example.com";

async fn setup() -> (AppState, Branch, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let store: Arc<dyn BranchStore> = Arc::new(FlatFileStore::new(temp_dir.path()).unwrap());
    let state = AppState::new(store.clone(), Settings::default())
        .await
        .unwrap();
    let caller = Branch::switch(store, "terminal-7").await.unwrap();
    (state, caller, temp_dir)
}

async fn user_node(branch: &Branch) -> Value {
    branch.get(&["user"]).await.unwrap().unwrap()
}

#[tokio::test]
async fn full_lifecycle_register_login_and_return_with_token() {
    let (state, caller, _temp_dir) = setup().await;

    // register
    state
        .create_user(
            &caller,
            br#"{"name":"Ada","email":"ada@example.com","password":"correct horse"}"#,
        )
        .await
        .unwrap();
    assert_eq!(user_node(&caller).await["status"], "created");

    // first password login mints a token and attaches the identity
    state
        .switch_branch(
            &caller,
            br#"{"type":"password","email":"ada@example.com","password":"correct horse"}"#,
        )
        .await
        .unwrap();

    let home = Branch::switch(state.store.clone(), EMAIL).await.unwrap();
    let identity = user_node(&home).await;
    assert_eq!(identity["type"], "real");
    assert_eq!(identity["email"], EMAIL);
    assert_eq!(home.get(&["route"]).await.unwrap(), Some(json!("/me")));

    let token = identity["token"].as_str().unwrap().to_string();

    // a second password login reuses the very same token
    state
        .switch_branch(
            &caller,
            br#"{"type":"password","email":"ada@example.com","password":"correct horse"}"#,
        )
        .await
        .unwrap();
    assert_eq!(user_node(&home).await["token"], token.as_str());

    // the token alone is enough on the next visit
    let request = serde_json::to_vec(&json!({
        "type": "token",
        "email": EMAIL,
        "token": token,
    }))
    .unwrap();
    state.switch_branch(&caller, &request).await.unwrap();

    // and no error status was left behind
    assert_eq!(user_node(&caller).await["status"], "loginStarted");
    assert_eq!(user_node(&caller).await["error"], Value::Null);
}

#[tokio::test]
async fn identity_fields_survive_later_logins() {
    let (state, caller, _temp_dir) = setup().await;

    state
        .create_user(
            &caller,
            br#"{"name":"Ada","email":"ada@example.com","password":"pw"}"#,
        )
        .await
        .unwrap();
    state
        .switch_branch(
            &caller,
            br#"{"type":"password","email":"ada@example.com","password":"pw"}"#,
        )
        .await
        .unwrap();

    let home = Branch::switch(state.store.clone(), EMAIL).await.unwrap();
    let first = user_node(&home).await;

    // scribble over the route, then log in again: only the token pair may move
    home.merge(&[], json!({ "route": "/stories" })).await.unwrap();
    state
        .switch_branch(
            &caller,
            br#"{"type":"password","email":"ada@example.com","password":"pw"}"#,
        )
        .await
        .unwrap();

    let second = user_node(&home).await;
    assert_eq!(second["type"], first["type"]);
    assert_eq!(second["author"], first["author"]);
    assert_eq!(second["email"], first["email"]);
    assert_eq!(
        home.get(&["route"]).await.unwrap(),
        Some(json!("/stories")),
        "the /me hint is written only on first login"
    );
}

#[tokio::test]
async fn anonymous_switch_needs_no_credentials() {
    let (state, caller, _temp_dir) = setup().await;

    state
        .switch_branch(&caller, br#"{"type":"anonymous","id":"scratch-pad"}"#)
        .await
        .unwrap();

    let target = Branch::switch(state.store.clone(), "scratch-pad")
        .await
        .unwrap();
    assert_eq!(
        user_node(&target).await,
        json!({"type": "anonymous", "id": "scratch-pad"})
    );
}

#[tokio::test]
async fn malformed_payloads_leave_the_master_branch_untouched() {
    let (state, caller, _temp_dir) = setup().await;

    state.create_user(&caller, b"\xff\xfe").await.unwrap();
    assert_eq!(user_node(&caller).await["error"], "Malformed user JSON");

    state.switch_branch(&caller, b"[not, json").await.unwrap();
    assert_eq!(
        user_node(&caller).await["error"],
        "Malformed authentication request"
    );

    assert_eq!(
        state.master.get(&["auth"]).await.unwrap(),
        Some(json!({}))
    );
    assert_eq!(
        state.master.get(&["author"]).await.unwrap(),
        Some(json!({}))
    );
}
