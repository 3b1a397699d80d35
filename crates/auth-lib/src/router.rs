// ============================
// crates/auth-lib/src/router.rs
// ============================
//! HTTP router for the two auth entry points.
//!
//! Both POST routes reply `202 Accepted` regardless of the authentication
//! outcome; callers observe results by polling their branch's `user` node.
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::AppError;
use crate::store::Branch;
use crate::AppState;

/// Create the auth router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/branches/{branch}/user", post(create_user).get(read_user))
        .route("/branches/{branch}/session", post(switch_branch))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// `POST /branches/{branch}/user` with a raw registration payload
async fn create_user(
    State(state): State<Arc<AppState>>,
    Path(branch): Path<String>,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let caller = Branch::switch(state.store.clone(), &branch).await?;
    state.create_user(&caller, &body).await?;
    Ok(StatusCode::ACCEPTED)
}

/// `POST /branches/{branch}/session` with a raw authentication request
async fn switch_branch(
    State(state): State<Arc<AppState>>,
    Path(branch): Path<String>,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let caller = Branch::switch(state.store.clone(), &branch).await?;
    state.switch_branch(&caller, &body).await?;
    Ok(StatusCode::ACCEPTED)
}

/// `GET /branches/{branch}/user`: the polling surface for status and identity
async fn read_user(
    State(state): State<Arc<AppState>>,
    Path(branch): Path<String>,
) -> Result<Json<Value>, AppError> {
    let caller = Branch::switch(state.store.clone(), &branch).await?;
    let user = caller.get(&["user"]).await?.unwrap_or(Value::Null);
    Ok(Json(user))
}
