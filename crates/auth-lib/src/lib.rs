// ============================
// crates/auth-lib/src/lib.rs
// ============================
//! Core library for the `FablePress` branch-partitioned authentication
//! service: account registration, credential verification, session-token
//! issuance, and the dispatch of inbound auth requests into per-identity
//! branches.

pub mod auth;
pub mod config;
pub mod error;
pub mod router;
pub mod store;
pub mod validation;

use std::sync::Arc;

use crate::config::Settings;
use crate::error::AppError;
use crate::store::{Branch, BranchStore, MASTER_BRANCH};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Handle to the shared master branch (the `auth` and `author` maps)
    pub master: Branch,
    /// Branch store, used to switch into per-identity partitions
    pub store: Arc<dyn BranchStore>,
    /// Settings
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Open the master branch, seeding its maps on first run
    pub async fn new(store: Arc<dyn BranchStore>, settings: Settings) -> Result<Self, AppError> {
        let master = Branch::switch(store.clone(), MASTER_BRANCH).await?;

        if master.get(&["auth"]).await?.is_none() {
            master
                .merge(&[], serde_json::json!({ "auth": {}, "author": {} }))
                .await?;
        }

        Ok(Self {
            master,
            store,
            settings: Arc::new(settings),
        })
    }

    /// Register a new account; the outcome lands in the caller's status channel
    pub async fn create_user(&self, caller: &Branch, raw: &[u8]) -> Result<(), AppError> {
        auth::registrar::create_user(self, caller, raw).await
    }

    /// Authenticate a raw request and switch toward the target branch
    pub async fn switch_branch(&self, caller: &Branch, raw: &[u8]) -> Result<(), AppError> {
        auth::dispatcher::switch_branch(self, caller, raw).await
    }
}
