// ============================
// crates/auth-lib/src/store.rs
// ============================
//! Branch-partitioned state store abstraction with flat-file implementation.
//!
//! Every identity owns one branch: an isolated JSON state tree addressed by a
//! branch id. The auth core only needs three primitives from it: read a value
//! at a key path, merge key/value pairs at a path with last-writer-wins per
//! key, and switch to a branch, creating its storage if absent. The shared
//! master branch holds the credential and author maps.
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{Map, Value};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs as tokio_fs;

use crate::error::AppError;

/// The reserved branch holding `auth.<email>` and `author.<id>` maps
pub const MASTER_BRANCH: &str = "master";

/// Trait for branch store backends
#[async_trait]
pub trait BranchStore: Send + Sync {
    /// Switch-to-partition: make sure the branch's storage exists
    async fn open(&self, branch: &str) -> Result<(), AppError>;

    /// Read the value at a key path, if any
    async fn get(&self, branch: &str, path: &[&str]) -> Result<Option<Value>, AppError>;

    /// Merge an object patch at a key path; each key of the patch replaces
    /// the key under `path`, last writer wins. Intermediate non-object nodes
    /// are coerced to objects.
    async fn merge(&self, branch: &str, path: &[&str], patch: Value) -> Result<(), AppError>;

    /// Replace the whole node at a key path
    async fn put(&self, branch: &str, path: &[&str], value: Value) -> Result<(), AppError>;
}

/// Cheap handle to one branch of a store
#[derive(Clone)]
pub struct Branch {
    store: Arc<dyn BranchStore>,
    id: String,
}

impl Branch {
    /// Switch to `id`, creating the branch's storage if absent
    pub async fn switch(store: Arc<dyn BranchStore>, id: &str) -> Result<Self, AppError> {
        store.open(id).await?;
        Ok(Self {
            store,
            id: id.to_string(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn get(&self, path: &[&str]) -> Result<Option<Value>, AppError> {
        self.store.get(&self.id, path).await
    }

    pub async fn merge(&self, path: &[&str], patch: Value) -> Result<(), AppError> {
        self.store.merge(&self.id, path, patch).await
    }

    pub async fn put(&self, path: &[&str], value: Value) -> Result<(), AppError> {
        self.store.put(&self.id, path, value).await
    }
}

/// Flat-file implementation of the `BranchStore` trait: one directory per
/// branch, branch state as a single `state.json`, an in-memory cache with
/// write-through persistence.
pub struct FlatFileStore {
    root: PathBuf,
    branches: DashMap<String, Value>,
}

impl FlatFileStore {
    pub fn new<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join("branches"))?;
        Ok(Self {
            root,
            branches: DashMap::new(),
        })
    }

    fn state_path(&self, branch: &str) -> PathBuf {
        self.root
            .join("branches")
            .join(encode_branch_dir(branch))
            .join("state.json")
    }

    /// Pull the branch tree into the cache if it is not there yet
    async fn ensure_loaded(&self, branch: &str) -> Result<(), AppError> {
        if self.branches.contains_key(branch) {
            return Ok(());
        }

        let path = self.state_path(branch);
        let tree = if path.exists() {
            let content = tokio_fs::read_to_string(&path).await?;
            serde_json::from_str(&content)?
        } else {
            Value::Object(Map::new())
        };

        self.branches.entry(branch.to_string()).or_insert(tree);
        Ok(())
    }

    async fn persist(&self, branch: &str, tree: &Value) -> Result<(), AppError> {
        let path = self.state_path(branch);

        // ensure directory exists
        if let Some(parent) = path.parent() {
            tokio_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(tree)?;
        tokio_fs::write(&path, json).await?;
        Ok(())
    }

    /// Mutate the cached tree, then write the whole branch state back out
    async fn update<F>(&self, branch: &str, apply: F) -> Result<(), AppError>
    where
        F: FnOnce(&mut Value),
    {
        self.ensure_loaded(branch).await?;

        // the map guard must not be held across the write below
        let snapshot = {
            let mut entry = self
                .branches
                .entry(branch.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            apply(entry.value_mut());
            entry.value().clone()
        };

        self.persist(branch, &snapshot).await
    }
}

#[async_trait]
impl BranchStore for FlatFileStore {
    async fn open(&self, branch: &str) -> Result<(), AppError> {
        self.ensure_loaded(branch).await?;

        if !self.state_path(branch).exists() {
            let tree = self
                .branches
                .get(branch)
                .map(|entry| entry.value().clone())
                .unwrap_or_else(|| Value::Object(Map::new()));
            self.persist(branch, &tree).await?;
            tracing::debug!(branch, "created branch storage");
        }

        Ok(())
    }

    async fn get(&self, branch: &str, path: &[&str]) -> Result<Option<Value>, AppError> {
        self.ensure_loaded(branch).await?;

        Ok(self
            .branches
            .get(branch)
            .and_then(|entry| node_at(entry.value(), path).cloned()))
    }

    async fn merge(&self, branch: &str, path: &[&str], patch: Value) -> Result<(), AppError> {
        self.update(branch, |root| {
            let node = object_at_mut(root, path);
            match patch {
                Value::Object(entries) => {
                    if !node.is_object() {
                        *node = Value::Object(Map::new());
                    }
                    if let Value::Object(target) = node {
                        for (key, value) in entries {
                            target.insert(key, value);
                        }
                    }
                },
                other => *node = other,
            }
        })
        .await
    }

    async fn put(&self, branch: &str, path: &[&str], value: Value) -> Result<(), AppError> {
        self.update(branch, |root| {
            *object_at_mut(root, path) = value;
        })
        .await
    }
}

/// Walk a key path immutably
fn node_at<'a>(tree: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut node = tree;
    for segment in path {
        node = node.get(segment)?;
    }
    Some(node)
}

/// Walk a key path, creating object nodes along the way
fn object_at_mut<'a>(tree: &'a mut Value, path: &[&str]) -> &'a mut Value {
    let mut node = tree;
    for segment in path {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        node = node
            .as_object_mut()
            .expect("coerced to object above")
            .entry(segment.to_string())
            .or_insert(Value::Null);
    }
    node
}

/// Branch ids may contain `@`, `/` or anything else an e-mail can hold;
/// encode them into safe, collision-free directory names.
fn encode_branch_dir(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for byte in id.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' => out.push(byte as char),
            _ => {
                let _ = write!(out, "%{byte:02X}");
            },
        }
    }
    out
}
