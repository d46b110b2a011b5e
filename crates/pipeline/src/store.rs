//! Design persistence boundary.
//!
//! The orchestrator and engine only ever hold [`Design`] values in memory;
//! persistence happens through this repository interface at the job
//! boundaries (source load before processing, output save after
//! completion). Production deployments plug in their own backend;
//! [`InMemoryDesignStore`] serves tests and embedded use.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use retarget_core::design::Design;
use retarget_core::types::Id;
use tokio::sync::RwLock;

/// Errors surfaced by a design store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Design not found: {0}")]
    NotFound(Id),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Load/save/delete access to persisted designs, keyed by id.
#[async_trait]
pub trait DesignStore: Send + Sync {
    async fn load(&self, id: Id) -> Result<Design, StoreError>;
    async fn save(&self, design: &Design) -> Result<(), StoreError>;
    async fn delete(&self, id: Id) -> Result<(), StoreError>;
}

/// Map-backed store for tests and embedded use.
#[derive(Default)]
pub struct InMemoryDesignStore {
    designs: Arc<RwLock<HashMap<Id, Design>>>,
}

impl InMemoryDesignStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored designs.
    pub async fn len(&self) -> usize {
        self.designs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.designs.read().await.is_empty()
    }
}

#[async_trait]
impl DesignStore for InMemoryDesignStore {
    async fn load(&self, id: Id) -> Result<Design, StoreError> {
        self.designs
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn save(&self, design: &Design) -> Result<(), StoreError> {
        self.designs.write().await.insert(design.id, design.clone());
        Ok(())
    }

    async fn delete(&self, id: Id) -> Result<(), StoreError> {
        self.designs
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
