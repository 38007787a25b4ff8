//! Adapter interfaces for external systems.
//!
//! The reconciliation driver reads the storage map and the recording
//! catalog through `CatalogSource`; `MythApiClient` is the HTTP
//! implementation against a MythTV backend.

pub mod mythtv;
pub mod wire;

use async_trait::async_trait;

use crate::domain::{CatalogRecord, StorageMap};

// Re-export the MythTV client
pub use mythtv::{FetchError, MythApiClient, DEFAULT_API_URL, DEFAULT_TIMEOUT};

/// Source of the two upstream reads every run depends on
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Human-readable source name
    fn name(&self) -> &str;

    /// Storage group to directory mapping
    async fn storage_map(&self) -> Result<StorageMap, FetchError>;

    /// Finished recordings (status "Recorded" only)
    async fn recordings(&self) -> Result<Vec<CatalogRecord>, FetchError>;
}
