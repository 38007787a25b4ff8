//! Domain types for mythnfo.
//!
//! This module contains the core data structures:
//! - CatalogRecord: one finished recording, typed
//! - StorageMap: storage group to directory mapping
//! - FileStem: matching key between metadata files and recordings

pub mod recording;
pub mod stem;
pub mod storage;

// Re-export commonly used types
pub use recording::{CastMember, CatalogRecord, VideoProps, STATUS_RECORDED};
pub use stem::{has_extension, FileStem};
pub use storage::{StorageMap, NON_RECORDING_GROUPS};
