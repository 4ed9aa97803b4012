//! Core data model definitions shared across mediadex crates.
#![allow(missing_docs)]

pub mod content;
pub mod error;
pub mod file;
pub mod ids;
pub mod mime;
pub mod service;

// Intentionally curated re-exports for downstream consumers.
pub use content::{
    ContentAction, ContentPayload, ContentStatus, ContentType, ContentUpdate,
    ServiceAction, ServiceUpdate,
};
pub use error::{ModelError, Result as ModelResult};
pub use file::FileMetadata;
pub use ids::{FileHash, NodeId, QueryKey, ServiceKey};
pub use mime::Mime;
pub use service::{ServiceInfo, ServiceType};
