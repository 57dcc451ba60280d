//! Domain layer - pure business logic
//!
//! This module contains business logic with no external I/O.
//! Types and functions here can be unit tested without mocking.

pub mod content_type;
pub mod deployment;
pub mod manifest;
pub mod network;
pub mod signer;
pub mod tag;

// Re-export commonly used types
pub use deployment::{
    DeployOutcome, DeployPhase, DeploymentReport, ManifestOutcome, NameRecordOutcome, PhaseResult,
    PhaseStatus,
};
pub use manifest::{Manifest, ObjectId, PathMap, UploadedObject};
pub use network::Network;
pub use signer::Signer;
pub use tag::Tag;
