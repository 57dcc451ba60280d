//! Infrastructure layer - external I/O adapters
//!
//! This module contains all code that interacts with external systems:
//! - Object upload service (HTTP, or simulated for dry runs)
//! - Name registry service
//! - Git operations
//! - Build command execution
//! - Wallet files and project hooks

pub mod auth;
pub mod build;
pub mod git;
pub mod hooks;
pub mod keystore;
pub mod name_registry;
pub mod store;

// Re-export commonly used types
pub use build::BuildRunner;
pub use git::{GitClient, SourceControl};
pub use keystore::KeyStore;
pub use name_registry::{HttpNameRegistry, NameRegistry, RecordUpdate};
pub use store::{DryRunStore, HttpObjectStore, ObjectStore};
