//! Vault module: encrypted profile storage.
//!
//! This module provides:
//! - `Service` and `ProfileKind` (`profile`)
//! - Account name sanitation and path containment (`names`)
//! - `VaultStore` for reading and writing profile blobs (`store`)
//! - Bulk encrypt / re-encrypt passes (`migration`)

pub mod migration;
pub mod names;
pub mod profile;
pub mod store;

// Re-export the most commonly used items.
pub use migration::MigrationReport;
pub use names::{ensure_within, sanitize_name};
pub use profile::{ProfileKind, Service};
pub use store::VaultStore;
