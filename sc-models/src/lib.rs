//! SafeCircle Models - Persistence layer.
//!
//! This crate provides the SQLite database wrapper (pooled, WAL mode,
//! versioned migrations), the `storage` key-value table the app uses as its
//! durable key-value store, and the trust partner record with its persisted
//! list snapshot, phone validation, and the primary-consistency rule.

pub mod db;
pub mod migrations;
pub mod models;
pub mod schema;
pub mod storage;

// Re-export key types
pub use db::{Database, DatabaseStats};
pub use models::{PartnerList, TrustPartner};
pub use storage::Storage;
