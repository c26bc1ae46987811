//! # rulehub-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the storage port traits defined in `rulehub-app::ports`
//! - Manage the `SQLite` connection pool lifecycle
//! - Run database migrations (sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `rulehub-app` (for port traits) and `rulehub-domain` (for
//! domain types). The `app` and `domain` crates must never reference this
//! adapter.

pub mod error;
pub mod log_store;
pub mod pool;
pub mod record_store;
pub mod rule_repo;
pub mod template_store;

pub use error::StorageError;
pub use log_store::SqliteLogStore;
pub use pool::{Config, Database};
pub use record_store::SqliteRecordStore;
pub use rule_repo::SqliteRuleRepository;
pub use template_store::SqliteTemplateStore;
