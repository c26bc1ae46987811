//! # rulehub-adapter-http-axum
//!
//! HTTP adapter using [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the rule-authoring REST API (CRUD, toggle, logs, test runs)
//! - Expose the trigger/action catalogs for UI generation
//! - Accept change-feed items on the ingest endpoint and push them into the
//!   dispatcher's channel
//!
//! ## Dependency rule
//! Depends on `rulehub-app` (services, ports, registries) and
//! `rulehub-domain`. The `app` and `domain` crates must never reference this
//! adapter.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
