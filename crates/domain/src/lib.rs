//! # rulehub-domain
//!
//! Pure domain model for the rulehub automation engine.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Triggers** (the classes of business event a rule can react to)
//! - Define **Conditions** (comparison predicates over the event context)
//! - Define **Actions** (configurable side-effecting operations)
//! - Define **Rules** (org-scoped trigger + conditions + ordered actions)
//! - Define **Events** (raw change-feed items and normalized trigger events)
//! - Define **Execution logs** (append-only per-invocation records)
//! - Contain all invariant enforcement and pure evaluation logic
//!   (condition comparison, `{{path}}` interpolation)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod action;
pub mod condition;
pub mod event;
pub mod interpolate;
pub mod log;
pub mod rule;
pub mod trigger;
