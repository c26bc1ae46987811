//! Application services — use-case entry points for the authoring surface.

pub mod rule_service;
