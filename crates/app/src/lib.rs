//! # rulehub-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `RuleRepository` — CRUD + atomic execution counters for rules
//!   - `LogStore` — append & query execution logs
//!   - `TemplateStore` — message template lookup
//!   - `RecordStore` — generic record insert/update for task & record actions
//!   - `EmailSender` / `SmsSender` / `PushNotifier` / `HttpClient` — outbound channels
//! - Define **driving/inbound ports**:
//!   - `RuleService` — authoring CRUD, toggling, log queries
//!   - `RuleExecutor` — run a rule against a caller-supplied context
//! - Provide **in-process infrastructure** that doesn't need IO:
//!   - the trigger/action registries (fixed built-in catalogs)
//!   - the rule engine (matching, condition evaluation, action execution)
//!   - the event dispatcher (change-feed normalization + dispatch loop)
//!
//! ## Dependency rule
//! Depends on `rulehub-domain` only (plus `tokio::sync`/`tokio::time` for
//! channels and timers). Never imports adapter crates. Adapters depend on
//! *this* crate, not the reverse.

pub mod dispatcher;
pub mod engine;
pub mod ports;
pub mod registry;
pub mod services;
