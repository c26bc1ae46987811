//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod channels;
pub mod executor;
pub mod log_store;
pub mod record_store;
pub mod rule_repo;
pub mod template_store;

pub use channels::{EmailSender, HttpClient, HttpResponse, PushNotifier, SmsSender};
pub use executor::RuleExecutor;
pub use log_store::LogStore;
pub use record_store::RecordStore;
pub use rule_repo::RuleRepository;
pub use template_store::{MessageTemplate, TemplateStore};
