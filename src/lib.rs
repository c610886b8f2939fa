pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{AirtableLog, ChatClient, CsvLog, DisabledLog};
pub use config::{LogMode, LogSink, ProviderKind, RelayConfig};
pub use core::relay::FeedbackRelay;
pub use domain::model::{Group, HttpEvent, HttpResponse};
pub use utils::error::{RelayError, Result};
