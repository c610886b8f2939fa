// Adapters layer: concrete implementations for external systems (chat provider, record stores).

pub mod airtable;
pub mod chat;
pub mod csv_log;

use crate::config::{LogConfig, LogSink};
use crate::domain::model::InteractionRecord;
use crate::domain::ports::InteractionLog;
use crate::utils::error::{RelayError, Result};
use async_trait::async_trait;
use std::sync::Arc;

pub use airtable::AirtableLog;
pub use chat::{ChatClient, Credential};
pub use csv_log::CsvLog;

/// 未設定紀錄儲存時使用：記錄錯誤後略過
#[derive(Debug, Default)]
pub struct DisabledLog;

#[async_trait]
impl InteractionLog for DisabledLog {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn append(&self, record: &InteractionRecord) -> Result<()> {
        tracing::error!(
            "Interaction log not configured. Skipping log for Participant: {}",
            record.participant_id
        );
        Ok(())
    }
}

pub fn build_log_sink(config: &LogConfig) -> Result<Arc<dyn InteractionLog>> {
    let sink: Arc<dyn InteractionLog> = match config.sink {
        LogSink::Airtable => Arc::new(AirtableLog::from_config(config)?),
        LogSink::Csv => {
            let path = config
                .csv_path
                .as_deref()
                .ok_or_else(|| RelayError::MissingConfigError {
                    field: "log.csv_path".to_string(),
                })?;
            Arc::new(CsvLog::new(path))
        }
        LogSink::Disabled => Arc::new(DisabledLog),
    };

    tracing::debug!("Interaction log sink: {}", sink.name());
    Ok(sink)
}
