use super::{LogMode, LogSink, ProviderKind, RelayConfig};
use crate::domain::model::HttpEvent;
use crate::utils::error::{RelayError, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "feedback-relay")]
#[command(about = "Relay student writing to an LLM provider and print the feedback")]
pub struct CliConfig {
    #[arg(long, help = "Experiment group: heuristic or instructive")]
    pub group: String,

    #[arg(long, default_value = "cli")]
    pub participant_id: String,

    #[arg(long, conflicts_with = "input_file", required_unless_present = "input_file")]
    pub input_text: Option<String>,

    #[arg(long, help = "Read the student text from a file")]
    pub input_file: Option<PathBuf>,

    #[arg(long, help = "TOML config file; environment variables are used otherwise")]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub provider: Option<ProviderKind>,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long, help = "Append the interaction to this CSV file")]
    pub log_csv: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// 載入基礎設定並套用命令列覆寫；CLI 一律等待紀錄寫入完成
    pub fn relay_config(&self) -> Result<RelayConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let mut config = RelayConfig::from_file(path)?;
                if let Some(provider) = self.provider {
                    config.provider = provider;
                }
                config
            }
            None => {
                let provider = self.provider;
                RelayConfig::from_lookup(|key| match (key, provider) {
                    ("FEEDBACK_PROVIDER", Some(p)) => Some(p.as_str().to_string()),
                    _ => std::env::var(key).ok(),
                })?
            }
        };

        if let Some(model) = &self.model {
            config.model = Some(model.clone());
        }
        if let Some(path) = &self.log_csv {
            config.log.sink = LogSink::Csv;
            config.log.csv_path = Some(path.clone());
        }
        config.log.mode = LogMode::Inline;

        Ok(config)
    }

    pub fn input_text(&self) -> Result<String> {
        match (&self.input_text, &self.input_file) {
            (Some(text), _) => Ok(text.clone()),
            (None, Some(path)) => Ok(std::fs::read_to_string(path)?),
            (None, None) => Err(RelayError::ConfigError {
                message: "Either --input-text or --input-file is required".to_string(),
            }),
        }
    }

    /// 組成與 HTTP 觸發相同的事件，讓 CLI 走同一條處理路徑
    pub fn to_event(&self) -> Result<HttpEvent> {
        let body = serde_json::json!({
            "participantId": self.participant_id,
            "group": self.group,
            "inputText": self.input_text()?,
        });
        Ok(HttpEvent::post(body.to_string()))
    }
}
