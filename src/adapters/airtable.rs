use crate::config::LogConfig;
use crate::domain::model::InteractionRecord;
use crate::domain::ports::InteractionLog;
use crate::utils::error::{RelayError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

const AIRTABLE_TIMEOUT_SECONDS: u64 = 30;

/// 將互動紀錄寫入 Airtable 表格
#[derive(Debug, Clone)]
pub struct AirtableLog {
    client: Client,
    url: Url,
    api_key: String,
}

impl AirtableLog {
    pub fn new(api_base: &str, base_id: &str, table: &str, api_key: String) -> Result<Self> {
        let mut url = Url::parse(api_base).map_err(|e| RelayError::ConfigError {
            message: format!("Invalid Airtable API base {}: {}", api_base, e),
        })?;
        url.path_segments_mut()
            .map_err(|_| RelayError::ConfigError {
                message: format!("Airtable API base cannot be a base URL: {}", api_base),
            })?
            .pop_if_empty()
            .push(base_id)
            .push(table);

        let client = Client::builder()
            .timeout(Duration::from_secs(AIRTABLE_TIMEOUT_SECONDS))
            .build()?;

        Ok(Self {
            client,
            url,
            api_key,
        })
    }

    pub fn from_config(config: &LogConfig) -> Result<Self> {
        let api_key = config
            .airtable_api_key
            .clone()
            .ok_or_else(|| RelayError::MissingConfigError {
                field: "log.airtable_api_key".to_string(),
            })?;
        let base_id = config
            .airtable_base_id
            .as_deref()
            .ok_or_else(|| RelayError::MissingConfigError {
                field: "log.airtable_base_id".to_string(),
            })?;

        Self::new(
            &config.airtable_api_base,
            base_id,
            &config.airtable_table,
            api_key,
        )
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }
}

#[async_trait]
impl InteractionLog for AirtableLog {
    fn name(&self) -> &str {
        "airtable"
    }

    async fn append(&self, record: &InteractionRecord) -> Result<()> {
        let payload = serde_json::json!({ "records": [{ "fields": record }] });

        let response = self
            .client
            .post(self.url.clone())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(RelayError::Upstream {
                status: status.as_u16(),
                message: text,
            });
        }

        tracing::info!(
            "📝 Airtable log successful for Participant: {}",
            record.participant_id
        );
        Ok(())
    }
}
