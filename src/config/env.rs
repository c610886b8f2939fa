use super::{LogConfig, LogMode, LogSink, ProviderKind, RelayConfig};
use crate::domain::prompts::PromptSet;
use crate::utils::error::{RelayError, Result};
use std::env;
use std::str::FromStr;

impl RelayConfig {
    /// 從環境變數建立設定
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 以任意查詢函式建立設定；空字串視同未設定
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider = match get("FEEDBACK_PROVIDER") {
            Some(value) => value.parse()?,
            None if get("DEEPSEEK_API_KEY").is_none() && get("ZHIPU_API_KEY").is_some() => {
                ProviderKind::Zhipu
            }
            None => ProviderKind::Deepseek,
        };

        let api_key = get(provider.api_key_var()).ok_or_else(|| RelayError::MissingConfigError {
            field: provider.api_key_var().to_string(),
        })?;

        let airtable_api_key = get("AIRTABLE_API_KEY");
        let airtable_base_id = get("AIRTABLE_BASE_ID");
        let csv_path = get("LOG_CSV_PATH");

        let sink = match get("LOG_SINK") {
            Some(value) => value.parse()?,
            None if airtable_api_key.is_some() && airtable_base_id.is_some() => LogSink::Airtable,
            None if csv_path.is_some() => LogSink::Csv,
            None => LogSink::Disabled,
        };

        let mode = match get("LOG_MODE") {
            Some(value) => value.parse()?,
            None => LogMode::default(),
        };

        let defaults = LogConfig::default();
        let log = LogConfig {
            sink,
            mode,
            airtable_api_key,
            airtable_base_id,
            airtable_table: get("AIRTABLE_TABLE").unwrap_or(defaults.airtable_table),
            airtable_api_base: get("AIRTABLE_API_BASE").unwrap_or(defaults.airtable_api_base),
            csv_path,
        };

        Ok(Self {
            provider,
            api_key,
            api_base: get("PROVIDER_API_BASE"),
            model: get("PROVIDER_MODEL"),
            token_ttl_seconds: parse_number(
                "TOKEN_TTL_SECONDS",
                get("TOKEN_TTL_SECONDS"),
                super::DEFAULT_TOKEN_TTL_SECONDS,
            )?,
            request_timeout_seconds: parse_number(
                "REQUEST_TIMEOUT_SECONDS",
                get("REQUEST_TIMEOUT_SECONDS"),
                super::DEFAULT_REQUEST_TIMEOUT_SECONDS,
            )?,
            prompts: PromptSet {
                heuristic: get("PROMPT_HEURISTIC"),
                instructive: get("PROMPT_INSTRUCTIVE"),
            },
            log,
        })
    }
}

fn parse_number<T: FromStr>(field: &str, value: Option<String>, default: T) -> Result<T> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| RelayError::InvalidConfigValueError {
                field: field.to_string(),
                value: raw.clone(),
                reason: "Expected a non-negative integer".to_string(),
            }),
    }
}
