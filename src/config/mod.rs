#[cfg(feature = "cli")]
pub mod cli;
pub mod env;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

use crate::core::token::SigningKey;
use crate::domain::prompts::PromptSet;
use crate::utils::error::{RelayError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_TOKEN_TTL_SECONDS: u64 = 3600;
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 60;
pub const DEFAULT_AIRTABLE_API_BASE: &str = "https://api.airtable.com/v0";
pub const DEFAULT_AIRTABLE_TABLE: &str = "Log";

/// 上游對話補全供應商
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI 相容 API，靜態 bearer 金鑰
    Deepseek,
    /// 每次請求簽發短效權杖
    Zhipu,
}

impl ProviderKind {
    pub fn default_api_base(&self) -> &'static str {
        match self {
            ProviderKind::Deepseek => "https://api.deepseek.com",
            ProviderKind::Zhipu => "https://open.bigmodel.cn/api/paas/v4",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Deepseek => "deepseek-chat",
            ProviderKind::Zhipu => "glm-4",
        }
    }

    pub fn api_key_var(&self) -> &'static str {
        match self {
            ProviderKind::Deepseek => "DEEPSEEK_API_KEY",
            ProviderKind::Zhipu => "ZHIPU_API_KEY",
        }
    }

    pub fn uses_signed_token(&self) -> bool {
        matches!(self, ProviderKind::Zhipu)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Deepseek => "deepseek",
            ProviderKind::Zhipu => "zhipu",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deepseek" => Ok(ProviderKind::Deepseek),
            "zhipu" => Ok(ProviderKind::Zhipu),
            other => Err(RelayError::InvalidConfigValueError {
                field: "provider".to_string(),
                value: other.to_string(),
                reason: "Supported providers: deepseek, zhipu".to_string(),
            }),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSink {
    Airtable,
    Csv,
    #[default]
    Disabled,
}

impl FromStr for LogSink {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "airtable" => Ok(LogSink::Airtable),
            "csv" => Ok(LogSink::Csv),
            "disabled" | "none" => Ok(LogSink::Disabled),
            other => Err(RelayError::InvalidConfigValueError {
                field: "log.sink".to_string(),
                value: other.to_string(),
                reason: "Supported sinks: airtable, csv, disabled".to_string(),
            }),
        }
    }
}

/// 紀錄寫入方式：`Detached` 不等待寫入完成，`Inline` 等待但仍吞下錯誤
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogMode {
    #[default]
    Detached,
    Inline,
}

impl FromStr for LogMode {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "detached" => Ok(LogMode::Detached),
            "inline" => Ok(LogMode::Inline),
            other => Err(RelayError::InvalidConfigValueError {
                field: "log.mode".to_string(),
                value: other.to_string(),
                reason: "Supported modes: detached, inline".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub sink: LogSink,
    #[serde(default)]
    pub mode: LogMode,
    pub airtable_api_key: Option<String>,
    pub airtable_base_id: Option<String>,
    #[serde(default = "default_airtable_table")]
    pub airtable_table: String,
    #[serde(default = "default_airtable_api_base")]
    pub airtable_api_base: String,
    pub csv_path: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            sink: LogSink::default(),
            mode: LogMode::default(),
            airtable_api_key: None,
            airtable_base_id: None,
            airtable_table: default_airtable_table(),
            airtable_api_base: default_airtable_api_base(),
            csv_path: None,
        }
    }
}

fn default_airtable_table() -> String {
    DEFAULT_AIRTABLE_TABLE.to_string()
}

fn default_airtable_api_base() -> String {
    DEFAULT_AIRTABLE_API_BASE.to_string()
}

fn default_token_ttl() -> u64 {
    DEFAULT_TOKEN_TTL_SECONDS
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECONDS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    pub provider: ProviderKind,
    pub api_key: String,
    pub api_base: Option<String>,
    pub model: Option<String>,
    #[serde(default = "default_token_ttl")]
    pub token_ttl_seconds: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default)]
    pub prompts: PromptSet,
    #[serde(default)]
    pub log: LogConfig,
}

impl RelayConfig {
    pub fn new(provider: ProviderKind, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            api_base: None,
            model: None,
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECONDS,
            prompts: PromptSet::default(),
            log: LogConfig::default(),
        }
    }

    pub fn api_base(&self) -> &str {
        self.api_base
            .as_deref()
            .unwrap_or_else(|| self.provider.default_api_base())
    }

    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    pub fn chat_endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base().trim_end_matches('/'))
    }
}

impl Validate for RelayConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_secret("api_key", &self.api_key)?;
        if self.provider.uses_signed_token() {
            SigningKey::parse(&self.api_key)?;
        }

        validation::validate_url("api_base", self.api_base())?;
        validation::validate_non_empty_string("model", self.model())?;
        validation::validate_range("token_ttl_seconds", self.token_ttl_seconds, 60, 86_400)?;
        validation::validate_range(
            "request_timeout_seconds",
            self.request_timeout_seconds,
            1,
            600,
        )?;

        self.log.validate()?;

        tracing::debug!("✅ Relay configuration validation passed");
        Ok(())
    }
}

impl Validate for LogConfig {
    fn validate(&self) -> Result<()> {
        match self.sink {
            LogSink::Airtable => {
                let key = validation::validate_required_field(
                    "log.airtable_api_key",
                    &self.airtable_api_key,
                )?;
                validation::validate_secret("log.airtable_api_key", key)?;
                let base_id = validation::validate_required_field(
                    "log.airtable_base_id",
                    &self.airtable_base_id,
                )?;
                validation::validate_non_empty_string("log.airtable_base_id", base_id)?;
                validation::validate_non_empty_string("log.airtable_table", &self.airtable_table)?;
                validation::validate_url("log.airtable_api_base", &self.airtable_api_base)?;
            }
            LogSink::Csv => {
                let path = validation::validate_required_field("log.csv_path", &self.csv_path)?;
                validation::validate_path("log.csv_path", path)?;
            }
            LogSink::Disabled => {}
        }
        Ok(())
    }
}
