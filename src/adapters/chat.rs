use crate::config::{ProviderKind, RelayConfig};
use crate::core::token::SigningKey;
use crate::domain::ports::{ChatProvider, ChatRequest};
use crate::utils::error::{RelayError, Result};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// 上游授權方式
#[derive(Clone)]
pub enum Credential {
    Bearer(String),
    /// 每次請求重新簽發
    Signed { key: SigningKey, ttl_seconds: u64 },
}

impl Credential {
    pub fn from_config(config: &RelayConfig) -> Result<Self> {
        if config.provider.uses_signed_token() {
            Ok(Credential::Signed {
                key: SigningKey::parse(&config.api_key)?,
                ttl_seconds: config.token_ttl_seconds,
            })
        } else {
            Ok(Credential::Bearer(config.api_key.trim().to_string()))
        }
    }

    pub fn authorization(&self) -> Result<String> {
        match self {
            Credential::Bearer(key) => Ok(format!("Bearer {}", key)),
            Credential::Signed { key, ttl_seconds } => {
                Ok(format!("Bearer {}", key.mint_now(*ttl_seconds)?))
            }
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Bearer(_) => f.write_str("Bearer(<redacted>)"),
            Credential::Signed { key, ttl_seconds } => f
                .debug_struct("Signed")
                .field("key", key)
                .field("ttl_seconds", ttl_seconds)
                .finish(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    error: Option<ProviderErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorDetail {
    message: Option<String>,
}

/// OpenAI 相容的 `/chat/completions` 客戶端
#[derive(Debug)]
pub struct ChatClient {
    client: Client,
    provider: ProviderKind,
    endpoint: String,
    model: String,
    credential: Credential,
}

impl ChatClient {
    pub fn new(
        provider: ProviderKind,
        endpoint: String,
        model: String,
        credential: Credential,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            provider,
            endpoint,
            model,
            credential,
        })
    }

    pub fn from_config(config: &RelayConfig) -> Result<Self> {
        Self::new(
            config.provider,
            config.chat_endpoint(),
            config.model().to_string(),
            Credential::from_config(config)?,
            Duration::from_secs(config.request_timeout_seconds),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// 取出供應商錯誤主體中的 `error.message`，否則回傳原始內容
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<ProviderErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .and_then(|detail| detail.message)
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl ChatProvider for ChatClient {
    fn name(&self) -> &str {
        self.provider.as_str()
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        let body = ChatCompletionBody {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_text,
                },
            ],
            temperature: request.temperature,
        };

        let authorization = self.credential.authorization()?;

        tracing::debug!(
            "📡 {}: POST {} (model {}, temperature {})",
            self.provider,
            self.endpoint,
            self.model,
            request.temperature
        );
        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, authorization)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("📡 {}: response status {}", self.provider, status);

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(RelayError::Upstream {
                status: status.as_u16(),
                message: extract_error_message(&text),
            });
        }

        let parsed: ChatCompletionResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| RelayError::Upstream {
                status: status.as_u16(),
                message: "Response contained no message content".to_string(),
            })
    }
}
