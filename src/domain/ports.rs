use crate::domain::model::InteractionRecord;
use crate::utils::error::Result;
use async_trait::async_trait;

/// 一次對話補全所需的輸入
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub system_prompt: String,
    pub user_text: String,
    pub temperature: f32,
}

#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// 回傳模型產生的第一個選項內容
    async fn complete(&self, request: &ChatRequest) -> Result<String>;
}

#[async_trait]
pub trait InteractionLog: Send + Sync {
    fn name(&self) -> &str;

    async fn append(&self, record: &InteractionRecord) -> Result<()>;
}
