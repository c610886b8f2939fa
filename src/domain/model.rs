use crate::utils::error::RelayError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// 實驗組別，決定系統提示詞與取樣溫度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    /// 蘇格拉底式提問
    Heuristic,
    /// 直接批改
    Instructive,
}

impl Group {
    pub fn as_str(&self) -> &'static str {
        match self {
            Group::Heuristic => "heuristic",
            Group::Instructive => "instructive",
        }
    }

    pub fn temperature(&self) -> f32 {
        match self {
            Group::Heuristic => 0.7,
            Group::Instructive => 0.2,
        }
    }
}

impl FromStr for Group {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "heuristic" => Ok(Group::Heuristic),
            "instructive" => Ok(Group::Instructive),
            other => Err(RelayError::InvalidGroup {
                group: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 請求主體；group 保留原始字串，以便回報專屬的組別錯誤
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub participant_id: String,
    pub group: String,
    pub input_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackResponse {
    pub feedback: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    #[serde(rename = "Participant_ID")]
    pub participant_id: String,
    #[serde(rename = "Group")]
    pub group: Group,
    #[serde(rename = "Input_Text")]
    pub input_text: String,
    #[serde(rename = "AI_Feedback")]
    pub ai_feedback: String,
}

/// 觸發函式的 HTTP 事件 (proxy event 形狀)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpEvent {
    pub http_method: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

impl HttpEvent {
    pub fn post(body: impl Into<String>) -> Self {
        Self {
            http_method: "POST".to_string(),
            body: Some(body.into()),
            is_base64_encoded: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl HttpResponse {
    pub fn json(status_code: u16, body: serde_json::Value) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self {
            status_code,
            headers,
            body: body.to_string(),
        }
    }

    pub fn error(status_code: u16, message: &str) -> Self {
        Self::json(status_code, serde_json::json!({ "error": message }))
    }
}
