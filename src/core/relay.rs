use crate::adapters::{build_log_sink, ChatClient};
use crate::config::{LogMode, RelayConfig};
use crate::domain::model::{FeedbackRequest, Group, HttpEvent, HttpResponse, InteractionRecord};
use crate::domain::ports::{ChatProvider, ChatRequest, InteractionLog};
use crate::domain::prompts::PromptSet;
use crate::utils::error::{ErrorCategory, RelayError, Result};
use crate::utils::validation::Validate;
use base64::{engine::general_purpose::STANDARD, Engine};
use std::sync::Arc;

/// 單一端點的回饋轉發器：驗證請求、呼叫上游模型、寫入互動紀錄
pub struct FeedbackRelay<P: ChatProvider> {
    provider: P,
    log: Arc<dyn InteractionLog>,
    prompts: PromptSet,
    log_mode: LogMode,
}

impl FeedbackRelay<ChatClient> {
    pub fn from_config(config: &RelayConfig) -> Result<Self> {
        config.validate()?;

        let provider = ChatClient::from_config(config)?;
        let log = build_log_sink(&config.log)?;

        tracing::info!(
            "🚀 Feedback relay ready: provider {} ({}), log sink {} ({:?})",
            config.provider,
            config.model(),
            log.name(),
            config.log.mode
        );

        Ok(Self::new(provider, log)
            .with_prompts(config.prompts.clone())
            .with_log_mode(config.log.mode))
    }
}

impl<P: ChatProvider> FeedbackRelay<P> {
    pub fn new(provider: P, log: Arc<dyn InteractionLog>) -> Self {
        Self {
            provider,
            log,
            prompts: PromptSet::default(),
            log_mode: LogMode::default(),
        }
    }

    pub fn with_prompts(mut self, prompts: PromptSet) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_log_mode(mut self, log_mode: LogMode) -> Self {
        self.log_mode = log_mode;
        self
    }

    /// 處理一個 HTTP 事件，永遠回傳 JSON 回應
    pub async fn handle(&self, event: HttpEvent) -> HttpResponse {
        if !event.http_method.eq_ignore_ascii_case("POST") {
            tracing::warn!("Rejected {} request", event.http_method);
            return HttpResponse::error(405, "Method Not Allowed");
        }

        match self.relay(&event).await {
            Ok(feedback) => HttpResponse::json(200, serde_json::json!({ "feedback": feedback })),
            Err(e) => {
                if e.category() == ErrorCategory::Client {
                    tracing::warn!("❌ Client error: {}", e);
                } else {
                    tracing::error!("❌ Handler error: {} (Category: {:?})", e, e.category());
                }
                HttpResponse::error(e.status_code(), e.public_message())
            }
        }
    }

    /// 解析請求、取得回饋並寫入紀錄；紀錄失敗不影響結果
    pub async fn relay(&self, event: &HttpEvent) -> Result<String> {
        let request = parse_request(event)?;
        let group: Group = request.group.parse()?;

        tracing::info!(
            "Relaying feedback request for participant {} (group {}) to {}",
            request.participant_id,
            group,
            self.provider.name()
        );

        let chat_request = ChatRequest {
            system_prompt: self.prompts.for_group(group).to_string(),
            user_text: request.input_text.clone(),
            temperature: group.temperature(),
        };
        let feedback = self.provider.complete(&chat_request).await?;

        self.record(InteractionRecord {
            participant_id: request.participant_id,
            group,
            input_text: request.input_text,
            ai_feedback: feedback.clone(),
        })
        .await;

        Ok(feedback)
    }

    async fn record(&self, record: InteractionRecord) {
        match self.log_mode {
            LogMode::Inline => append_and_swallow(self.log.as_ref(), &record).await,
            LogMode::Detached => {
                let log = Arc::clone(&self.log);
                tokio::spawn(async move {
                    append_and_swallow(log.as_ref(), &record).await;
                });
            }
        }
    }
}

async fn append_and_swallow(log: &dyn InteractionLog, record: &InteractionRecord) {
    if let Err(e) = log.append(record).await {
        tracing::error!("{} logging failed: {}", log.name(), e);
    }
}

fn parse_request(event: &HttpEvent) -> Result<FeedbackRequest> {
    let invalid = |message: String| RelayError::InvalidRequest { message };

    let raw = event
        .body
        .as_deref()
        .ok_or_else(|| invalid("missing body".to_string()))?;

    let body = if event.is_base64_encoded {
        let bytes = STANDARD
            .decode(raw)
            .map_err(|e| invalid(format!("invalid base64 body: {}", e)))?;
        String::from_utf8(bytes).map_err(|e| invalid(format!("body is not UTF-8: {}", e)))?
    } else {
        raw.to_string()
    };

    serde_json::from_str(&body).map_err(|e| invalid(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::mpsc;

    struct MockProvider {
        reply: Option<String>,
        calls: Arc<AtomicUsize>,
        last_request: std::sync::Mutex<Option<ChatRequest>>,
    }

    impl MockProvider {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Some(reply.to_string()),
                calls: Arc::new(AtomicUsize::new(0)),
                last_request: std::sync::Mutex::new(None),
            }
        }

        fn failing() -> Self {
            Self {
                reply: None,
                calls: Arc::new(AtomicUsize::new(0)),
                last_request: std::sync::Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl ChatProvider for MockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        async fn complete(&self, request: &ChatRequest) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            self.reply.clone().ok_or_else(|| RelayError::Upstream {
                status: 503,
                message: "model overloaded".to_string(),
            })
        }
    }

    struct ChannelLog {
        tx: mpsc::UnboundedSender<InteractionRecord>,
    }

    #[async_trait]
    impl InteractionLog for ChannelLog {
        fn name(&self) -> &str {
            "channel"
        }

        async fn append(&self, record: &InteractionRecord) -> Result<()> {
            let _ = self.tx.send(record.clone());
            Ok(())
        }
    }

    struct FailingLog {
        attempts: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl InteractionLog for FailingLog {
        fn name(&self) -> &str {
            "failing"
        }

        async fn append(&self, _record: &InteractionRecord) -> Result<()> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(RelayError::IoError(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "store unavailable",
            )))
        }
    }

    fn channel_log() -> (Arc<dyn InteractionLog>, mpsc::UnboundedReceiver<InteractionRecord>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(ChannelLog { tx }), rx)
    }

    fn body(group: &str) -> String {
        serde_json::json!({
            "participantId": "P007",
            "group": group,
            "inputText": "I has a apple."
        })
        .to_string()
    }

    fn parse_body(response: &HttpResponse) -> serde_json::Value {
        serde_json::from_str(&response.body).unwrap()
    }

    #[tokio::test]
    async fn test_success_returns_upstream_content_verbatim() {
        let (log, _rx) = channel_log();
        let relay = FeedbackRelay::new(MockProvider::replying("  - **原文:** I has\n"), log);

        let response = relay.handle(HttpEvent::post(body("instructive"))).await;

        assert_eq!(response.status_code, 200);
        assert_eq!(
            parse_body(&response),
            serde_json::json!({"feedback": "  - **原文:** I has\n"})
        );
    }

    #[tokio::test]
    async fn test_group_selects_prompt_and_temperature() {
        let (log, _rx) = channel_log();
        let prompts = PromptSet {
            heuristic: Some("Ask.".to_string()),
            instructive: Some("Correct.".to_string()),
        };
        let relay =
            FeedbackRelay::new(MockProvider::replying("ok"), log).with_prompts(prompts);

        relay.handle(HttpEvent::post(body("heuristic"))).await;
        let sent = relay.provider.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(sent.system_prompt, "Ask.");
        assert_eq!(sent.temperature, 0.7);
        assert_eq!(sent.user_text, "I has a apple.");

        relay.handle(HttpEvent::post(body("instructive"))).await;
        let sent = relay.provider.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(sent.system_prompt, "Correct.");
        assert_eq!(sent.temperature, 0.2);
    }

    #[tokio::test]
    async fn test_unknown_group_is_400_without_upstream_call() {
        let (log, mut rx) = channel_log();
        let provider = MockProvider::replying("unused");
        let calls = Arc::clone(&provider.calls);
        let relay = FeedbackRelay::new(provider, log).with_log_mode(LogMode::Inline);

        for group in ["control", "Heuristic", ""] {
            let response = relay.handle(HttpEvent::post(body(group))).await;
            assert_eq!(response.status_code, 400);
            assert_eq!(
                parse_body(&response),
                serde_json::json!({"error": "Invalid group specified."})
            );
        }

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_non_post_is_405() {
        let (log, _rx) = channel_log();
        let provider = MockProvider::replying("unused");
        let calls = Arc::clone(&provider.calls);
        let relay = FeedbackRelay::new(provider, log);

        for method in ["GET", "PUT", "OPTIONS", "DELETE"] {
            let event = HttpEvent {
                http_method: method.to_string(),
                body: Some(body("heuristic")),
                is_base64_encoded: false,
            };
            let response = relay.handle(event).await;
            assert_eq!(response.status_code, 405);
            assert_eq!(
                parse_body(&response),
                serde_json::json!({"error": "Method Not Allowed"})
            );
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_malformed_body_is_400() {
        let (log, _rx) = channel_log();
        let relay = FeedbackRelay::new(MockProvider::replying("unused"), log);

        let missing = HttpEvent {
            http_method: "POST".to_string(),
            body: None,
            is_base64_encoded: false,
        };
        for event in [
            missing,
            HttpEvent::post("not json"),
            HttpEvent::post(r#"{"group": "heuristic"}"#),
        ] {
            let response = relay.handle(event).await;
            assert_eq!(response.status_code, 400);
            assert_eq!(
                parse_body(&response),
                serde_json::json!({"error": "Invalid request body."})
            );
        }
    }

    #[tokio::test]
    async fn test_base64_body_is_decoded() {
        let (log, _rx) = channel_log();
        let relay = FeedbackRelay::new(MockProvider::replying("fine"), log);

        let event = HttpEvent {
            http_method: "post".to_string(),
            body: Some(STANDARD.encode(body("heuristic"))),
            is_base64_encoded: true,
        };
        let response = relay.handle(event).await;
        assert_eq!(response.status_code, 200);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_generic_500() {
        let (log, mut rx) = channel_log();
        let relay =
            FeedbackRelay::new(MockProvider::failing(), log).with_log_mode(LogMode::Inline);

        let response = relay.handle(HttpEvent::post(body("heuristic"))).await;

        assert_eq!(response.status_code, 500);
        assert_eq!(
            parse_body(&response),
            serde_json::json!({"error": "An unknown server error occurred."})
        );
        assert!(!response.body.contains("overloaded"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_log_failure_does_not_change_response() {
        for mode in [LogMode::Inline, LogMode::Detached] {
            let attempts = Arc::new(AtomicUsize::new(0));
            let failing: Arc<dyn InteractionLog> = Arc::new(FailingLog {
                attempts: Arc::clone(&attempts),
            });
            let (ok_log, _rx) = channel_log();

            let failing_relay =
                FeedbackRelay::new(MockProvider::replying("same"), failing).with_log_mode(mode);
            let ok_relay =
                FeedbackRelay::new(MockProvider::replying("same"), ok_log).with_log_mode(mode);

            let with_failure = failing_relay.handle(HttpEvent::post(body("heuristic"))).await;
            let without_failure = ok_relay.handle(HttpEvent::post(body("heuristic"))).await;

            assert_eq!(with_failure, without_failure);
            assert_eq!(with_failure.status_code, 200);

            if mode == LogMode::Inline {
                assert_eq!(attempts.load(Ordering::SeqCst), 1);
            }
        }
    }

    #[tokio::test]
    async fn test_inline_log_written_before_response() {
        let (log, mut rx) = channel_log();
        let relay =
            FeedbackRelay::new(MockProvider::replying("feedback"), log).with_log_mode(LogMode::Inline);

        relay.handle(HttpEvent::post(body("instructive"))).await;

        let record = rx.try_recv().unwrap();
        assert_eq!(
            record,
            InteractionRecord {
                participant_id: "P007".to_string(),
                group: Group::Instructive,
                input_text: "I has a apple.".to_string(),
                ai_feedback: "feedback".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_detached_log_eventually_written() {
        let (log, mut rx) = channel_log();
        let relay = FeedbackRelay::new(MockProvider::replying("feedback"), log);

        let response = relay.handle(HttpEvent::post(body("heuristic"))).await;
        assert_eq!(response.status_code, 200);

        let record = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.participant_id, "P007");
        assert_eq!(record.group, Group::Heuristic);
    }
}
