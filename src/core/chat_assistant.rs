// Chat assistant
//
// Tries the remote language model first and falls back to the keyword
// matcher's canned answers when there is no model or the call fails.

use crate::db::{Database, PredictionInput, PredictionKind};
use crate::error::{AdvisorError, Result};
use crate::intelligence::{detect_language, KeywordIntentMatcher, Language, Topic};
use crate::llm::{ChatMessage, ChatRequest, LanguageModel};
use crate::settings::ModelSettings;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

pub const SYSTEM_PREAMBLE: &str = "You are FarmGenie, an expert agricultural AI assistant specialized in Indian farming. You help with:

- Government schemes and subsidies (PM-KISAN, PMFBY, PMKSY)
- Crop recommendations and farming techniques
- Fertilizer and soil management advice
- Disease and pest identification and treatment
- Market prices and economic guidance
- Weather-based farming decisions
- Agricultural technology and mechanization
- Sustainable and organic farming practices
- Livestock integration and dairy farming
- Export opportunities and value addition

Always provide practical, actionable advice suitable for Indian agricultural conditions. Use simple language and include specific product names, schemes, and contact details when helpful.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyStatus {
    /// Answered by the language model
    Success,
    /// Answered from the knowledge base
    ComprehensiveFallback,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub response: String,
    pub language: Language,
    pub status: ReplyStatus,
    /// Matched topic; only set for knowledge base answers
    pub topic: Option<Topic>,
}

/// Request shaping for the remote model
#[derive(Debug, Clone, Copy)]
pub struct ChatOptions {
    pub max_tokens: u32,
    pub temperature: f32,
    pub history_limit: usize,
}

impl From<&ModelSettings> for ChatOptions {
    fn from(settings: &ModelSettings) -> Self {
        Self {
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            history_limit: settings.history_limit,
        }
    }
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self::from(&ModelSettings::default())
    }
}

pub struct ChatAssistant {
    matcher: Arc<KeywordIntentMatcher>,
    model: Option<Arc<dyn LanguageModel>>,
    options: ChatOptions,
    db: Option<Arc<Database>>,
}

impl ChatAssistant {
    /// Knowledge-base-only assistant
    pub fn new(matcher: Arc<KeywordIntentMatcher>) -> Self {
        Self {
            matcher,
            model: None,
            options: ChatOptions::default(),
            db: None,
        }
    }

    pub fn with_model(mut self, model: Arc<dyn LanguageModel>, options: ChatOptions) -> Self {
        self.model = Some(model);
        self.options = options;
        self
    }

    /// Record every reply in `db`
    pub fn with_database(mut self, db: Arc<Database>) -> Self {
        self.db = Some(db);
        self
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Answer the last message of a conversation
    ///
    /// # Returns
    /// * `Err(AdvisorError::InvalidInput)` - `messages` is empty
    pub async fn reply(&self, messages: &[ChatMessage]) -> Result<ChatReply> {
        let (latest, earlier) = messages.split_last().ok_or_else(|| {
            AdvisorError::InvalidInput("At least one message is required".to_string())
        })?;

        let reply = match &self.model {
            Some(model) => {
                let request = self.build_request(&latest.content, earlier);
                match model.chat(&request).await {
                    Ok(response) => ChatReply {
                        response,
                        language: detect_language(&latest.content),
                        status: ReplyStatus::Success,
                        topic: None,
                    },
                    Err(e) => {
                        warn!(
                            model = model.name(),
                            error = %e,
                            "language model failed, using knowledge base"
                        );
                        self.fallback(&latest.content)
                    }
                }
            }
            None => self.fallback(&latest.content),
        };

        // history is best effort; the caller still gets the answer
        if let Some(db) = &self.db {
            let input = PredictionInput {
                kind: PredictionKind::Chat,
                inputs: json!({
                    "message": latest.content,
                    "status": reply.status,
                    "topic": reply.topic,
                }),
                output: reply.response.clone(),
            };
            if let Err(e) = db.record_prediction(input).await {
                warn!(error = %e, "could not record chat reply");
            }
        }

        Ok(reply)
    }

    /// Knowledge base answer for `text`
    pub fn fallback(&self, text: &str) -> ChatReply {
        let classification = self.matcher.classify(text);
        info!(
            topic = ?classification.topic,
            score = classification.score,
            "answering from knowledge base"
        );

        ChatReply {
            response: self.matcher.response_for(&classification).to_string(),
            language: Language::English,
            status: ReplyStatus::ComprehensiveFallback,
            topic: classification.topic.filter(|_| classification.is_match()),
        }
    }

    fn build_request(&self, message: &str, earlier: &[ChatMessage]) -> ChatRequest {
        let skip = earlier.len().saturating_sub(self.options.history_limit);

        ChatRequest {
            message: message.to_string(),
            preamble: SYSTEM_PREAMBLE.to_string(),
            history: earlier[skip..].to_vec(),
            max_tokens: self.options.max_tokens,
            temperature: self.options.temperature,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intelligence::KnowledgeBase;
    use async_trait::async_trait;
    use std::sync::Mutex;

    // Replies with a fixed string and remembers the requests it saw
    struct ScriptedModel {
        reply: Option<String>,
        seen: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedModel {
        fn answering(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Some(reply.to_string()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: None,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn chat(&self, request: &ChatRequest) -> Result<String> {
            self.seen.lock().unwrap().push(request.clone());
            self.reply
                .clone()
                .ok_or_else(|| AdvisorError::Model("503 Service Unavailable".to_string()))
        }
    }

    fn matcher() -> Arc<KeywordIntentMatcher> {
        let kb = Arc::new(KnowledgeBase::builtin().unwrap());
        Arc::new(KeywordIntentMatcher::new(kb).unwrap())
    }

    #[tokio::test]
    async fn test_empty_conversation_rejected() {
        let assistant = ChatAssistant::new(matcher());

        let result = assistant.reply(&[]).await;
        assert!(matches!(result, Err(AdvisorError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_offline_uses_knowledge_base() {
        let matcher = matcher();
        let assistant = ChatAssistant::new(Arc::clone(&matcher));

        let reply = assistant
            .reply(&[ChatMessage::user("How do I claim crop insurance?")])
            .await
            .unwrap();

        assert_eq!(reply.status, ReplyStatus::ComprehensiveFallback);
        assert_eq!(reply.topic, Some(Topic::CropInsurance));
        assert_eq!(reply.language, Language::English);
        assert_eq!(
            reply.response,
            matcher.knowledge().get(Topic::CropInsurance).unwrap().response
        );
    }

    #[tokio::test]
    async fn test_model_answer_detects_language() {
        let model = ScriptedModel::answering("गेहूं नवंबर में बोएं");
        let assistant =
            ChatAssistant::new(matcher()).with_model(model, ChatOptions::default());

        let reply = assistant
            .reply(&[ChatMessage::user("गेहूं की खेती कब करें?")])
            .await
            .unwrap();

        assert_eq!(reply.status, ReplyStatus::Success);
        assert_eq!(reply.language, Language::Hindi);
        assert_eq!(reply.response, "गेहूं नवंबर में बोएं");
        assert_eq!(reply.topic, None);
    }

    #[tokio::test]
    async fn test_model_failure_falls_back() {
        let model = ScriptedModel::failing();
        let assistant =
            ChatAssistant::new(matcher()).with_model(model.clone(), ChatOptions::default());

        let reply = assistant
            .reply(&[ChatMessage::user("tractor subsidy")])
            .await
            .unwrap();

        assert_eq!(reply.status, ReplyStatus::ComprehensiveFallback);
        assert_eq!(reply.language, Language::English);
        assert_eq!(model.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_history_is_capped() {
        let model = ScriptedModel::answering("ok");
        let options = ChatOptions {
            history_limit: 3,
            ..ChatOptions::default()
        };
        let assistant = ChatAssistant::new(matcher()).with_model(model.clone(), options);

        let mut conversation: Vec<ChatMessage> = (0..6)
            .map(|i| {
                if i % 2 == 0 {
                    ChatMessage::user(format!("question {}", i))
                } else {
                    ChatMessage::assistant(format!("answer {}", i))
                }
            })
            .collect();
        conversation.push(ChatMessage::user("latest"));

        assistant.reply(&conversation).await.unwrap();

        let seen = model.seen.lock().unwrap();
        let request = &seen[0];
        assert_eq!(request.message, "latest");
        assert_eq!(request.preamble, SYSTEM_PREAMBLE);
        assert_eq!(
            request.history,
            vec![
                ChatMessage::assistant("answer 3"),
                ChatMessage::user("question 4"),
                ChatMessage::assistant("answer 5"),
            ]
        );
    }

    #[tokio::test]
    async fn test_replies_are_recorded() {
        let db = Arc::new(Database::new_test().await.unwrap());
        let assistant = ChatAssistant::new(matcher()).with_database(Arc::clone(&db));

        assistant
            .reply(&[ChatMessage::user("milk yield of buffalo")])
            .await
            .unwrap();

        let history = db
            .get_recent_predictions(Some(PredictionKind::Chat), 5)
            .await
            .unwrap();
        assert_eq!(history.len(), 1);

        let inputs = history[0].get_inputs();
        assert_eq!(inputs["topic"], "livestock");
        assert_eq!(inputs["status"], "comprehensive_fallback");
    }

    #[tokio::test]
    async fn test_reply_survives_storage_failure() {
        let db = Arc::new(Database::new_test().await.unwrap());
        db.close().await;
        let matcher = matcher();
        let assistant = ChatAssistant::new(Arc::clone(&matcher)).with_database(db);

        let reply = assistant
            .reply(&[ChatMessage::user("milk yield of buffalo")])
            .await
            .unwrap();

        assert_eq!(reply.topic, Some(Topic::Livestock));
        assert_eq!(
            reply.response,
            matcher.knowledge().get(Topic::Livestock).unwrap().response
        );
    }

    #[test]
    fn test_fallback_without_match() {
        let matcher = matcher();
        let assistant = ChatAssistant::new(Arc::clone(&matcher));

        let reply = assistant.fallback("hello there");
        assert_eq!(reply.topic, None);
        assert_eq!(reply.response, matcher.knowledge().fallback_response());
    }
}
