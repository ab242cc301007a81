/// Cohere chat API client (`POST /v1/chat`).

use crate::error::{AdvisorError, Result};
use crate::llm::{ChatMessage, ChatRequest, LanguageModel, Role};
use crate::settings::ModelSettings;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

const EMPTY_REPLY: &str = "Sorry, I could not generate a response.";

pub struct CohereClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl CohereClient {
    pub fn new(settings: &ModelSettings, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: settings.model.clone(),
            endpoint: settings.endpoint.clone(),
        })
    }

    fn request_body(&self, request: &ChatRequest) -> Value {
        let mut body = json!({
            "model": self.model,
            "message": request.message,
            "preamble": request.preamble,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
        });

        // Cohere rejects an empty chat_history array, so leave it out
        if !request.history.is_empty() {
            let history: Vec<Value> = request.history.iter().map(history_turn).collect();
            body["chat_history"] = json!(history);
        }

        body
    }
}

fn history_turn(message: &ChatMessage) -> Value {
    let role = match message.role {
        Role::User => "USER",
        Role::Assistant => "CHATBOT",
    };
    json!({ "role": role, "message": message.content })
}

fn reply_text(data: &Value) -> String {
    data.get("text")
        .and_then(Value::as_str)
        .unwrap_or(EMPTY_REPLY)
        .to_string()
}

#[async_trait]
impl LanguageModel for CohereClient {
    fn name(&self) -> &str {
        "cohere"
    }

    async fn chat(&self, request: &ChatRequest) -> Result<String> {
        let body = self.request_body(request);
        debug!(model = %self.model, history = request.history.len(), "sending chat request");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AdvisorError::Model(format!("{}: {}", status, error_text)));
        }

        let data: Value = response.json().await?;
        Ok(reply_text(&data))
    }
}
