//! OpenAI-compatible adapter for the LLM port.
//!
//! Supports OpenAI API, Azure OpenAI, and local Ollama instances.
//! One request per call; non-2xx responses surface as `DomainError::Ai`.

use crate::domain::DomainError;
use crate::ports::{CompletionOptions, LlmMessage, LlmPort};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// OpenAI-compatible chat completions client.
///
/// Can be configured to work with:
/// - OpenAI API (api.openai.com)
/// - Azure OpenAI
/// - Ollama (localhost)
/// - Any OpenAI-compatible API
pub struct OpenAiAdapter {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl OpenAiAdapter {
    /// Create a new OpenAI adapter.
    ///
    /// # Arguments
    /// * `api_url` - API endpoint (e.g., "https://api.openai.com/v1/chat/completions")
    /// * `api_key` - API key (can be empty for local Ollama)
    /// * `model` - Model name (e.g., "gpt-4o-mini", "llama3.2")
    /// * `timeout` - Whole-request timeout
    pub fn new(api_url: String, api_key: String, model: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "falling back to default HTTP client");
                reqwest::Client::new()
            });
        Self {
            client,
            api_url,
            api_key,
            model,
        }
    }

    fn build_request(&self, messages: &[LlmMessage], options: &CompletionOptions) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str().to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            response_format: options.json.then(|| ResponseFormat {
                format_type: "json_object".to_string(),
            }),
        }
    }
}

/// OpenAI API request structure.
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

/// OpenAI API response structure.
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait::async_trait]
impl LlmPort for OpenAiAdapter {
    async fn complete(
        &self,
        messages: &[LlmMessage],
        options: &CompletionOptions,
    ) -> Result<String, DomainError> {
        let prompt_len: usize = messages.iter().map(|m| m.content.len()).sum();
        info!(
            model = %self.model,
            messages = messages.len(),
            prompt_len,
            json = options.json,
            "sending completion request"
        );

        let request = self.build_request(messages, options);

        let mut builder = self
            .client
            .post(&self.api_url)
            .header("Content-Type", "application/json")
            .json(&request);
        if !self.api_key.is_empty() {
            builder = builder.header("Authorization", format!("Bearer {}", self.api_key));
        }
        let response = builder
            .send()
            .await
            .map_err(|e| DomainError::Ai(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %text, "AI API returned error");
            return Err(DomainError::Ai(format!(
                "API error {}: {}",
                status,
                text.chars().take(200).collect::<String>()
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Ai(format!("Failed to parse API response: {}", e)))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .ok_or_else(|| DomainError::Ai("No response choices returned".to_string()))?;

        debug!(raw_len = content.len(), "received completion");

        Ok(content)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> OpenAiAdapter {
        OpenAiAdapter::new(
            "http://localhost:11434/v1/chat/completions".into(),
            String::new(),
            "llama3.2".into(),
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_request_json_mode() {
        let req = adapter().build_request(
            &[LlmMessage::system("sys"), LlmMessage::user("hi")],
            &CompletionOptions::json(0.2).with_max_tokens(256),
        );
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["model"], "llama3.2");
        assert_eq!(v["messages"][0]["role"], "system");
        assert_eq!(v["messages"][1]["content"], "hi");
        assert_eq!(v["max_tokens"], 256);
        assert_eq!(v["response_format"]["type"], "json_object");
    }

    #[test]
    fn test_request_text_mode_omits_format() {
        let req = adapter().build_request(&[LlmMessage::user("hi")], &CompletionOptions::text(0.3));
        let v = serde_json::to_value(&req).unwrap();
        assert!(v.get("response_format").is_none());
        assert!(v.get("max_tokens").is_none());
    }

    #[test]
    fn test_parse_response() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"  hello  "}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("  hello  "));
    }
}
