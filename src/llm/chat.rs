use crate::llm::CompletionProvider;
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_CHAT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Completion provider for OpenAI-compatible `/chat/completions` endpoints (Groq by default)
pub struct ChatCompletionProvider {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

impl ChatCompletionProvider {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for chat completions")?;

        Ok(Self {
            client,
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_CHAT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        })
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Unwrap the chat-completions envelope down to the generated text
pub(crate) fn extract_content(json: &Value) -> Result<String> {
    if let Some(error) = json.get("error") {
        anyhow::bail!("Chat completion API returned error: {}", error);
    }

    json["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow::anyhow!("Invalid response format: missing content in choices"))
}

#[async_trait::async_trait]
impl CompletionProvider for ChatCompletionProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        if self.api_key.is_empty() {
            anyhow::bail!("No API key configured for chat completions (set GROQ_API_KEY)");
        }

        let url = format!("{}/chat/completions", self.api_base);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Failed to connect to {}", self.api_base))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Chat completion API error {}: {}", status, error_text);
        }

        let json: Value = response
            .json()
            .await
            .context("Failed to parse chat completion response")?;

        extract_content(&json)
    }
}
