//! OpenAI-compatible API client
//!
//! Async HTTP client for chat completions and embeddings against any
//! OpenAI-compatible endpoint. Transport failures are retried internally
//! up to a fixed bound; callers only see the final success or failure.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

use crate::core::{Config, Result, TableqaError};
use crate::llm::traits::{EmbeddingProvider, ModelProvider};

/// Transport retries per completion call
const MAX_RETRIES: usize = 3;

/// Sampling temperature for reasoning calls
const TEMPERATURE: f32 = 0.2;

/// OpenAI-compatible API client
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    chat_model: String,
    embedding_model: String,
    debug: bool,
}

/// Chat completion request
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

/// A chat message
#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

/// One completion choice
#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Embeddings request
#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

/// Embeddings response
#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

/// One embedding vector with its input index
#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAiClient {
    /// Create a new client with default configuration
    pub fn new() -> Self {
        Self::from_config(&Config::default())
    }

    /// Create a new client from configuration
    pub fn from_config(config: &Config) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.model.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: config.model.endpoint.trim_end_matches('/').to_string(),
            api_key: config.model.api_key.clone(),
            chat_model: config.model.chat_model.clone(),
            embedding_model: config.model.embedding_model.clone(),
            debug: config.agent.debug,
        }
    }

    /// Create a client with a custom base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let mut config = Config::default();
        config.model.endpoint = base_url.into();
        Self::from_config(&config)
    }

    /// Enable or disable debug output
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Debug print if enabled
    fn debug_print(&self, label: &str, content: &str) {
        if self.debug {
            if content.len() > 500 {
                eprintln!("DEBUG {}: {}...", label, &content[..500]);
            } else {
                eprintln!("DEBUG {}: {}", label, content);
            }
        }
    }

    /// One chat-completions round trip, no retries
    async fn chat_once(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.chat_model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                },
            ],
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    TableqaError::model(format!(
                        "Cannot connect to model endpoint at {}. Is it running?",
                        self.base_url
                    ))
                } else {
                    TableqaError::from(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(TableqaError::model(format!(
                "Chat request failed ({}): {}",
                status, error_text
            )));
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| TableqaError::model("Chat response contained no choices"))?;

        self.debug_print("Completion", &content);
        Ok(content)
    }
}

impl Default for OpenAiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelProvider for OpenAiClient {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let mut last_err = None;
        for retry in 0..MAX_RETRIES {
            match self.chat_once(system_prompt, user_prompt).await {
                Ok(content) => return Ok(content),
                Err(e) => {
                    warn!(retry = retry + 1, error = %e, "model call failed");
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| TableqaError::model("Model call failed")))
    }

    fn name(&self) -> &str {
        "openai-compatible"
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbeddingsRequest {
            model: &self.embedding_model,
            input: texts,
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    TableqaError::model(format!(
                        "Cannot connect to embedding endpoint at {}. Is it running?",
                        self.base_url
                    ))
                } else {
                    TableqaError::from(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(TableqaError::model(format!(
                "Embeddings request failed ({}): {}",
                status, error_text
            )));
        }

        let mut parsed: EmbeddingsResponse = response.json().await?;
        // The API is allowed to reorder; restore input order by index.
        parsed.data.sort_by_key(|item| item.index);
        Ok(parsed.data.into_iter().map(|item| item.embedding).collect())
    }

    fn model_name(&self) -> &str {
        &self.embedding_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let client = OpenAiClient::with_base_url("http://localhost:1220/v1/");
        assert_eq!(client.base_url, "http://localhost:1220/v1");
    }

    #[test]
    fn test_chat_request_serialization() {
        let request = ChatRequest {
            model: "qwen2.5-32b-instruct",
            messages: vec![ChatMessage {
                role: "system".to_string(),
                content: "hello".to_string(),
            }],
            temperature: TEMPERATURE,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("qwen2.5-32b-instruct"));
        assert!(json.contains("\"role\":\"system\""));
    }
}
