//! Provider traits for the two opaque external collaborators
//!
//! The orchestrator only ever sees `complete(prompt) -> text | failure`;
//! the retrieval subsystem only ever sees `embed(text) -> vector`.

use async_trait::async_trait;

use crate::core::Result;

/// Trait for reasoning-model providers.
///
/// Implementations handle transport, credentials, and internal retries;
/// callers see a single blocking completion per invocation. No streaming:
/// the reply is consumed whole.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Send a system prompt and a user turn, return the raw completion text
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;

    /// Get the provider name
    fn name(&self) -> &str;
}

/// Trait for embedding providers.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a batch of texts, one vector per input, order preserved
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// The embedding model identifier
    fn model_name(&self) -> &str;
}
