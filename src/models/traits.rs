use anyhow::Result;
use async_trait::async_trait;

use super::types::{ChatMessage, ModelResponse};

/// Core trait that all model backends must implement
#[async_trait]
pub trait Model: Send + Sync {
    /// Send the full conversation to the model and get its reply
    async fn chat(&mut self, messages: &[ChatMessage]) -> Result<ModelResponse>;

    /// Get the name of the model
    fn name(&self) -> &str;
}
