pub mod providers;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// LLM provider types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum LLMProvider {
    Gemini,
    OpenAI,
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    pub provider: LLMProvider,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_seconds: u64,

    /// Directory with prompt template overrides, one file per task
    pub prompt_dir: Option<PathBuf>,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::Gemini,
            api_key: None,
            model: "gemini-1.5-flash".to_string(),
            max_tokens: 8192,
            temperature: 0.4,
            timeout_seconds: 120,
            prompt_dir: None,
        }
    }
}

/// Chat message for LLM communication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// LLM response
#[derive(Debug, Clone)]
pub struct LLMResponse {
    pub content: String,
    pub tokens_used: Option<u32>,
}

/// Trait for LLM providers
#[async_trait]
pub trait LLM: Send + Sync {
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<LLMResponse>;
    async fn is_available(&self) -> bool;
    fn provider_type(&self) -> LLMProvider;
}

/// Create LLM instance based on configuration
pub fn create_llm(config: &LLMConfig) -> Result<Box<dyn LLM>> {
    match config.provider {
        LLMProvider::Gemini => Ok(Box::new(providers::GeminiProvider::new(config.clone())?)),
        LLMProvider::OpenAI => Ok(Box::new(providers::OpenAIProvider::new(config.clone())?)),
    }
}
