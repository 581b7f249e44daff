//! Content-generation flows: summary, notes, quiz, lecture.
//!
//! Each flow sends a task-specific prompt to the configured LLM and parses
//! the response into a validated, structured output.

pub mod lecture;
pub mod prompts;
pub mod quiz;

pub use lecture::{Lecture, Slide};
pub use prompts::PromptLibrary;
pub use quiz::{QuizItem, QuizKind};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::info;

use crate::llm::{create_llm, ChatMessage, LLMConfig, LLM};

/// Minimum content length accepted for generation
pub const MIN_CONTENT_CHARS: usize = 20;

/// Target output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputType {
    Summary,
    Notes,
    Quiz,
    Lecture,
}

impl OutputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputType::Summary => "summary",
            OutputType::Notes => "notes",
            OutputType::Quiz => "quiz",
            OutputType::Lecture => "lecture",
        }
    }
}

impl FromStr for OutputType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "summary" => Ok(OutputType::Summary),
            "notes" => Ok(OutputType::Notes),
            "quiz" => Ok(OutputType::Quiz),
            "lecture" => Ok(OutputType::Lecture),
            other => Err(anyhow!("unknown output type: {}", other)),
        }
    }
}

/// A single generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepurposeRequest {
    pub content: String,
    pub output_type: OutputType,
    pub language: String,
}

impl RepurposeRequest {
    pub fn new(content: impl Into<String>, output_type: OutputType, language: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            output_type,
            language: language.into(),
        }
    }

    /// Input validation; rejected requests never reach the LLM.
    pub fn validate(&self) -> Result<()> {
        if self.content.trim().chars().count() < MIN_CONTENT_CHARS {
            return Err(anyhow!(
                "content must be at least {} characters long",
                MIN_CONTENT_CHARS
            ));
        }
        if self.language.trim().is_empty() {
            return Err(anyhow!("a target language is required"));
        }
        Ok(())
    }
}

/// Structured generation result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RepurposeOutput {
    Summary { summary: String },
    Notes { notes: String },
    Quiz { quiz: Vec<QuizItem> },
    Lecture { lecture: Lecture },
}

impl RepurposeOutput {
    pub fn output_type(&self) -> OutputType {
        match self {
            RepurposeOutput::Summary { .. } => OutputType::Summary,
            RepurposeOutput::Notes { .. } => OutputType::Notes,
            RepurposeOutput::Quiz { .. } => OutputType::Quiz,
            RepurposeOutput::Lecture { .. } => OutputType::Lecture,
        }
    }
}

/// Runs the four content-transformation flows against the configured LLM.
pub struct ContentRepurposer {
    llm: Box<dyn LLM>,
    prompts: PromptLibrary,
}

impl ContentRepurposer {
    pub fn new(config: &LLMConfig) -> Result<Self> {
        Ok(Self {
            llm: create_llm(config)?,
            prompts: PromptLibrary::default(),
        })
    }

    /// Create a repurposer, loading prompt overrides from the configured
    /// prompt directory when one is set.
    pub async fn from_config(config: &LLMConfig) -> Result<Self> {
        let prompts = match &config.prompt_dir {
            Some(dir) => PromptLibrary::from_dir(dir).await?,
            None => PromptLibrary::default(),
        };
        Ok(Self {
            llm: create_llm(config)?,
            prompts,
        })
    }

    pub fn with_prompts(mut self, prompts: PromptLibrary) -> Self {
        self.prompts = prompts;
        self
    }

    /// Run one generation request end to end.
    pub async fn repurpose(&self, request: &RepurposeRequest) -> Result<RepurposeOutput> {
        request.validate()?;

        info!(
            "🧠 Repurposing {} chars into {} ({})",
            request.content.len(),
            request.output_type.as_str(),
            request.language
        );

        let raw = self.run_flow(request).await?;

        match request.output_type {
            OutputType::Summary => Ok(RepurposeOutput::Summary {
                summary: raw.trim().to_string(),
            }),
            OutputType::Notes => Ok(RepurposeOutput::Notes {
                notes: raw.trim().to_string(),
            }),
            OutputType::Quiz => Ok(RepurposeOutput::Quiz {
                quiz: quiz::parse_quiz(&raw)?,
            }),
            OutputType::Lecture => Ok(RepurposeOutput::Lecture {
                lecture: Lecture::parse(&raw)?,
            }),
        }
    }

    async fn run_flow(&self, request: &RepurposeRequest) -> Result<String> {
        let prompt = self
            .prompts
            .render(request.output_type, &request.content, &request.language);

        let response = self.llm.chat(vec![ChatMessage::user(prompt)]).await?;

        if response.content.trim().is_empty() {
            return Err(anyhow!("generation service returned an empty response"));
        }

        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_type_round_trip() {
        for (name, value) in [
            ("summary", OutputType::Summary),
            ("notes", OutputType::Notes),
            ("quiz", OutputType::Quiz),
            ("lecture", OutputType::Lecture),
        ] {
            assert_eq!(name.parse::<OutputType>().unwrap(), value);
            assert_eq!(value.as_str(), name);
        }
        assert!("poem".parse::<OutputType>().is_err());
    }

    #[test]
    fn test_short_content_rejected() {
        let request = RepurposeRequest::new("too short", OutputType::Summary, "English");
        let err = request.validate().unwrap_err();
        assert!(err.to_string().contains("at least"));
    }

    #[test]
    fn test_blank_language_rejected() {
        let request = RepurposeRequest::new(
            "long enough content for the validation to pass",
            OutputType::Notes,
            "  ",
        );
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_valid_request_accepted() {
        let request = RepurposeRequest::new(
            "Photosynthesis converts light energy into chemical energy.",
            OutputType::Lecture,
            "Hindi",
        );
        assert!(request.validate().is_ok());
    }
}
