//! Lecture package types: the unit handed to the playback sequencer.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use super::quiz::strip_code_fences;

/// One unit of lecture content: display text plus optional narration text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slide {
    /// Informational slide title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Markdown text shown on the whiteboard
    pub content: String,

    /// Narration text; the slide content is spoken when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speak: Option<String>,
}

impl Slide {
    /// Text submitted for narration synthesis. Falls back to the displayed
    /// content when no dedicated narration was generated.
    pub fn narration(&self) -> &str {
        match &self.speak {
            Some(speak) if !speak.trim().is_empty() => speak,
            _ => &self.content,
        }
    }
}

/// Ordered collection of slides plus an optional title.
///
/// Vector order is playback order. A lecture must contain at least one
/// slide to be playable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lecture {
    #[serde(
        rename = "lectureTitle",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,

    pub slides: Vec<Slide>,

    /// Full narration script, kept for reference/export
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
}

impl Lecture {
    /// Parse a lecture package from raw LLM output.
    ///
    /// The model sometimes wraps the JSON in Markdown code fences; those are
    /// removed before parsing.
    pub fn parse(raw: &str) -> Result<Self> {
        let body = strip_code_fences(raw);
        let lecture: Lecture =
            serde_json::from_str(body).context("failed to parse lecture package JSON")?;
        lecture.validate()?;
        Ok(lecture)
    }

    /// A lecture is playable when it has at least one slide with content.
    pub fn validate(&self) -> Result<()> {
        if self.slides.is_empty() {
            return Err(anyhow!("lecture package contains no slides"));
        }
        if self.slides.iter().all(|s| s.content.trim().is_empty()) {
            return Err(anyhow!("lecture package contains only empty slides"));
        }
        Ok(())
    }
}
