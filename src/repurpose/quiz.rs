//! Quiz parsing and validation.
//!
//! The generation service returns the quiz as a JSON-encoded array of
//! question items, sometimes wrapped in Markdown code fences.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

/// Question kinds produced by the quiz flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizKind {
    Mcq,
    Brief,
    #[serde(rename = "truefalse")]
    TrueFalse,
    #[serde(rename = "fillblank")]
    FillBlank,
}

/// A single quiz question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizItem {
    #[serde(rename = "type")]
    pub kind: QuizKind,

    pub question: String,

    /// Choices, present for MCQ items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,

    pub answer: String,

    /// Brief explanation for the answer
    pub explanation: String,
}

/// Parse a quiz from raw LLM output.
pub fn parse_quiz(raw: &str) -> Result<Vec<QuizItem>> {
    let body = strip_code_fences(raw);
    let items: Vec<QuizItem> =
        serde_json::from_str(body).context("failed to parse quiz JSON")?;

    if items.is_empty() {
        return Err(anyhow!("quiz contains no questions"));
    }

    for (index, item) in items.iter().enumerate() {
        if item.question.trim().is_empty() {
            return Err(anyhow!("quiz question {} is empty", index + 1));
        }
        if item.kind == QuizKind::Mcq {
            let count = item.options.as_ref().map_or(0, |o| o.len());
            if count < 2 {
                return Err(anyhow!(
                    "MCQ question {} needs at least two options, got {}",
                    index + 1,
                    count
                ));
            }
        }
    }

    Ok(items)
}

/// Remove a surrounding Markdown code fence, if present.
pub(crate) fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    if let Some(rest) = trimmed.strip_prefix("```") {
        // Skip the info string on the opening fence line
        let body = match rest.split_once('\n') {
            Some((_, body)) => body,
            None => return trimmed,
        };
        if let Some(inner) = body.trim_end().strip_suffix("```") {
            return inner.trim();
        }
    }
    trimmed
}
