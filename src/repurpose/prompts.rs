//! Prompt templates for the four generation flows.
//!
//! Each task ships with a built-in template; a prompt directory can override
//! any of them, one file per task (`summary.txt`, `notes.txt`, `quiz.txt`,
//! `lecture.txt`).

use anyhow::Result;
use std::path::Path;
use tracing::warn;

use super::OutputType;

const SUMMARY_PROMPT: &str = "\
You are an expert at condensing educational content. Summarize the following \
content in the specified language. Keep the key ideas, drop the filler, and \
write for a student encountering the topic for the first time.

Content: {content}
Language: {language}

Summary:";

const NOTES_PROMPT: &str = "\
You are an expert note-taker. Rewrite the following content as concise \
bullet-point study notes in the specified language. Group related points \
under short headings and keep each bullet self-contained.

Content: {content}
Language: {language}

Notes:";

const QUIZ_PROMPT: &str = "\
You are an advanced AI quiz generator. Based on the following content, \
generate a quiz in the specified language with a variety of question types: \
multiple choice, brief answer, true/false and fill in the blanks.

Output the quiz as a JSON array, where each item is an object with:
  - type: \"mcq\" | \"brief\" | \"truefalse\" | \"fillblank\"
  - question: string
  - options?: string[] (for mcq)
  - answer: string
  - explanation: string (a very brief explanation for the answer)

Return only the JSON array.

Content: {content}
Language: {language}

Quiz:";

const LECTURE_PROMPT: &str = "\
You are an AI assistant that converts content into a step-by-step lecture \
for whiteboard video playback, in the specified language.

Instructions:
- Generate a clear, concise title for the entire lecture as 'lectureTitle'.
- Break the content into slides. Each slide has an optional title and \
Markdown-formatted content (headings, bullet points, short paragraphs).
- For narration, include a 'speak' field per slide with plain spoken prose.
- Use clear, concise language suitable for a short whiteboard lecture. No \
avatar, gesture or animation instructions.

Return only a JSON object:
{\"lectureTitle\": string, \"slides\": [{\"title\"?: string, \"content\": \
string, \"speak\"?: string}], \"script\": string}

Content: {content}
Language: {language}

Lecture:";

/// Prompt templates, one per generation task.
#[derive(Debug, Clone)]
pub struct PromptLibrary {
    summary: String,
    notes: String,
    quiz: String,
    lecture: String,
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self {
            summary: SUMMARY_PROMPT.to_string(),
            notes: NOTES_PROMPT.to_string(),
            quiz: QUIZ_PROMPT.to_string(),
            lecture: LECTURE_PROMPT.to_string(),
        }
    }
}

impl PromptLibrary {
    /// Load templates from a directory, falling back to the built-in text
    /// for any file that is missing or unreadable.
    pub async fn from_dir(dir: &Path) -> Result<Self> {
        let mut library = Self::default();
        for (name, slot) in [
            ("summary.txt", &mut library.summary),
            ("notes.txt", &mut library.notes),
            ("quiz.txt", &mut library.quiz),
            ("lecture.txt", &mut library.lecture),
        ] {
            let path = dir.join(name);
            match tokio::fs::read_to_string(&path).await {
                Ok(content) if !content.trim().is_empty() => {
                    *slot = content.trim().to_string();
                }
                Ok(_) => warn!("Prompt file {} is empty, using built-in prompt", path.display()),
                Err(_) => {
                    warn!("Prompt file {} not found, using built-in prompt", path.display())
                }
            }
        }
        Ok(library)
    }

    fn template(&self, task: OutputType) -> &str {
        match task {
            OutputType::Summary => &self.summary,
            OutputType::Notes => &self.notes,
            OutputType::Quiz => &self.quiz,
            OutputType::Lecture => &self.lecture,
        }
    }

    /// Fill the task template with the user's content and target language.
    pub fn render(&self, task: OutputType, content: &str, language: &str) -> String {
        self.template(task)
            .replace("{content}", content)
            .replace("{language}", language)
    }
}
