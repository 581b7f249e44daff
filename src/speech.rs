//! Spoken-text cleanup for narration synthesis.
//!
//! Generated slides carry Markdown, but the speech service should receive
//! plain prose. The cleaner strips Markdown syntax (links keep their link
//! text, images are dropped entirely), decodes HTML entities and collapses
//! whitespace so the synthesized narration sounds natural.

use regex::Regex;

/// Converts Markdown slide text into clean spoken text.
pub struct SpokenTextCleaner {
    code_fence: Regex,
    image: Regex,
    link: Regex,
    heading: Regex,
    quote_marker: Regex,
    list_marker: Regex,
    strong: Regex,
    emphasis: Regex,
    strikethrough: Regex,
    inline_code: Regex,
    whitespace: Regex,
}

impl SpokenTextCleaner {
    pub fn new() -> Self {
        Self {
            code_fence: Regex::new(r"(?m)^\s*```[^\n]*$").expect("valid regex"),
            image: Regex::new(r"!\[[^\]]*\]\([^)]*\)").expect("valid regex"),
            link: Regex::new(r"\[([^\]]*)\]\([^)]*\)").expect("valid regex"),
            heading: Regex::new(r"(?m)^\s{0,3}#{1,6}\s+").expect("valid regex"),
            quote_marker: Regex::new(r"(?m)^\s*>+\s?").expect("valid regex"),
            list_marker: Regex::new(r"(?m)^\s*(?:[-*+]|\d+[.)])\s+").expect("valid regex"),
            strong: Regex::new(r"(\*\*|__)([^*_]+?)(\*\*|__)").expect("valid regex"),
            emphasis: Regex::new(r"[*_]([^*_\n]+?)[*_]").expect("valid regex"),
            strikethrough: Regex::new(r"~~([^~]+?)~~").expect("valid regex"),
            inline_code: Regex::new(r"`([^`\n]*)`").expect("valid regex"),
            whitespace: Regex::new(r"\s+").expect("valid regex"),
        }
    }

    /// Strip Markdown syntax and collapse whitespace into single spaces.
    ///
    /// Idempotent: cleaning already-plain text returns it unchanged (modulo
    /// whitespace normalization).
    pub fn clean(&self, text: &str) -> String {
        let decoded = html_escape::decode_html_entities(text);

        let stripped = self.code_fence.replace_all(&decoded, "");
        let stripped = self.image.replace_all(&stripped, "");
        let stripped = self.link.replace_all(&stripped, "$1");
        let stripped = self.heading.replace_all(&stripped, "");
        let stripped = self.quote_marker.replace_all(&stripped, "");
        let stripped = self.list_marker.replace_all(&stripped, "");
        let stripped = self.strong.replace_all(&stripped, "$2");
        let stripped = self.emphasis.replace_all(&stripped, "$1");
        let stripped = self.strikethrough.replace_all(&stripped, "$1");
        let stripped = self.inline_code.replace_all(&stripped, "$1");

        self.whitespace.replace_all(&stripped, " ").trim().to_string()
    }
}

impl Default for SpokenTextCleaner {
    fn default() -> Self {
        Self::new()
    }
}
