//! Narration synthesis: text in, playable audio out.

pub mod google;

pub use google::GoogleSynthesizer;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Narration synthesis settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrationConfig {
    /// API key for the speech service
    pub api_key: Option<String>,

    /// Specific voice name; the service default is used when empty
    pub voice_name: Option<String>,

    /// Playback rate, 1.0 = normal speed
    pub speaking_rate: f32,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// Endpoint override, mainly for tests and proxies
    pub endpoint: Option<String>,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            voice_name: None,
            speaking_rate: 1.0,
            timeout_seconds: 30,
            endpoint: None,
        }
    }
}

/// Synthesized narration payload (MP3 bytes)
#[derive(Debug, Clone)]
pub struct NarrationAudio {
    pub data: Vec<u8>,
}

impl NarrationAudio {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn content_type(&self) -> &'static str {
        "audio/mpeg"
    }
}

/// Trait for narration synthesis services
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, language_code: &str) -> Result<NarrationAudio>;
}

/// Map a user-facing language name to the BCP-47 code the speech service
/// expects. Values that already look like codes pass through unchanged.
pub fn language_code(language: &str) -> String {
    let name = language.trim();
    if name.contains('-') {
        return name.to_string();
    }
    match name.to_ascii_lowercase().as_str() {
        "english" => "en-IN".to_string(),
        "hindi" => "hi-IN".to_string(),
        "bengali" => "bn-IN".to_string(),
        "tamil" => "ta-IN".to_string(),
        "telugu" => "te-IN".to_string(),
        _ => "en-IN".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_name_mapping() {
        assert_eq!(language_code("English"), "en-IN");
        assert_eq!(language_code("hindi"), "hi-IN");
        assert_eq!(language_code("Bengali"), "bn-IN");
        assert_eq!(language_code("Tamil"), "ta-IN");
        assert_eq!(language_code("Telugu"), "te-IN");
    }

    #[test]
    fn test_codes_pass_through() {
        assert_eq!(language_code("en-US"), "en-US");
        assert_eq!(language_code(" hi-IN "), "hi-IN");
    }

    #[test]
    fn test_unknown_language_defaults_to_english() {
        assert_eq!(language_code("Klingon"), "en-IN");
    }
}
