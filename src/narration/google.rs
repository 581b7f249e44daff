//! Google Cloud Text-to-Speech client.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{NarrationAudio, NarrationConfig, Synthesizer};

const DEFAULT_ENDPOINT: &str = "https://texttospeech.googleapis.com/v1/text:synthesize";

/// Narration synthesizer backed by the Google Cloud TTS REST API.
pub struct GoogleSynthesizer {
    config: NarrationConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct SynthesizeRequest {
    input: SynthesisInput,
    voice: VoiceSelection,
    #[serde(rename = "audioConfig")]
    audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
struct SynthesisInput {
    text: String,
}

#[derive(Debug, Serialize)]
struct VoiceSelection {
    #[serde(rename = "languageCode")]
    language_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
struct AudioConfig {
    #[serde(rename = "audioEncoding")]
    audio_encoding: &'static str,
    #[serde(rename = "speakingRate")]
    speaking_rate: f32,
}

#[derive(Debug, Deserialize)]
struct SynthesizeResponse {
    #[serde(rename = "audioContent")]
    audio_content: String,
}

impl GoogleSynthesizer {
    pub fn new(config: NarrationConfig) -> Result<Self> {
        if config.api_key.is_none() {
            return Err(anyhow!("speech service API key required"));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { config, client })
    }

    fn build_request(&self, text: &str, language_code: &str) -> SynthesizeRequest {
        SynthesizeRequest {
            input: SynthesisInput {
                text: text.to_string(),
            },
            voice: VoiceSelection {
                language_code: language_code.to_string(),
                name: self.config.voice_name.clone(),
            },
            audio_config: AudioConfig {
                audio_encoding: "MP3",
                speaking_rate: self.config.speaking_rate,
            },
        }
    }
}

#[async_trait]
impl Synthesizer for GoogleSynthesizer {
    async fn synthesize(&self, text: &str, language_code: &str) -> Result<NarrationAudio> {
        if text.trim().is_empty() {
            return Err(anyhow!("narration text is empty"));
        }

        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| anyhow!("speech service API key not configured"))?;

        let endpoint = self
            .config
            .endpoint
            .as_deref()
            .unwrap_or(DEFAULT_ENDPOINT);
        let url = format!("{}?key={}", endpoint, api_key);

        let request = self.build_request(text, language_code);

        debug!(
            "Requesting narration synthesis: {} chars, language {}",
            text.len(),
            language_code
        );

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("speech service error {}: {}", status, text));
        }

        let synthesized: SynthesizeResponse = response.json().await?;
        let data = BASE64
            .decode(synthesized.audio_content.as_bytes())
            .map_err(|e| anyhow!("invalid audio payload from speech service: {}", e))?;

        if data.is_empty() {
            return Err(anyhow!("speech service returned no audio"));
        }

        Ok(NarrationAudio { data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthesizer() -> GoogleSynthesizer {
        GoogleSynthesizer::new(NarrationConfig {
            api_key: Some("test-key".to_string()),
            voice_name: None,
            speaking_rate: 1.25,
            timeout_seconds: 5,
            endpoint: None,
        })
        .unwrap()
    }

    #[test]
    fn test_api_key_required() {
        assert!(GoogleSynthesizer::new(NarrationConfig::default()).is_err());
    }

    #[test]
    fn test_request_shape_matches_service_contract() {
        let request = synthesizer().build_request("Step one", "hi-IN");
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["input"]["text"], "Step one");
        assert_eq!(value["voice"]["languageCode"], "hi-IN");
        assert!(value["voice"].get("name").is_none());
        assert_eq!(value["audioConfig"]["audioEncoding"], "MP3");
        assert_eq!(value["audioConfig"]["speakingRate"], 1.25);
    }

    #[test]
    fn test_voice_name_included_when_set() {
        let mut config = NarrationConfig::default();
        config.api_key = Some("k".to_string());
        config.voice_name = Some("en-IN-Wavenet-A".to_string());
        let synth = GoogleSynthesizer::new(config).unwrap();
        let value = serde_json::to_value(synth.build_request("x", "en-IN")).unwrap();
        assert_eq!(value["voice"]["name"], "en-IN-Wavenet-A");
    }
}
