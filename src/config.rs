use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::llm::{LLMConfig, LLMProvider};
use crate::narration::NarrationConfig;
use crate::player::PlaybackConfig;

/// Configuration for the content repurposing engine
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Content generation (LLM) settings
    pub llm: LLMConfig,

    /// Narration synthesis settings
    pub narration: NarrationConfig,

    /// Lecture playback timing settings
    pub playback: PlaybackConfig,

    /// History persistence settings
    pub history: HistoryConfig,
}

/// History persistence settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Directory for history entries
    pub dir: PathBuf,

    /// Disable to skip recording generations
    pub enabled: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./history"),
            enabled: true,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let config_paths = [
            "adapt-ai.toml",
            "config/adapt-ai.toml",
            "~/.config/adapt-ai/config.toml",
        ];

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str::<Config>(&config_str) {
                    Ok(config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        return Ok(config.with_env_overrides());
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        Err(anyhow!("No configuration file found"))
    }

    /// Apply `ADAPT_AI_*` environment overrides
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(api_key) = std::env::var("ADAPT_AI_LLM_API_KEY") {
            self.llm.api_key = Some(api_key);
        }
        if let Ok(model) = std::env::var("ADAPT_AI_LLM_MODEL") {
            self.llm.model = model;
        }
        if let Ok(api_key) = std::env::var("ADAPT_AI_TTS_API_KEY") {
            self.narration.api_key = Some(api_key);
        }
        if let Ok(voice) = std::env::var("ADAPT_AI_TTS_VOICE") {
            self.narration.voice_name = Some(voice);
        }
        if let Ok(code) = std::env::var("ADAPT_AI_LANGUAGE_CODE") {
            self.playback.language_code = code;
        }
        if let Ok(dir) = std::env::var("ADAPT_AI_HISTORY_DIR") {
            self.history.dir = PathBuf::from(dir);
        }
        self
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path);
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.llm.model.trim().is_empty() {
            return Err(anyhow!("llm.model must not be empty"));
        }
        if self.llm.api_key.is_none() {
            return Err(anyhow!(
                "API key required for LLM provider {:?}",
                self.llm.provider
            ));
        }

        // Google TTS accepts rates between 0.25 and 4.0
        if !(0.25..=4.0).contains(&self.narration.speaking_rate) {
            return Err(anyhow!(
                "narration.speaking_rate must be between 0.25 and 4.0, got {}",
                self.narration.speaking_rate
            ));
        }

        if self.playback.language_code.trim().is_empty() {
            return Err(anyhow!("playback.language_code must not be empty"));
        }
        if self.playback.fallback_max_ms < self.playback.fallback_base_ms {
            return Err(anyhow!(
                "playback.fallback_max_ms must be at least fallback_base_ms"
            ));
        }

        if self.history.enabled {
            if let Err(e) = std::fs::create_dir_all(&self.history.dir) {
                return Err(anyhow!("Cannot create history directory: {}", e));
            }
        }

        tracing::info!("✅ Configuration validation passed");
        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Adapt AI Configuration:\n\
            - LLM Provider: {:?}\n\
            - LLM Model: {}\n\
            - Narration Voice: {}\n\
            - Speaking Rate: {}\n\
            - Language Code: {}\n\
            - Title Dwell: {}ms\n\
            - History Directory: {}",
            self.llm.provider,
            self.llm.model,
            self.narration.voice_name.as_deref().unwrap_or("(service default)"),
            self.narration.speaking_rate,
            self.playback.language_code,
            self.playback.title_dwell_ms,
            self.history.dir.display()
        )
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_llm_provider(mut self, provider: LLMProvider) -> Self {
        self.config.llm.provider = provider;
        self
    }

    pub fn with_llm_api_key(mut self, api_key: String) -> Self {
        self.config.llm.api_key = Some(api_key);
        self
    }

    pub fn with_llm_model(mut self, model: String) -> Self {
        self.config.llm.model = model;
        self
    }

    pub fn with_tts_api_key(mut self, api_key: String) -> Self {
        self.config.narration.api_key = Some(api_key);
        self
    }

    pub fn with_voice(mut self, voice_name: String) -> Self {
        self.config.narration.voice_name = Some(voice_name);
        self
    }

    pub fn with_speaking_rate(mut self, rate: f32) -> Self {
        self.config.narration.speaking_rate = rate;
        self
    }

    pub fn with_language_code(mut self, code: String) -> Self {
        self.config.playback.language_code = code;
        self
    }

    pub fn with_history_dir(mut self, dir: PathBuf) -> Self {
        self.config.history.dir = dir;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
