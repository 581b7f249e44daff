/// Adapt AI - Content Repurposing Engine
///
/// Transforms educational text into summaries, notes, quizzes and narrated
/// whiteboard lectures via hosted LLM and speech-synthesis services, and
/// drives synchronized lecture playback.

pub mod config;
pub mod history;
pub mod llm;
pub mod narration;
pub mod player;
pub mod repurpose;
pub mod speech;

#[cfg(feature = "api")]
pub mod api;

// Re-export main types for easy access
pub use crate::config::{Config, ConfigBuilder, HistoryConfig};
pub use crate::history::{HistoryInput, HistoryItem, HistoryStore};
pub use crate::llm::{LLMConfig, LLMProvider};
pub use crate::narration::{GoogleSynthesizer, NarrationAudio, NarrationConfig, Synthesizer};
pub use crate::player::{
    AudioSink, LecturePlayer, PlayOutcome, PlaybackConfig, PlaybackSnapshot, PlaybackStatus,
    PlayerError, Whiteboard,
};
pub use crate::repurpose::{
    ContentRepurposer, Lecture, OutputType, QuizItem, QuizKind, RepurposeOutput, RepurposeRequest,
    Slide,
};
pub use crate::speech::SpokenTextCleaner;

#[cfg(feature = "playback")]
pub use crate::player::RodioSink;
