//! Lecture playback sequencer.
//!
//! Drives the whiteboard display and narration audio in lockstep, slide by
//! slide, advancing automatically when narration finishes. Playback is an
//! explicit state machine (`Idle → ShowingTitle → Playing → Idle`) with a
//! cancelled flag checked at every asynchronous resumption point, so a
//! late-arriving synthesis response never starts playback into a stopped
//! session.

pub mod sink;
pub mod whiteboard;

#[cfg(feature = "playback")]
pub use sink::RodioSink;
pub use sink::{AudioSink, PlayOutcome};
pub use whiteboard::Whiteboard;

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::narration::{NarrationAudio, Synthesizer};
use crate::repurpose::{Lecture, Slide};
use crate::speech::SpokenTextCleaner;

/// Playback session states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackStatus {
    /// No active session
    Idle,
    /// Lecture title shown, before the first slide
    ShowingTitle,
    /// Stepping through slides
    Playing,
}

/// Observable playback state for the hosting UI
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackSnapshot {
    pub status: PlaybackStatus,
    pub slide_index: Option<usize>,
    pub board_text: String,
    pub title: Option<String>,
}

impl PlaybackSnapshot {
    fn idle() -> Self {
        Self {
            status: PlaybackStatus::Idle,
            slide_index: None,
            board_text: String::new(),
            title: None,
        }
    }
}

/// Timing configuration for the sequencer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// How long the lecture title is shown before slide 0 (ms)
    pub title_dwell_ms: u64,

    /// Blank-board delay before each slide's content appears (ms)
    pub wipe_delay_ms: u64,

    /// Narration language code submitted to the speech service
    pub language_code: String,

    /// Fallback advance when narration is unavailable: base wait (ms)
    pub fallback_base_ms: u64,

    /// Fallback advance: additional wait per content character (ms)
    pub fallback_per_char_ms: u64,

    /// Fallback advance: upper bound (ms)
    pub fallback_max_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            title_dwell_ms: 1200,
            wipe_delay_ms: 400,
            language_code: "en-IN".to_string(),
            fallback_base_ms: 2000,
            fallback_per_char_ms: 60,
            fallback_max_ms: 15_000,
        }
    }
}

impl PlaybackConfig {
    fn title_dwell(&self) -> Duration {
        Duration::from_millis(self.title_dwell_ms)
    }

    fn wipe_delay(&self) -> Duration {
        Duration::from_millis(self.wipe_delay_ms)
    }

    /// Bounded wait proportional to content length, used when a slide has no
    /// narration audio to key advancement on.
    fn fallback_advance(&self, content: &str) -> Duration {
        let chars = content.chars().count() as u64;
        let ms = self
            .fallback_base_ms
            .saturating_add(chars.saturating_mul(self.fallback_per_char_ms))
            .min(self.fallback_max_ms);
        Duration::from_millis(ms)
    }
}

/// Errors returned by [`LecturePlayer::start`]
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("lecture package contains no slides")]
    EmptyLecture,
}

struct Session {
    cancelled: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

struct Shared {
    synthesizer: Arc<dyn Synthesizer>,
    sink: Arc<dyn AudioSink>,
    config: PlaybackConfig,
    cleaner: SpokenTextCleaner,
    state: watch::Sender<PlaybackSnapshot>,
}

/// Presents a lecture package as a timed sequence of whiteboard screens,
/// each accompanied by synthesized narration.
pub struct LecturePlayer {
    shared: Arc<Shared>,
    session: Mutex<Option<Session>>,
}

impl LecturePlayer {
    pub fn new(synthesizer: Arc<dyn Synthesizer>, sink: Arc<dyn AudioSink>) -> Self {
        Self::with_config(synthesizer, sink, PlaybackConfig::default())
    }

    pub fn with_config(
        synthesizer: Arc<dyn Synthesizer>,
        sink: Arc<dyn AudioSink>,
        config: PlaybackConfig,
    ) -> Self {
        let (state, _rx) = watch::channel(PlaybackSnapshot::idle());
        Self {
            shared: Arc::new(Shared {
                synthesizer,
                sink,
                config,
                cleaner: SpokenTextCleaner::new(),
                state,
            }),
            session: Mutex::new(None),
        }
    }

    /// Observe status, slide index and displayed content.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.shared.state.subscribe()
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.shared.state.borrow().clone()
    }

    pub fn status(&self) -> PlaybackStatus {
        self.shared.state.borrow().status
    }

    pub fn current_slide(&self) -> Option<usize> {
        self.shared.state.borrow().slide_index
    }

    /// Begin playback of a lecture package.
    ///
    /// Any session still active is fully stopped first. The title (when
    /// present) is shown for the configured dwell, during which slide 0's
    /// narration is prefetched; then slides play in order.
    pub fn start(&self, lecture: Lecture) -> Result<(), PlayerError> {
        if lecture.slides.is_empty() {
            return Err(PlayerError::EmptyLecture);
        }

        self.stop();

        let cancelled = Arc::new(AtomicBool::new(false));
        let shared = self.shared.clone();
        let flag = cancelled.clone();
        let task = tokio::spawn(async move {
            run_session(shared, lecture, flag).await;
        });

        *self.lock_session() = Some(Session { cancelled, task });
        Ok(())
    }

    /// Halt narration immediately and clear the display.
    ///
    /// Safe to call in any state, including while a narration fetch is in
    /// flight; a result arriving after the stop is discarded.
    pub fn stop(&self) {
        let session = self.lock_session().take();
        if let Some(session) = session {
            session.cancelled.store(true, Ordering::SeqCst);
            session.task.abort();
            self.shared.sink.stop();
            debug!("⏹️  Playback session stopped");
        }
        let _ = self.shared.state.send(PlaybackSnapshot::idle());
    }

    /// Narration cannot resume mid-slide; pausing is equivalent to [`stop`].
    ///
    /// [`stop`]: LecturePlayer::stop
    pub fn pause(&self) {
        self.stop();
    }

    /// Stop playback and release the audio resource. Call when the hosting
    /// view closes.
    pub fn teardown(&self) {
        self.stop();
    }

    fn lock_session(&self) -> MutexGuard<'_, Option<Session>> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Publish a snapshot unless the session was cancelled. Stop publishes the
/// idle snapshot after setting the flag, so either interleaving ends Idle.
fn publish(shared: &Shared, cancelled: &AtomicBool, snapshot: PlaybackSnapshot) {
    shared.state.send_if_modified(|current| {
        if cancelled.load(Ordering::SeqCst) || *current == snapshot {
            return false;
        }
        *current = snapshot;
        true
    });
}

async fn run_session(shared: Arc<Shared>, lecture: Lecture, cancelled: Arc<AtomicBool>) {
    let config = &shared.config;
    let title = lecture.title.clone();

    info!(
        "🎬 Starting lecture playback: {} slides{}",
        lecture.slides.len(),
        title.as_deref().map(|t| format!(" ({})", t)).unwrap_or_default()
    );

    publish(
        &shared,
        &cancelled,
        PlaybackSnapshot {
            status: PlaybackStatus::ShowingTitle,
            slide_index: None,
            board_text: String::new(),
            title: title.clone(),
        },
    );

    // Eagerly fetch slide 0 narration during the title dwell to cut
    // perceived start-up latency.
    let mut prefetch = Some(spawn_prefetch(&shared, &lecture.slides[0]));

    tokio::time::sleep(config.title_dwell()).await;
    if cancelled.load(Ordering::SeqCst) {
        return;
    }

    for (index, slide) in lecture.slides.iter().enumerate() {
        // Wipe the board before the next slide appears
        publish(
            &shared,
            &cancelled,
            PlaybackSnapshot {
                status: PlaybackStatus::Playing,
                slide_index: Some(index),
                board_text: String::new(),
                title: title.clone(),
            },
        );
        tokio::time::sleep(config.wipe_delay()).await;
        if cancelled.load(Ordering::SeqCst) {
            return;
        }

        publish(
            &shared,
            &cancelled,
            PlaybackSnapshot {
                status: PlaybackStatus::Playing,
                slide_index: Some(index),
                board_text: slide.content.clone(),
                title: title.clone(),
            },
        );

        let audio = match prefetch.take() {
            Some(handle) => handle.await.ok().flatten(),
            None => synthesize_slide(&shared, index, slide).await,
        };

        // A stop while the fetch was in flight discards the result.
        if cancelled.load(Ordering::SeqCst) {
            return;
        }

        match audio {
            Some(audio) => {
                debug!("🔊 Playing narration for slide {} ({} bytes)", index, audio.len());
                match shared.sink.play(audio).await {
                    Ok(PlayOutcome::Completed) => {}
                    Ok(PlayOutcome::Stopped) => return,
                    Err(e) => {
                        warn!("Audio playback failed for slide {}: {}", index, e);
                        tokio::time::sleep(config.fallback_advance(&slide.content)).await;
                    }
                }
            }
            None => {
                // No narration to key advancement on; advance after a
                // bounded wait proportional to the content length.
                tokio::time::sleep(config.fallback_advance(&slide.content)).await;
            }
        }
        if cancelled.load(Ordering::SeqCst) {
            return;
        }
    }

    info!("🏁 Lecture playback finished");
    publish(&shared, &cancelled, PlaybackSnapshot::idle());
}

fn spawn_prefetch(shared: &Arc<Shared>, slide: &Slide) -> JoinHandle<Option<NarrationAudio>> {
    let shared = shared.clone();
    let slide = slide.clone();
    tokio::spawn(async move { synthesize_slide(&shared, 0, &slide).await })
}

async fn synthesize_slide(shared: &Shared, index: usize, slide: &Slide) -> Option<NarrationAudio> {
    let spoken = shared.cleaner.clean(slide.narration());
    if spoken.is_empty() {
        debug!("Slide {} has no speakable text", index);
        return None;
    }

    match shared
        .synthesizer
        .synthesize(&spoken, &shared.config.language_code)
        .await
    {
        Ok(audio) if !audio.is_empty() => Some(audio),
        Ok(_) => {
            warn!("🔇 Speech service returned no audio for slide {}", index);
            None
        }
        Err(e) => {
            warn!("🔇 Narration synthesis failed for slide {}: {}", index, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::{oneshot, Notify};
    use tokio::time::timeout;

    struct MockSynth {
        calls: AtomicUsize,
        started: Notify,
        gate: Option<Arc<Notify>>,
        fail: bool,
    }

    impl MockSynth {
        fn ok() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                started: Notify::new(),
                gate: None,
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                started: Notify::new(),
                gate: None,
                fail: true,
            })
        }

        fn gated(gate: Arc<Notify>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                started: Notify::new(),
                gate: Some(gate),
                fail: false,
            })
        }
    }

    #[async_trait]
    impl Synthesizer for MockSynth {
        async fn synthesize(&self, _text: &str, _language_code: &str) -> Result<NarrationAudio> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.started.notify_one();
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.fail {
                return Err(anyhow!("synthesis unavailable"));
            }
            Ok(NarrationAudio { data: vec![0xFF; 16] })
        }
    }

    struct MockSink {
        plays: AtomicUsize,
        active: AtomicUsize,
        overlapped: AtomicBool,
        current: Mutex<Option<oneshot::Sender<PlayOutcome>>>,
    }

    impl MockSink {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                plays: AtomicUsize::new(0),
                active: AtomicUsize::new(0),
                overlapped: AtomicBool::new(false),
                current: Mutex::new(None),
            })
        }

        /// Simulate the audio element's "ended" event for the active play.
        async fn simulate_ended(&self) {
            timeout(Duration::from_secs(2), async {
                loop {
                    let sender = self.current.lock().unwrap().take();
                    if let Some(tx) = sender {
                        let _ = tx.send(PlayOutcome::Completed);
                        return;
                    }
                    tokio::time::sleep(Duration::from_millis(2)).await;
                }
            })
            .await
            .expect("no active playback to end");
        }
    }

    /// Decrements the active-play counter even when the play future is
    /// dropped at its await point by a session abort.
    struct ActiveGuard<'a>(&'a AtomicUsize);

    impl Drop for ActiveGuard<'_> {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl AudioSink for MockSink {
        async fn play(&self, _audio: NarrationAudio) -> Result<PlayOutcome> {
            if self.active.fetch_add(1, Ordering::SeqCst) + 1 > 1 {
                self.overlapped.store(true, Ordering::SeqCst);
            }
            let _guard = ActiveGuard(&self.active);
            self.plays.fetch_add(1, Ordering::SeqCst);

            let (tx, rx) = oneshot::channel();
            *self.current.lock().unwrap() = Some(tx);
            let outcome = rx.await.unwrap_or(PlayOutcome::Stopped);

            Ok(outcome)
        }

        fn stop(&self) {
            if let Some(tx) = self.current.lock().unwrap().take() {
                let _ = tx.send(PlayOutcome::Stopped);
            }
        }
    }

    fn test_config() -> PlaybackConfig {
        PlaybackConfig {
            title_dwell_ms: 20,
            wipe_delay_ms: 30,
            language_code: "en-IN".to_string(),
            fallback_base_ms: 10,
            fallback_per_char_ms: 0,
            fallback_max_ms: 50,
        }
    }

    fn lecture(title: Option<&str>, contents: &[&str]) -> Lecture {
        Lecture {
            title: title.map(String::from),
            slides: contents
                .iter()
                .map(|c| Slide {
                    title: None,
                    content: c.to_string(),
                    speak: None,
                })
                .collect(),
            script: None,
        }
    }

    async fn wait_for(
        rx: &mut watch::Receiver<PlaybackSnapshot>,
        what: &str,
        pred: impl Fn(&PlaybackSnapshot) -> bool,
    ) {
        let waited = timeout(Duration::from_secs(2), async {
            loop {
                if pred(&rx.borrow_and_update()) {
                    return;
                }
                rx.changed().await.expect("state channel closed");
            }
        })
        .await;
        assert!(waited.is_ok(), "timed out waiting for {}", what);
    }

    #[test]
    fn test_playback_config_defaults() {
        let config = PlaybackConfig::default();
        assert_eq!(config.title_dwell_ms, 1200);
        assert_eq!(config.wipe_delay_ms, 400);
    }

    #[test]
    fn test_fallback_advance_is_bounded() {
        let config = test_config();
        assert_eq!(config.fallback_advance(""), Duration::from_millis(10));

        let mut config = test_config();
        config.fallback_per_char_ms = 1000;
        assert_eq!(
            config.fallback_advance("a long slide"),
            Duration::from_millis(50)
        );
    }

    #[tokio::test]
    async fn test_full_sequence_advances_in_order() {
        let synth = MockSynth::ok();
        let sink = MockSink::new();
        let player =
            LecturePlayer::with_config(synth.clone(), sink.clone(), test_config());
        let mut rx = player.subscribe();

        player
            .start(lecture(Some("Photosynthesis"), &["Step 1", "Step 2"]))
            .unwrap();

        wait_for(&mut rx, "title screen", |s| {
            s.status == PlaybackStatus::ShowingTitle
                && s.title.as_deref() == Some("Photosynthesis")
                && s.board_text.is_empty()
                && s.slide_index.is_none()
        })
        .await;

        wait_for(&mut rx, "slide 0", |s| {
            s.status == PlaybackStatus::Playing
                && s.slide_index == Some(0)
                && s.board_text == "Step 1"
        })
        .await;

        sink.simulate_ended().await;

        // Board is wiped before slide 1's content appears
        wait_for(&mut rx, "wipe before slide 1", |s| {
            s.slide_index == Some(1) && s.board_text.is_empty()
        })
        .await;
        wait_for(&mut rx, "slide 1", |s| s.board_text == "Step 2").await;

        sink.simulate_ended().await;

        wait_for(&mut rx, "return to idle", |s| {
            s.status == PlaybackStatus::Idle && s.board_text.is_empty() && s.slide_index.is_none()
        })
        .await;

        assert_eq!(sink.plays.load(Ordering::SeqCst), 2);
        assert_eq!(synth.calls.load(Ordering::SeqCst), 2);
        assert!(!sink.overlapped.load(Ordering::SeqCst), "audio overlapped");
    }

    #[tokio::test]
    async fn test_title_dwell_precedes_first_slide() {
        let synth = MockSynth::ok();
        let sink = MockSink::new();
        let mut config = test_config();
        config.title_dwell_ms = 100;
        let player = LecturePlayer::with_config(synth, sink, config);
        let mut rx = player.subscribe();

        player.start(lecture(Some("Cells"), &["Step 1"])).unwrap();

        wait_for(&mut rx, "title screen", |s| {
            s.status == PlaybackStatus::ShowingTitle
        })
        .await;

        // Well inside the dwell window nothing has been displayed yet
        tokio::time::sleep(Duration::from_millis(30)).await;
        let snapshot = player.snapshot();
        assert_eq!(snapshot.status, PlaybackStatus::ShowingTitle);
        assert!(snapshot.board_text.is_empty());

        wait_for(&mut rx, "playback", |s| s.status == PlaybackStatus::Playing).await;
    }

    #[tokio::test]
    async fn test_stop_discards_inflight_fetch() {
        let gate = Arc::new(Notify::new());
        let synth = MockSynth::gated(gate.clone());
        let sink = MockSink::new();
        let player =
            LecturePlayer::with_config(synth.clone(), sink.clone(), test_config());

        player.start(lecture(None, &["Step 1"])).unwrap();

        // The slide-0 prefetch is now in flight
        timeout(Duration::from_secs(1), synth.started.notified())
            .await
            .expect("synthesis never started");

        player.stop();
        assert_eq!(player.status(), PlaybackStatus::Idle);

        // The late response must be discarded, not played
        gate.notify_one();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(sink.plays.load(Ordering::SeqCst), 0);
        assert_eq!(player.status(), PlaybackStatus::Idle);
    }

    #[tokio::test]
    async fn test_stop_immediately_after_start() {
        let synth = MockSynth::ok();
        let sink = MockSink::new();
        let player =
            LecturePlayer::with_config(synth, sink.clone(), test_config());

        player
            .start(lecture(Some("Photosynthesis"), &["Step 1", "Step 2"]))
            .unwrap();
        player.stop();

        assert_eq!(player.status(), PlaybackStatus::Idle);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(sink.plays.load(Ordering::SeqCst), 0);
        assert_eq!(player.status(), PlaybackStatus::Idle);
        assert!(player.snapshot().board_text.is_empty());
    }

    #[tokio::test]
    async fn test_synthesis_failure_advances_with_fallback() {
        let synth = MockSynth::failing();
        let sink = MockSink::new();
        let player =
            LecturePlayer::with_config(synth.clone(), sink.clone(), test_config());
        let mut rx = player.subscribe();

        player.start(lecture(None, &["Step 1", "Step 2"])).unwrap();

        // Playback runs to completion on fallback timers alone
        wait_for(&mut rx, "idle after fallback advances", |s| {
            s.status == PlaybackStatus::Idle
        })
        .await;

        assert_eq!(sink.plays.load(Ordering::SeqCst), 0);
        assert_eq!(synth.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_restart_replaces_active_session() {
        let synth = MockSynth::ok();
        let sink = MockSink::new();
        let player =
            LecturePlayer::with_config(synth, sink.clone(), test_config());
        let mut rx = player.subscribe();

        player.start(lecture(None, &["A1", "A2", "A3"])).unwrap();
        wait_for(&mut rx, "first lecture slide", |s| s.board_text == "A1").await;

        // Make sure the first session is mid-playback before restarting
        timeout(Duration::from_secs(1), async {
            while sink.active.load(Ordering::SeqCst) == 0 {
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        })
        .await
        .expect("first playback never started");

        player.start(lecture(None, &["B1"])).unwrap();
        wait_for(&mut rx, "second lecture slide", |s| s.board_text == "B1").await;

        sink.simulate_ended().await;
        wait_for(&mut rx, "idle", |s| s.status == PlaybackStatus::Idle).await;

        assert!(!sink.overlapped.load(Ordering::SeqCst), "audio overlapped");
        assert_eq!(sink.plays.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_lecture_rejected() {
        let synth = MockSynth::ok();
        let sink = MockSink::new();
        let player = LecturePlayer::with_config(synth, sink, test_config());

        let empty = Lecture {
            title: Some("Empty".to_string()),
            slides: vec![],
            script: None,
        };
        assert!(matches!(player.start(empty), Err(PlayerError::EmptyLecture)));
        assert_eq!(player.status(), PlaybackStatus::Idle);
    }
}
