//! Audio sink: ownership of the single narration playback resource.

use anyhow::Result;
use async_trait::async_trait;

use crate::narration::NarrationAudio;

/// How a playback attempt finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// The audio played to its natural end
    Completed,
    /// Playback was stopped before the end
    Stopped,
}

/// Owns narration playback for the active session.
///
/// Implementations must keep at most one sound playing at a time: `play`
/// stops and rewinds any previous sound before starting the new one.
#[async_trait]
pub trait AudioSink: Send + Sync {
    /// Play a narration payload and resolve when it ends or is stopped.
    async fn play(&self, audio: NarrationAudio) -> Result<PlayOutcome>;

    /// Immediately stop the current sound and reset its position. No-op
    /// when nothing is playing.
    fn stop(&self);
}

#[cfg(feature = "playback")]
mod rodio_sink {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    /// Plays narration through the default audio output device.
    pub struct RodioSink {
        inner: Arc<Inner>,
    }

    struct Inner {
        current: Mutex<Option<Arc<rodio::Sink>>>,
        stopped: AtomicBool,
    }

    impl RodioSink {
        pub fn new() -> Self {
            Self {
                inner: Arc::new(Inner {
                    current: Mutex::new(None),
                    stopped: AtomicBool::new(false),
                }),
            }
        }
    }

    impl Default for RodioSink {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Inner {
        fn set_current(&self, sink: Option<Arc<rodio::Sink>>) {
            let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
            *current = sink;
        }
    }

    #[async_trait]
    impl AudioSink for RodioSink {
        async fn play(&self, audio: NarrationAudio) -> Result<PlayOutcome> {
            self.stop();
            self.inner.stopped.store(false, Ordering::SeqCst);

            let inner = self.inner.clone();
            // The output stream is not Send; playback runs on a blocking
            // thread and the shared Sink handle services stop().
            let outcome = tokio::task::spawn_blocking(move || -> Result<PlayOutcome> {
                let stream = rodio::OutputStreamBuilder::open_default_stream()?;
                let sink = Arc::new(rodio::Sink::connect_new(stream.mixer()));
                let source = rodio::Decoder::new(std::io::Cursor::new(audio.data))?;
                sink.append(source);
                inner.set_current(Some(sink.clone()));

                sink.sleep_until_end();

                inner.set_current(None);
                drop(stream);
                Ok(if inner.stopped.load(Ordering::SeqCst) {
                    PlayOutcome::Stopped
                } else {
                    PlayOutcome::Completed
                })
            })
            .await??;

            Ok(outcome)
        }

        fn stop(&self) {
            self.inner.stopped.store(true, Ordering::SeqCst);
            let sink = {
                let mut current = self.inner.current.lock().unwrap_or_else(|e| e.into_inner());
                current.take()
            };
            if let Some(sink) = sink {
                sink.stop();
            }
        }
    }
}

#[cfg(feature = "playback")]
pub use rodio_sink::RodioSink;
