//! Whiteboard display state with an optional typing effect.
//!
//! Lecture playback sets slide text at once; `type_out` reveals a single
//! block of text progressively, used for standalone display outside a timed
//! lecture session.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// The visual surface slide content is displayed on.
pub struct Whiteboard {
    tx: Arc<watch::Sender<String>>,
    epoch: Arc<AtomicU64>,
}

impl Whiteboard {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(String::new());
        Self {
            tx: Arc::new(tx),
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Observe the displayed text.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }

    pub fn text(&self) -> String {
        self.tx.borrow().clone()
    }

    /// Replace the whole display at once, cancelling any typing effect.
    pub fn set_text(&self, text: impl Into<String>) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        let _ = self.tx.send(text.into());
    }

    pub fn clear(&self) {
        self.set_text("");
    }

    /// Reveal `text` progressively over `duration`, invoking `on_done` once
    /// the full text is displayed. A later `set_text`, `clear` or `type_out`
    /// cancels the effect and `on_done` is not invoked.
    pub fn type_out(
        &self,
        text: impl Into<String>,
        duration: Duration,
        on_done: impl FnOnce() + Send + 'static,
    ) -> JoinHandle<()> {
        let text = text.into();
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let guard = self.epoch.clone();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let chars: Vec<char> = text.chars().collect();
            if guard.load(Ordering::SeqCst) != epoch {
                return;
            }
            let _ = tx.send(String::new());
            if chars.is_empty() {
                on_done();
                return;
            }

            let step = duration / chars.len() as u32;
            for shown in 1..=chars.len() {
                tokio::time::sleep(step).await;
                if guard.load(Ordering::SeqCst) != epoch {
                    return;
                }
                let _ = tx.send(chars[..shown].iter().collect());
            }
            on_done();
        })
    }
}

impl Default for Whiteboard {
    fn default() -> Self {
        Self::new()
    }
}
