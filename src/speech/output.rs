//! Speech output channel — sequential text-to-speech with error recovery.
//!
//! [`OutputChannel`] wraps a platform [`Synthesizer`] and guarantees that
//! every `speak` call completes exactly once, whether the utterance
//! succeeded, failed, or the platform has no speech synthesis at all.
//! Downstream orchestration awaits the completion and must never stall on a
//! missing capability.
//!
//! Only one utterance plays at a time: a new `speak` cancels whatever is
//! still active instead of queuing behind it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

// ---------------------------------------------------------------------------
// SpeakError
// ---------------------------------------------------------------------------

/// Errors a platform synthesizer can report for one utterance.
#[derive(Debug, Error)]
pub enum SpeakError {
    /// The platform refused to play audio (autoplay policy, focus loss).
    /// Transient — usually clears within milliseconds of a user gesture.
    #[error("speech output not allowed by the platform")]
    NotAllowed,

    /// The utterance was cut off mid-play by the platform or another
    /// utterance. Transient — a retry after a longer pause tends to succeed.
    #[error("utterance was interrupted")]
    Interrupted,

    /// Any other synthesis failure. Not retried.
    #[error("synthesis failed: {0}")]
    Synthesis(String),
}

impl SpeakError {
    /// Retry delay for transient error classes; `None` means don't retry.
    ///
    /// The two tiers are deliberate: `NotAllowed` clears almost immediately,
    /// `Interrupted` needs the platform queue to settle first.
    fn retry_delay(&self) -> Option<Duration> {
        match self {
            SpeakError::NotAllowed => Some(Duration::from_millis(100)),
            SpeakError::Interrupted => Some(Duration::from_millis(500)),
            SpeakError::Synthesis(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Synthesizer trait
// ---------------------------------------------------------------------------

/// Platform text-to-speech capability.
///
/// `speak` resolves when the utterance has finished playing (or failed).
/// `cancel` aborts the active utterance, causing its pending `speak` future
/// to resolve promptly. Implementors must be `Send + Sync` so they can be
/// shared as `Arc<dyn Synthesizer>`.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Whether the platform offers speech synthesis at all.
    fn is_supported(&self) -> bool;

    /// Speak one utterance to completion.
    async fn speak(&self, text: &str) -> Result<(), SpeakError>;

    /// Abort the active utterance, if any.
    fn cancel(&self);
}

/// A synthesizer for platforms without speech output. Never errs, never
/// speaks.
pub struct UnsupportedSynthesizer;

#[async_trait]
impl Synthesizer for UnsupportedSynthesizer {
    fn is_supported(&self) -> bool {
        false
    }

    async fn speak(&self, _text: &str) -> Result<(), SpeakError> {
        Ok(())
    }

    fn cancel(&self) {}
}

// ---------------------------------------------------------------------------
// OutputChannel
// ---------------------------------------------------------------------------

/// Sequential speech output with cancel-previous and bounded retry.
///
/// Guarantees, in order of precedence:
///
/// 1. `speak` always completes — capability absence completes immediately
///    with no error surfaced to the caller.
/// 2. One utterance at a time — a `speak` issued while another utterance is
///    active cancels the active one first; nothing is queued.
/// 3. A transient error ([`SpeakError::NotAllowed`],
///    [`SpeakError::Interrupted`]) is retried exactly once with the
///    class-specific delay, then the call completes regardless.
#[derive(Clone)]
pub struct OutputChannel {
    synth: Arc<dyn Synthesizer>,
    speaking: Arc<AtomicBool>,
}

impl OutputChannel {
    pub fn new(synth: Arc<dyn Synthesizer>) -> Self {
        Self {
            synth,
            speaking: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether an utterance is currently active.
    pub fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }

    /// Speak `text` to completion. Never fails; see the type-level contract.
    pub async fn speak(&self, text: &str) {
        if !self.synth.is_supported() {
            log::debug!("output: synthesis unsupported, completing immediately");
            return;
        }

        if self.speaking.swap(true, Ordering::SeqCst) {
            log::debug!("output: cancelling active utterance before new speak");
            self.synth.cancel();
        }

        log::debug!("output: speaking ({} chars)", text.len());

        if let Err(e) = self.synth.speak(text).await {
            match e.retry_delay() {
                Some(delay) => {
                    log::warn!("output: utterance failed ({e}); retrying in {delay:?}");
                    tokio::time::sleep(delay).await;
                    if let Err(e) = self.synth.speak(text).await {
                        log::error!("output: retry failed ({e}); giving up on utterance");
                    }
                }
                None => {
                    log::error!("output: utterance failed ({e}); giving up");
                }
            }
        }

        self.speaking.store(false, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Scripted synthesizer: pops one result per `speak` call, records the
    /// spoken texts, counts `cancel` calls.
    struct ScriptedSynth {
        results: Mutex<Vec<Result<(), SpeakError>>>,
        spoken: Mutex<Vec<String>>,
        cancels: AtomicUsize,
    }

    impl ScriptedSynth {
        fn new(results: Vec<Result<(), SpeakError>>) -> Self {
            Self {
                // popped from the back; reverse so the script reads in order
                results: Mutex::new(results.into_iter().rev().collect()),
                spoken: Mutex::new(Vec::new()),
                cancels: AtomicUsize::new(0),
            }
        }

        fn speak_count(&self) -> usize {
            self.spoken.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Synthesizer for ScriptedSynth {
        fn is_supported(&self) -> bool {
            true
        }

        async fn speak(&self, text: &str) -> Result<(), SpeakError> {
            self.spoken.lock().unwrap().push(text.to_string());
            self.results.lock().unwrap().pop().unwrap_or(Ok(()))
        }

        fn cancel(&self) {
            self.cancels.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Synthesizer whose first `speak` blocks until `cancel` is called;
    /// later calls complete immediately.
    struct BlockingSynth {
        release: Notify,
        cancels: AtomicUsize,
        calls: AtomicUsize,
    }

    impl BlockingSynth {
        fn new() -> Self {
            Self {
                release: Notify::new(),
                cancels: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Synthesizer for BlockingSynth {
        fn is_supported(&self) -> bool {
            true
        }

        async fn speak(&self, _text: &str) -> Result<(), SpeakError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                self.release.notified().await;
            }
            Ok(())
        }

        fn cancel(&self) {
            self.cancels.fetch_add(1, Ordering::SeqCst);
            self.release.notify_one();
        }
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn unsupported_platform_completes_immediately() {
        let channel = OutputChannel::new(Arc::new(UnsupportedSynthesizer));
        channel.speak("olá").await;
        assert!(!channel.is_speaking());
    }

    #[tokio::test]
    async fn successful_utterance_speaks_once() {
        let synth = Arc::new(ScriptedSynth::new(vec![Ok(())]));
        let channel = OutputChannel::new(Arc::clone(&synth) as Arc<dyn Synthesizer>);

        channel.speak("era uma vez").await;

        assert_eq!(synth.speak_count(), 1);
        assert_eq!(synth.spoken.lock().unwrap()[0], "era uma vez");
        assert!(!channel.is_speaking());
    }

    #[tokio::test(start_paused = true)]
    async fn not_allowed_is_retried_once() {
        let synth = Arc::new(ScriptedSynth::new(vec![Err(SpeakError::NotAllowed), Ok(())]));
        let channel = OutputChannel::new(Arc::clone(&synth) as Arc<dyn Synthesizer>);

        channel.speak("olá").await;

        assert_eq!(synth.speak_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn interrupted_is_retried_once() {
        let synth = Arc::new(ScriptedSynth::new(vec![
            Err(SpeakError::Interrupted),
            Ok(()),
        ]));
        let channel = OutputChannel::new(Arc::clone(&synth) as Arc<dyn Synthesizer>);

        channel.speak("olá").await;

        assert_eq!(synth.speak_count(), 2);
    }

    /// Even when the retry fails too, the call must complete — never more
    /// than two attempts for one utterance.
    #[tokio::test(start_paused = true)]
    async fn retry_failure_still_completes() {
        let synth = Arc::new(ScriptedSynth::new(vec![
            Err(SpeakError::Interrupted),
            Err(SpeakError::Interrupted),
        ]));
        let channel = OutputChannel::new(Arc::clone(&synth) as Arc<dyn Synthesizer>);

        channel.speak("olá").await;

        assert_eq!(synth.speak_count(), 2);
        assert!(!channel.is_speaking());
    }

    #[tokio::test]
    async fn non_transient_error_is_not_retried() {
        let synth = Arc::new(ScriptedSynth::new(vec![Err(SpeakError::Synthesis(
            "voice missing".into(),
        ))]));
        let channel = OutputChannel::new(Arc::clone(&synth) as Arc<dyn Synthesizer>);

        channel.speak("olá").await;

        assert_eq!(synth.speak_count(), 1);
    }

    /// A `speak` issued while another utterance is active must cancel the
    /// active one rather than queue.
    #[tokio::test]
    async fn second_speak_cancels_active_utterance() {
        let synth = Arc::new(BlockingSynth::new());
        let channel = OutputChannel::new(Arc::clone(&synth) as Arc<dyn Synthesizer>);

        let first = {
            let channel = channel.clone();
            tokio::spawn(async move { channel.speak("primeira").await })
        };

        // Let the first speak reach its await point.
        tokio::task::yield_now().await;
        assert!(channel.is_speaking());

        channel.speak("segunda").await;

        first.await.unwrap();
        assert_eq!(synth.cancels.load(Ordering::SeqCst), 1);
    }
}
