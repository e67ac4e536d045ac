//! Speech capture session — one bounded voice-capture attempt.
//!
//! [`CaptureSession`] drives a platform [`Recognizer`] through the states
//! `Idle → Recording → Ended` and reports progress as [`CaptureEvent`]s over
//! an mpsc channel.
//!
//! Two timers bound every attempt:
//!
//! * **hard timeout** (default 20 s) — force-stops the attempt regardless of
//!   recognizer activity, bounding worst-case latency;
//! * **grace timeout** (default 2 s) — armed each time a *final* transcript
//!   fragment arrives, replacing the hard timeout, so the attempt ends
//!   shortly after the speaker stops instead of waiting out the full window.
//!   Long enough not to cut off a child's hesitant speech, short enough to
//!   keep the interaction responsive.
//!
//! Error policy: any recognizer error ends the attempt and reports the code.
//! The session never retries internally — whether to run another attempt is
//! the orchestrator's decision.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::config::CaptureConfig;

// ---------------------------------------------------------------------------
// CaptureError
// ---------------------------------------------------------------------------

/// Errors surfaced when starting a capture attempt.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The platform offers no speech recognition.
    #[error("speech capture is not supported on this platform")]
    Unsupported,

    /// The recognizer refused to start.
    #[error("recognizer failed to start: {0}")]
    Start(String),
}

// ---------------------------------------------------------------------------
// Recognizer trait
// ---------------------------------------------------------------------------

/// Events a platform recognizer delivers during one attempt.
#[derive(Debug, Clone)]
pub enum RecognizerEvent {
    /// The platform actually began listening.
    Started,
    /// A transcript update. `final_text` carries newly finalized speech
    /// (may be empty when only interim text changed).
    Transcript {
        final_text: String,
        interim_text: String,
    },
    /// A platform-level failure, identified by the platform's code string
    /// (e.g. `"not-allowed"`, `"no-speech"`, `"network"`).
    Error(String),
    /// The platform stopped listening on its own.
    Ended,
}

/// Platform speech-to-text capability.
///
/// `start` wires the given sender into the platform's event callbacks and
/// begins listening; `stop` asks the platform to finish the active attempt.
/// Implementors must be `Send + Sync` so they can be shared as
/// `Arc<dyn Recognizer>`.
pub trait Recognizer: Send + Sync {
    /// Whether the platform offers speech recognition at all.
    fn is_supported(&self) -> bool;

    /// Begin one recognition attempt, delivering events through `events`.
    fn start(&self, events: mpsc::Sender<RecognizerEvent>) -> Result<(), CaptureError>;

    /// Ask the platform to end the active attempt, if any.
    fn stop(&self);
}

// ---------------------------------------------------------------------------
// CaptureEvent
// ---------------------------------------------------------------------------

/// Events the capture session reports to the orchestrator.
///
/// Exactly one terminal event (`Ended` or `Failed`) is emitted per attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    /// The attempt began listening. Emitted at most once per attempt.
    Started,
    /// Transcript progress, for live display.
    Transcript {
        final_text: String,
        interim_text: String,
    },
    /// The attempt ended; `final_text` is the accumulated finalized speech
    /// (empty when nothing usable was heard).
    Ended { final_text: String },
    /// The attempt failed with a platform error code.
    Failed { code: String },
}

// ---------------------------------------------------------------------------
// CaptureSession
// ---------------------------------------------------------------------------

/// Manages one bounded voice-capture attempt at a time.
///
/// `start_recording` while an attempt is active is a logged no-op — this is
/// the concurrency guard against double-start races from duplicate events.
#[derive(Clone)]
pub struct CaptureSession {
    recognizer: Arc<dyn Recognizer>,
    config: CaptureConfig,
    recording: Arc<AtomicBool>,
}

impl CaptureSession {
    pub fn new(recognizer: Arc<dyn Recognizer>, config: CaptureConfig) -> Self {
        Self {
            recognizer,
            config,
            recording: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether an attempt is currently active.
    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::SeqCst)
    }

    /// Begin a capture attempt, reporting progress through `events`.
    ///
    /// No-op (logged) when an attempt is already active; the active attempt
    /// keeps its original event channel and no duplicate
    /// [`CaptureEvent::Started`] is emitted.
    pub fn start_recording(&self, events: mpsc::Sender<CaptureEvent>) {
        if self.recording.swap(true, Ordering::SeqCst) {
            log::warn!("capture: already recording, ignoring start request");
            return;
        }

        let recognizer = Arc::clone(&self.recognizer);
        let config = self.config.clone();
        let recording = Arc::clone(&self.recording);

        tokio::spawn(async move {
            drive_attempt(recognizer, config, events).await;
            recording.store(false, Ordering::SeqCst);
        });
    }

    /// Ask the active attempt to finish early. No-op when idle.
    pub fn stop_recording(&self) {
        if self.recording.load(Ordering::SeqCst) {
            log::debug!("capture: stop requested");
            self.recognizer.stop();
        } else {
            log::debug!("capture: no active recording to stop");
        }
    }
}

/// Drive one attempt to its terminal event.
async fn drive_attempt(
    recognizer: Arc<dyn Recognizer>,
    config: CaptureConfig,
    out: mpsc::Sender<CaptureEvent>,
) {
    if !recognizer.is_supported() {
        log::info!("capture: recognition unsupported on this platform");
        let _ = out.send(CaptureEvent::Failed {
            code: "unsupported".into(),
        })
        .await;
        return;
    }

    let (tx, mut rx) = mpsc::channel(32);
    if let Err(e) = recognizer.start(tx) {
        log::warn!("capture: recognizer failed to start: {e}");
        let _ = out.send(CaptureEvent::Failed {
            code: e.to_string(),
        })
        .await;
        return;
    }

    let hard = Duration::from_secs(config.hard_timeout_secs);
    let grace = Duration::from_secs(config.grace_timeout_secs);

    let mut captured = String::new();
    let mut deadline = Instant::now() + hard;
    let mut started_emitted = false;

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(RecognizerEvent::Started) => {
                    if started_emitted {
                        log::debug!("capture: duplicate start event suppressed");
                    } else {
                        started_emitted = true;
                        let _ = out.send(CaptureEvent::Started).await;
                    }
                }
                Some(RecognizerEvent::Transcript { final_text, interim_text }) => {
                    let fragment = final_text.trim();
                    if !fragment.is_empty() {
                        if !captured.is_empty() {
                            captured.push(' ');
                        }
                        captured.push_str(fragment);
                        // Final speech arrived: swap the hard timeout for the
                        // short grace window.
                        deadline = Instant::now() + grace;
                        log::debug!(
                            "capture: final fragment received, ending in {}s unless more speech arrives",
                            config.grace_timeout_secs
                        );
                    }
                    let _ = out.send(CaptureEvent::Transcript {
                        final_text: final_text.clone(),
                        interim_text: interim_text.clone(),
                    })
                    .await;
                }
                Some(RecognizerEvent::Error(code)) => {
                    log::warn!("capture: recognizer error: {code}");
                    recognizer.stop();
                    let _ = out.send(CaptureEvent::Failed { code }).await;
                    return;
                }
                Some(RecognizerEvent::Ended) | None => {
                    log::debug!("capture: recognizer ended");
                    let _ = out.send(CaptureEvent::Ended {
                        final_text: captured,
                    })
                    .await;
                    return;
                }
            },
            _ = tokio::time::sleep_until(deadline) => {
                log::info!("capture: timeout reached, stopping");
                recognizer.stop();
                let _ = out.send(CaptureEvent::Ended {
                    final_text: captured,
                })
                .await;
                return;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Recognizer that replays one scripted event list per `start` call.
    struct ScriptedRecognizer {
        scripts: Mutex<VecDeque<Vec<RecognizerEvent>>>,
        starts: AtomicUsize,
        stops: AtomicUsize,
    }

    impl ScriptedRecognizer {
        fn new(scripts: Vec<Vec<RecognizerEvent>>) -> Self {
            Self {
                scripts: Mutex::new(scripts.into()),
                starts: AtomicUsize::new(0),
                stops: AtomicUsize::new(0),
            }
        }
    }

    impl Recognizer for ScriptedRecognizer {
        fn is_supported(&self) -> bool {
            true
        }

        fn start(&self, events: mpsc::Sender<RecognizerEvent>) -> Result<(), CaptureError> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            let script = self.scripts.lock().unwrap().pop_front().unwrap_or_default();
            tokio::spawn(async move {
                for event in script {
                    let _ = events.send(event).await;
                }
                // Keep the sender alive forever so the session's timers — not
                // channel closure — decide when the attempt ends.
                std::future::pending::<()>().await;
            });
            Ok(())
        }

        fn stop(&self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct NoRecognition;

    impl Recognizer for NoRecognition {
        fn is_supported(&self) -> bool {
            false
        }

        fn start(&self, _events: mpsc::Sender<RecognizerEvent>) -> Result<(), CaptureError> {
            Err(CaptureError::Unsupported)
        }

        fn stop(&self) {}
    }

    fn final_fragment(text: &str) -> RecognizerEvent {
        RecognizerEvent::Transcript {
            final_text: text.into(),
            interim_text: String::new(),
        }
    }

    async fn collect_until_terminal(rx: &mut mpsc::Receiver<CaptureEvent>) -> Vec<CaptureEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            let terminal = matches!(
                event,
                CaptureEvent::Ended { .. } | CaptureEvent::Failed { .. }
            );
            events.push(event);
            if terminal {
                break;
            }
        }
        events
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    /// Starting a second recording while one is active must be a no-op: one
    /// recognizer start, `is_recording` stays true, no duplicate Started.
    #[tokio::test(start_paused = true)]
    async fn double_start_is_a_noop() {
        let recognizer = Arc::new(ScriptedRecognizer::new(vec![vec![
            RecognizerEvent::Started,
        ]]));
        let session = CaptureSession::new(
            Arc::clone(&recognizer) as Arc<dyn Recognizer>,
            CaptureConfig::default(),
        );

        let (tx1, mut rx1) = mpsc::channel(16);
        let (tx2, mut rx2) = mpsc::channel(16);

        session.start_recording(tx1);
        tokio::task::yield_now().await;
        session.start_recording(tx2);
        tokio::task::yield_now().await;

        assert!(session.is_recording());
        assert_eq!(recognizer.starts.load(Ordering::SeqCst), 1);

        // First channel got exactly one Started; second channel got nothing.
        assert_eq!(rx1.recv().await, Some(CaptureEvent::Started));
        assert!(rx2.try_recv().is_err());
    }

    /// A grace timeout armed by a final fragment must end the attempt within
    /// the grace window, well before the hard timeout.
    #[tokio::test(start_paused = true)]
    async fn grace_timeout_ends_shortly_after_final_fragment() {
        let recognizer = Arc::new(ScriptedRecognizer::new(vec![vec![
            RecognizerEvent::Started,
            final_fragment("um dragão na floresta"),
        ]]));
        let session = CaptureSession::new(
            Arc::clone(&recognizer) as Arc<dyn Recognizer>,
            CaptureConfig::default(),
        );

        let start = Instant::now();
        let (tx, mut rx) = mpsc::channel(16);
        session.start_recording(tx);

        let events = collect_until_terminal(&mut rx).await;
        let elapsed = start.elapsed();

        assert_eq!(
            events.last(),
            Some(&CaptureEvent::Ended {
                final_text: "um dragão na floresta".into()
            })
        );
        // Ended within the grace window, not the 20 s hard window.
        assert!(elapsed <= Duration::from_secs(3), "elapsed: {elapsed:?}");
        assert_eq!(recognizer.stops.load(Ordering::SeqCst), 1);
    }

    /// With interim-only speech the hard timeout must still bound the attempt.
    #[tokio::test(start_paused = true)]
    async fn hard_timeout_bounds_interim_only_speech() {
        let recognizer = Arc::new(ScriptedRecognizer::new(vec![vec![
            RecognizerEvent::Started,
            RecognizerEvent::Transcript {
                final_text: String::new(),
                interim_text: "um drag".into(),
            },
        ]]));
        let session = CaptureSession::new(
            Arc::clone(&recognizer) as Arc<dyn Recognizer>,
            CaptureConfig::default(),
        );

        let start = Instant::now();
        let (tx, mut rx) = mpsc::channel(16);
        session.start_recording(tx);

        let events = collect_until_terminal(&mut rx).await;

        assert_eq!(
            events.last(),
            Some(&CaptureEvent::Ended {
                final_text: String::new()
            })
        );
        assert!(start.elapsed() >= Duration::from_secs(20));
    }

    /// Multiple final fragments accumulate into one transcript.
    #[tokio::test(start_paused = true)]
    async fn final_fragments_accumulate() {
        let recognizer = Arc::new(ScriptedRecognizer::new(vec![vec![
            RecognizerEvent::Started,
            final_fragment("um dragão"),
            final_fragment("na floresta"),
        ]]));
        let session = CaptureSession::new(
            Arc::clone(&recognizer) as Arc<dyn Recognizer>,
            CaptureConfig::default(),
        );

        let (tx, mut rx) = mpsc::channel(16);
        session.start_recording(tx);

        let events = collect_until_terminal(&mut rx).await;
        assert_eq!(
            events.last(),
            Some(&CaptureEvent::Ended {
                final_text: "um dragão na floresta".into()
            })
        );
    }

    /// A recognizer error ends the attempt immediately with the error code;
    /// the session does not retry on its own.
    #[tokio::test(start_paused = true)]
    async fn recognizer_error_reports_failed() {
        let recognizer = Arc::new(ScriptedRecognizer::new(vec![vec![
            RecognizerEvent::Started,
            RecognizerEvent::Error("not-allowed".into()),
        ]]));
        let session = CaptureSession::new(
            Arc::clone(&recognizer) as Arc<dyn Recognizer>,
            CaptureConfig::default(),
        );

        let (tx, mut rx) = mpsc::channel(16);
        session.start_recording(tx);

        let events = collect_until_terminal(&mut rx).await;
        assert_eq!(
            events.last(),
            Some(&CaptureEvent::Failed {
                code: "not-allowed".into()
            })
        );
        assert_eq!(recognizer.starts.load(Ordering::SeqCst), 1);

        // The attempt is over; a new start must be accepted again.
        tokio::task::yield_now().await;
        assert!(!session.is_recording());
    }

    /// An unsupported platform fails the attempt without touching the
    /// recognizer.
    #[tokio::test]
    async fn unsupported_platform_fails_fast() {
        let session = CaptureSession::new(Arc::new(NoRecognition), CaptureConfig::default());

        let (tx, mut rx) = mpsc::channel(16);
        session.start_recording(tx);

        let events = collect_until_terminal(&mut rx).await;
        assert_eq!(
            events.last(),
            Some(&CaptureEvent::Failed {
                code: "unsupported".into()
            })
        );
    }

    /// `stop_recording` with no active attempt must not panic or call the
    /// recognizer.
    #[tokio::test]
    async fn stop_without_recording_is_a_noop() {
        let recognizer = Arc::new(ScriptedRecognizer::new(vec![]));
        let session = CaptureSession::new(
            Arc::clone(&recognizer) as Arc<dyn Recognizer>,
            CaptureConfig::default(),
        );

        session.stop_recording();
        assert_eq!(recognizer.stops.load(Ordering::SeqCst), 0);
    }
}
