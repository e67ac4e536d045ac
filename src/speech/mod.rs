//! Speech platform capability seam.
//!
//! The core never talks to audio devices directly. It consumes two narrow
//! traits that a frontend implements on top of whatever the platform offers:
//!
//! * [`Synthesizer`] — text-to-speech: speak one utterance, cancel, report
//!   support.
//! * [`Recognizer`] — speech-to-text: start/stop one recognition attempt,
//!   deliver transcript/error/end events.
//!
//! Both may report "unsupported" at query time; the core treats that as a
//! valid non-error answer and degrades rather than blocking.
//!
//! On top of those sit the two managed components:
//!
//! * [`OutputChannel`] — sequential speech output with cancel-previous and
//!   one bounded retry for transient errors.
//! * [`CaptureSession`] — one bounded voice-capture attempt with hard and
//!   grace timeouts and a double-start guard.

pub mod capture;
pub mod output;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use capture::{CaptureError, CaptureEvent, CaptureSession, Recognizer, RecognizerEvent};
pub use output::{OutputChannel, SpeakError, Synthesizer, UnsupportedSynthesizer};
