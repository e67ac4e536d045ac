//! Presentation adapter seam.
//!
//! The orchestrator never touches a screen. It pushes `(state, payload)`
//! pairs into a [`Presenter`] and receives [`UserAction`]s back over an mpsc
//! channel. What "render" means — DOM, terminal, test recorder — is entirely
//! the adapter's business.

use thiserror::Error;

use crate::generation::Story;
use crate::session::state::SessionState;

// ---------------------------------------------------------------------------
// PresentationFault
// ---------------------------------------------------------------------------

/// A failure inside the presentation adapter. Faults while presenting a
/// valid story indicate a structural integration problem, not a transient
/// condition — the turn is abandoned, never retried.
#[derive(Debug, Error)]
pub enum PresentationFault {
    #[error("presentation failed: {0}")]
    Render(String),
}

// ---------------------------------------------------------------------------
// RenderPayload
// ---------------------------------------------------------------------------

/// Messages shown while a story is being generated.
pub const LOADING_MESSAGES: &[&str] = &[
    "Pensando em uma história mágica...",
    "Criando personagens especiais...",
    "Finalizando sua história...",
];

/// Data accompanying a state render.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderPayload {
    /// Nothing beyond the state itself.
    Empty,
    /// Live transcript while recording.
    Transcript {
        final_text: String,
        interim_text: String,
    },
    /// The captured topic, shown while confirming and at the action gate.
    Topic { text: String },
    /// Rotating messages for the generation wait.
    Loading { messages: Vec<String> },
    /// The finished story.
    Story { story: Story },
}

impl RenderPayload {
    /// The standard loading payload.
    pub fn loading() -> Self {
        RenderPayload::Loading {
            messages: LOADING_MESSAGES.iter().map(|m| m.to_string()).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Presenter trait
// ---------------------------------------------------------------------------

/// Consumed presentation interface.
///
/// Implementors must be `Send + Sync`; `render` is called from the
/// orchestrator task and must return quickly.
pub trait Presenter: Send + Sync {
    fn render(&self, state: SessionState, payload: &RenderPayload)
        -> Result<(), PresentationFault>;
}

// ---------------------------------------------------------------------------
// UserAction
// ---------------------------------------------------------------------------

/// Explicit user inputs, delivered to the orchestrator over mpsc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    /// Any click/touch/key — unlocks audio output and starts the first turn.
    Gesture,
    /// The user granted microphone permission.
    GrantPermission,
    /// Create the story from the captured topic (closes the action gate).
    Generate,
    /// Run another capture attempt instead of generating.
    RetryCapture,
    /// Read the presented story aloud.
    ReadStory,
    /// Discard the presented story and start over.
    NewStory,
    /// Tear the session down from any state.
    Reset,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_payload_carries_all_messages() {
        match RenderPayload::loading() {
            RenderPayload::Loading { messages } => {
                assert_eq!(messages.len(), LOADING_MESSAGES.len());
                assert!(messages[0].contains("história mágica"));
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }
}
