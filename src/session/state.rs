//! Interaction states and the session record.
//!
//! [`SessionState`] drives the orchestrator's state machine; the
//! presentation layer receives it with every render call.
//!
//! ```text
//! Idle ──startup, no permission──▶ AwaitingPermission
//!                                    ──grant──▶ AwaitingInteraction
//!      ──startup, persisted grant──────────────▶ AwaitingInteraction
//! AwaitingInteraction ──gesture──▶ Prompting ──speech done──▶ Recording
//! Recording ──capture ok──▶ Confirming ──speech done──▶ AwaitingUserAction
//!           ──capture empty/error──▶ Resetting ──delay──▶ Prompting
//! AwaitingUserAction ──explicit action──▶ Generating ──story──▶ Presenting
//! Presenting ──new story──▶ Resetting ──▶ AwaitingInteraction
//! any state ──reset / unrecoverable error──▶ Resetting
//! ```
//!
//! Guards are named predicates over this enum — not ad hoc booleans — so
//! they cannot desynchronize from the state they describe.

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// States of the interaction session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Process start, before permission is known.
    Idle,

    /// Waiting for the user to grant microphone permission.
    AwaitingPermission,

    /// Waiting for the first user gesture. Audio output is gated on prior
    /// user interaction by platform autoplay policy.
    AwaitingInteraction,

    /// The spoken prompt is playing.
    Prompting,

    /// A voice-capture attempt is active.
    Recording,

    /// The confirmation utterance for the captured topic is playing.
    Confirming,

    /// The action gate is open: waiting for an explicit user decision.
    /// The automatic loop never restarts while here.
    AwaitingUserAction,

    /// The provider chain is generating a story.
    Generating,

    /// A valid story is on screen.
    Presenting,

    /// Transient state while the session is torn back down.
    Resetting,
}

impl SessionState {
    /// A short human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Idle => "Idle",
            SessionState::AwaitingPermission => "Awaiting permission",
            SessionState::AwaitingInteraction => "Awaiting interaction",
            SessionState::Prompting => "Prompting",
            SessionState::Recording => "Recording",
            SessionState::Confirming => "Confirming",
            SessionState::AwaitingUserAction => "Awaiting action",
            SessionState::Generating => "Generating",
            SessionState::Presenting => "Presenting",
            SessionState::Resetting => "Resetting",
        }
    }

    /// Whether an automatic turn stage is mid-flight. Turn-start requests in
    /// these states are ignored, never queued.
    pub fn turn_in_progress(&self) -> bool {
        matches!(
            self,
            SessionState::Prompting
                | SessionState::Recording
                | SessionState::Confirming
                | SessionState::Generating
                | SessionState::Resetting
        )
    }

    /// Whether the action gate is open. `Prompting`/`Recording` may not be
    /// re-entered while it is — the user is mid-decision.
    pub fn gate_open(&self) -> bool {
        matches!(self, SessionState::AwaitingUserAction)
    }

    /// Whether a user gesture may start a new turn from this state.
    pub fn accepts_turn_start(&self) -> bool {
        matches!(self, SessionState::AwaitingInteraction)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Idle
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The single session record. Mutated only by the orchestrator task —
/// single-writer discipline; nothing else holds a reference to it.
#[derive(Debug, Default)]
pub struct Session {
    /// Current interaction state.
    pub state: SessionState,

    /// Most recent finalized transcript. Cleared on reset.
    pub captured_text: String,

    /// Mirror of the persisted permission grant.
    pub permission_granted: bool,

    /// Set once per process lifetime on the first user gesture.
    pub user_has_interacted: bool,

    /// Consecutive empty/failed captures in the current turn.
    pub capture_attempts: u32,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all per-turn data in one step, before any further transition is
    /// considered. `permission_granted` and `user_has_interacted` survive —
    /// they are persistence- and process-scoped, not turn-scoped.
    pub fn reset_transient(&mut self) {
        self.captured_text.clear();
        self.capture_attempts = 0;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
