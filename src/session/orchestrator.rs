//! Session orchestrator — drives the full prompt → capture → confirm →
//! generate → present loop.
//!
//! [`SessionOrchestrator`] owns the [`Session`] record outright and is the
//! only writer. All apparent concurrency — capture events, timers, user
//! actions — arrives over channels and is handled between await points of
//! this one task, so no transition ever races another.
//!
//! # Turn flow
//!
//! ```text
//! UserAction::Gesture (from AwaitingInteraction)
//!   └─▶ Prompting   — speak the topic prompt, await completion
//!   └─▶ Recording   — one bounded capture attempt
//!         ├─ topic captured ─▶ Confirming → AwaitingUserAction (gate opens)
//!         ├─ empty / failed ─▶ apology → Resetting → delay → Prompting
//!         │                    (bounded by max_capture_attempts, then the
//!         │                     gate opens for an explicit retry instead)
//!         └─ permission lost ─▶ AwaitingPermission
//!
//! UserAction::Generate (gate open)
//!   └─▶ Generating  — chain.generate never fails
//!   └─▶ Presenting  — local stories are held back briefly first
//! ```
//!
//! Duplicate or out-of-order actions are ignored by the state guards —
//! a stale `Gesture` in any state but `AwaitingInteraction` does nothing,
//! so progression through a session happens exactly once.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::generation::{GenerationRequest, ProviderChain, Story};
use crate::permission::PermissionStore;
use crate::session::presenter::{Presenter, RenderPayload, UserAction};
use crate::session::state::{Session, SessionState};
use crate::speech::{CaptureEvent, CaptureSession, OutputChannel};

// ---------------------------------------------------------------------------
// Spoken lines
// ---------------------------------------------------------------------------

const PROMPT_LINE: &str = "Olá! Sobre o que você quer a sua história? Pode falar!";
const RETRY_APOLOGY_LINE: &str = "Desculpe, eu não consegui te ouvir. Vamos tentar de novo!";
const GIVE_UP_LINE: &str =
    "Desculpe, ainda não consegui te ouvir. Aperte o botão quando quiser tentar de novo!";
const RESET_APOLOGY_LINE: &str = "Desculpe, algo deu errado. Vamos começar de novo!";

fn confirmation_line(topic: &str) -> String {
    format!("Que legal! Uma história sobre {topic}. Aperte o botão para criar a sua história!")
}

// ---------------------------------------------------------------------------
// Capture outcome
// ---------------------------------------------------------------------------

/// What one capture attempt amounted to, from the orchestrator's view.
enum TurnCapture {
    /// Usable topic text.
    Topic(String),
    /// Nothing usable — silence, timeout, or a non-permission error.
    Silence,
    /// The platform revoked microphone access.
    PermissionLost(String),
}

fn is_permission_code(code: &str) -> bool {
    let code = code.to_ascii_lowercase();
    code.contains("not-allowed") || code.contains("permission")
}

// ---------------------------------------------------------------------------
// SessionOrchestrator
// ---------------------------------------------------------------------------

/// The top-level orchestrator. Create with [`SessionOrchestrator::new`],
/// then call [`run`](Self::run) inside a tokio task; it returns when the
/// action channel closes.
pub struct SessionOrchestrator {
    session: Session,
    output: OutputChannel,
    capture: CaptureSession,
    chain: ProviderChain,
    presenter: Arc<dyn Presenter>,
    permissions: PermissionStore,
    max_capture_attempts: u32,
    retry_delay: Duration,
    local_reveal_delay: Duration,
    story: Option<Story>,
}

impl SessionOrchestrator {
    pub fn new(
        output: OutputChannel,
        capture: CaptureSession,
        chain: ProviderChain,
        presenter: Arc<dyn Presenter>,
        permissions: PermissionStore,
        config: &AppConfig,
    ) -> Self {
        Self {
            session: Session::new(),
            output,
            capture,
            chain,
            presenter,
            permissions,
            max_capture_attempts: config.session.max_capture_attempts,
            retry_delay: Duration::from_millis(config.session.retry_delay_ms),
            local_reveal_delay: Duration::from_millis(config.generation.local_reveal_delay_ms),
            story: None,
        }
    }

    // -----------------------------------------------------------------------
    // Main loop
    // -----------------------------------------------------------------------

    /// Run the orchestrator until `actions` is closed.
    pub async fn run(mut self, mut actions: mpsc::Receiver<UserAction>) {
        self.start_up();

        while let Some(action) = actions.recv().await {
            self.handle_action(action).await;
        }

        log::info!("session: action channel closed, orchestrator shutting down");
    }

    /// Read the persisted permission and enter the first real state.
    fn start_up(&mut self) {
        self.session.permission_granted = self.permissions.load();
        let state = if self.session.permission_granted {
            log::info!("session: permission persisted from a previous run");
            SessionState::AwaitingInteraction
        } else {
            SessionState::AwaitingPermission
        };
        self.transition(state, RenderPayload::Empty);
    }

    // -----------------------------------------------------------------------
    // Action handling
    // -----------------------------------------------------------------------

    async fn handle_action(&mut self, action: UserAction) {
        log::debug!(
            "session: action {:?} in state {:?}",
            action,
            self.session.state
        );

        match action {
            UserAction::GrantPermission => {
                if self.session.state != SessionState::AwaitingPermission {
                    self.ignore(action);
                    return;
                }
                if let Err(e) = self.permissions.grant() {
                    log::warn!("session: could not persist permission grant: {e}");
                }
                self.session.permission_granted = true;
                self.transition(SessionState::AwaitingInteraction, RenderPayload::Empty);
            }

            UserAction::Gesture => {
                // First gesture unlocks audio output regardless of state.
                self.session.user_has_interacted = true;
                if self.session.state.accepts_turn_start() {
                    self.run_turn().await;
                } else {
                    self.ignore(action);
                }
            }

            UserAction::RetryCapture => {
                if self.session.state.gate_open() {
                    self.session.reset_transient();
                    self.run_turn().await;
                } else {
                    self.ignore(action);
                }
            }

            UserAction::Generate => {
                if self.session.state.gate_open() {
                    self.generate_and_present().await;
                } else {
                    self.ignore(action);
                }
            }

            UserAction::ReadStory => {
                if self.session.state == SessionState::Presenting {
                    if let Some(story) = &self.story {
                        let text = story.full_text();
                        self.output.speak(&text).await;
                    }
                } else {
                    self.ignore(action);
                }
            }

            UserAction::NewStory => {
                if self.session.state == SessionState::Presenting {
                    self.reset();
                } else {
                    self.ignore(action);
                }
            }

            UserAction::Reset => {
                self.reset();
            }
        }
    }

    fn ignore(&self, action: UserAction) {
        log::debug!(
            "session: {:?} ignored in state {:?}",
            action,
            self.session.state
        );
    }

    // -----------------------------------------------------------------------
    // Turn: prompt → capture → confirm
    // -----------------------------------------------------------------------

    /// Run the prompt/capture loop until a topic is confirmed, the retry
    /// budget is spent, or permission is lost.
    async fn run_turn(&mut self) {
        // Callers guard by state (gesture only from AwaitingInteraction,
        // retry only from the open gate); this catches mid-flight re-entry.
        if self.session.state.turn_in_progress() {
            log::debug!("session: turn start suppressed in {:?}", self.session.state);
            return;
        }

        self.session.capture_attempts = 0;

        loop {
            self.transition(SessionState::Prompting, RenderPayload::Empty);
            self.output.speak(PROMPT_LINE).await;

            self.transition(
                SessionState::Recording,
                RenderPayload::Transcript {
                    final_text: String::new(),
                    interim_text: String::new(),
                },
            );

            match self.capture_once().await {
                TurnCapture::Topic(text) => {
                    log::info!("session: captured topic: {text:?}");
                    self.session.captured_text = text.clone();

                    self.transition(
                        SessionState::Confirming,
                        RenderPayload::Topic { text: text.clone() },
                    );
                    self.output.speak(&confirmation_line(&text)).await;

                    // Gate opens: nothing restarts automatically from here.
                    self.transition(
                        SessionState::AwaitingUserAction,
                        RenderPayload::Topic { text },
                    );
                    return;
                }

                TurnCapture::Silence => {
                    self.session.capture_attempts += 1;
                    log::info!(
                        "session: empty capture ({}/{})",
                        self.session.capture_attempts,
                        self.max_capture_attempts
                    );

                    if self.session.capture_attempts >= self.max_capture_attempts {
                        // Degrade to the manual path instead of looping forever.
                        self.output.speak(GIVE_UP_LINE).await;
                        self.transition(SessionState::AwaitingUserAction, RenderPayload::Empty);
                        return;
                    }

                    self.output.speak(RETRY_APOLOGY_LINE).await;
                    self.transition(SessionState::Resetting, RenderPayload::Empty);
                    tokio::time::sleep(self.retry_delay).await;
                    // Loop re-enters Prompting without a new user gesture.
                }

                TurnCapture::PermissionLost(code) => {
                    log::warn!("session: microphone permission lost ({code})");
                    self.session.permission_granted = false;
                    self.session.reset_transient();
                    self.transition(SessionState::AwaitingPermission, RenderPayload::Empty);
                    return;
                }
            }
        }
    }

    /// Drive one capture attempt to its terminal event.
    async fn capture_once(&mut self) -> TurnCapture {
        let (tx, mut rx) = mpsc::channel(32);
        self.capture.start_recording(tx);

        while let Some(event) = rx.recv().await {
            match event {
                CaptureEvent::Started => {
                    log::debug!("session: listening");
                }
                CaptureEvent::Transcript {
                    final_text,
                    interim_text,
                } => {
                    self.render(
                        SessionState::Recording,
                        RenderPayload::Transcript {
                            final_text,
                            interim_text,
                        },
                    );
                }
                CaptureEvent::Ended { final_text } => {
                    let text = final_text.trim().to_string();
                    return if text.is_empty() {
                        TurnCapture::Silence
                    } else {
                        TurnCapture::Topic(text)
                    };
                }
                CaptureEvent::Failed { code } => {
                    return if is_permission_code(&code) {
                        TurnCapture::PermissionLost(code)
                    } else {
                        TurnCapture::Silence
                    };
                }
            }
        }

        // Channel closed without a terminal event — treat as silence.
        TurnCapture::Silence
    }

    // -----------------------------------------------------------------------
    // Generate → present
    // -----------------------------------------------------------------------

    async fn generate_and_present(&mut self) {
        self.transition(SessionState::Generating, RenderPayload::loading());

        let request = GenerationRequest::new(self.session.captured_text.clone());
        let story = self.chain.generate(&request).await;

        if story.provenance.is_local() && !self.local_reveal_delay.is_zero() {
            // A template story is instantaneous; pace the reveal so it does
            // not arrive faster than any plausible generation could.
            tokio::time::sleep(self.local_reveal_delay).await;
        }

        self.session.state = SessionState::Presenting;
        match self.presenter.render(
            SessionState::Presenting,
            &RenderPayload::Story {
                story: story.clone(),
            },
        ) {
            Ok(()) => {
                log::info!(
                    "session: presenting {:?} ({} provenance)",
                    story.title,
                    story.provenance.label()
                );
                self.story = Some(story);
            }
            Err(fault) => {
                // Structural integration problem — abandon the turn.
                log::error!("session: presentation fault: {fault}");
                self.output.speak(RESET_APOLOGY_LINE).await;
                self.reset();
            }
        }
    }

    // -----------------------------------------------------------------------
    // Reset
    // -----------------------------------------------------------------------

    /// Tear the session back down. Transient state is cleared atomically
    /// before the next transition is considered; the permission and
    /// interaction flags survive.
    fn reset(&mut self) {
        log::info!("session: resetting from {:?}", self.session.state);
        self.transition(SessionState::Resetting, RenderPayload::Empty);

        self.session.reset_transient();
        self.story = None;

        let next = if self.session.permission_granted {
            SessionState::AwaitingInteraction
        } else {
            SessionState::AwaitingPermission
        };
        self.transition(next, RenderPayload::Empty);
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn transition(&mut self, state: SessionState, payload: RenderPayload) {
        log::debug!("session: {:?} -> {:?}", self.session.state, state);
        self.session.state = state;
        self.render(state, payload);
    }

    /// Render without a state change. Faults outside story presentation are
    /// logged and tolerated.
    fn render(&self, state: SessionState, payload: RenderPayload) {
        if let Err(fault) = self.presenter.render(state, &payload) {
            log::warn!("session: render fault in {:?}: {fault}", state);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
