//! Interaction session module — the top-level orchestration layer.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                SessionOrchestrator                        │
//! │                                                          │
//! │  UserAction ──▶ handle_action ──▶ Session (single owner) │
//! │                      │                                   │
//! │        ┌─────────────┼──────────────┐                    │
//! │        ▼             ▼              ▼                    │
//! │  OutputChannel  CaptureSession  ProviderChain            │
//! │        │             │              │                    │
//! │        └─────────────┴──────────────┘                    │
//! │                      ▼                                   │
//! │        Presenter::render(state, payload)                 │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The orchestrator is the only writer of the [`Session`] record. Everything
//! asynchronous — capture events, timers, user actions — funnels into its
//! single task over channels.

pub mod orchestrator;
pub mod presenter;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use orchestrator::SessionOrchestrator;
pub use presenter::{PresentationFault, Presenter, RenderPayload, UserAction, LOADING_MESSAGES};
pub use state::{Session, SessionState};
