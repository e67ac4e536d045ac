//! Voice-to-Story — a voice-driven story generator for children.
//!
//! A child speaks a topic aloud; the app answers with a short illustrated
//! story. This crate is the orchestration core: it sequences speech output
//! and speech input over an unreliable asynchronous capture device, calls a
//! remote story provider under a timeout, and deterministically falls back to
//! local generation when the provider is unavailable.
//!
//! # Architecture
//!
//! ```text
//! UserAction ──▶ SessionOrchestrator (single writer of Session)
//!                    │
//!                    ├─▶ OutputChannel ──▶ Synthesizer (platform TTS)
//!                    ├─▶ CaptureSession ─▶ Recognizer  (platform ASR)
//!                    ├─▶ ProviderChain ──▶ StoryProvider (remote) ─┐
//!                    │                     LocalStoryteller ◀──────┘ fallback
//!                    └─▶ Presenter::render(state, payload)
//! ```
//!
//! One full cycle of prompt → capture → confirm → generate → present is a
//! *turn*. Stages run strictly in state-machine order; no stage begins before
//! the previous stage's completion resolves.
//!
//! The platform speech capabilities ([`speech::Synthesizer`],
//! [`speech::Recognizer`]) and the presentation layer
//! ([`session::Presenter`]) are narrow trait seams — the core never touches
//! audio devices or screens directly, and "unsupported" is a valid,
//! non-erroring answer from either speech seam.

pub mod config;
pub mod generation;
pub mod permission;
pub mod session;
pub mod speech;
