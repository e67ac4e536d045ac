//! Story generation module.
//!
//! This module provides:
//! * [`ProviderChain`] — the single generation entry point; remote provider
//!   plus deterministic local fallback. `generate` always yields a valid
//!   story.
//! * [`StoryProvider`] — async trait implemented by remote backends.
//! * [`ApiProvider`] — OpenAI-compatible chat-completions backend.
//! * [`LocalStoryteller`] — deterministic template generation.
//! * [`PromptBuilder`] — provider prompt construction.
//! * [`extract_hints`] — fixed-vocabulary keyword extraction.
//! * [`Story`] / [`GenerationRequest`] / [`Provenance`] — the data model.
//!
//! # Quick start
//!
//! ```rust
//! use voice_to_story::config::GenerationConfig;
//! use voice_to_story::generation::{GenerationRequest, ProviderChain};
//!
//! #[tokio::main]
//! async fn main() {
//!     // Default config has no enabled provider — stories come from the
//!     // local templates, deterministically.
//!     let chain = ProviderChain::from_config(&GenerationConfig::default());
//!
//!     let story = chain
//!         .generate(&GenerationRequest::new("um dragão na floresta"))
//!         .await;
//!
//!     assert!(story.is_valid());
//!     println!("{}", story.title);
//! }
//! ```

pub mod chain;
pub mod fallback;
pub mod keywords;
pub mod parse;
pub mod prompt;
pub mod provider;
pub mod story;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use chain::ProviderChain;
pub use fallback::LocalStoryteller;
pub use keywords::extract_hints;
pub use parse::parse_story;
pub use prompt::PromptBuilder;
pub use provider::{ApiProvider, GenerationError, StoryProvider};
pub use story::{GenerationRequest, Provenance, Story, StoryHints};
