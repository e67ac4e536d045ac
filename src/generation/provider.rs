//! `StoryProvider` trait and the remote OpenAI-compatible implementation.
//!
//! [`ApiProvider`] calls any OpenAI-compatible `/v1/chat/completions`
//! endpoint. All connection details come from the [`ProviderDescriptor`];
//! nothing is hardcoded, and no vendor beyond the chat-completions wire
//! format is assumed.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::ProviderDescriptor;
use crate::generation::parse;
use crate::generation::prompt::PromptBuilder;
use crate::generation::story::{GenerationRequest, Provenance, Story};

// ---------------------------------------------------------------------------
// GenerationError
// ---------------------------------------------------------------------------

/// Errors a story provider can fail with. All of them are absorbed by the
/// provider chain's local fallback — they never propagate past it.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Transport failure, rejected request, or no provider configured.
    #[error("story provider unavailable: {0}")]
    Unavailable(String),

    /// The call did not complete within the descriptor's timeout.
    #[error("story provider timed out")]
    Timeout,

    /// The response could not be turned into a valid story.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GenerationError::Timeout
        } else {
            GenerationError::Unavailable(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// StoryProvider trait
// ---------------------------------------------------------------------------

/// Async trait for story generation backends.
///
/// Implementors must be `Send + Sync` so they can be shared as
/// `Arc<dyn StoryProvider>`.
#[async_trait]
pub trait StoryProvider: Send + Sync {
    /// Configured provider name, recorded as story provenance.
    fn name(&self) -> &str;

    /// Generate a story for `request`. A returned story satisfies the
    /// validity invariant; everything else is an error.
    async fn generate(&self, request: &GenerationRequest) -> Result<Story, GenerationError>;
}

// ---------------------------------------------------------------------------
// ApiProvider
// ---------------------------------------------------------------------------

/// Remote provider speaking the OpenAI chat-completions wire format.
pub struct ApiProvider {
    client: reqwest::Client,
    descriptor: ProviderDescriptor,
    prompt_builder: PromptBuilder,
}

impl ApiProvider {
    /// Build a provider from its descriptor.
    ///
    /// The HTTP client carries the per-call timeout from
    /// `descriptor.timeout_secs`; a timed-out call is cancelled by the
    /// client and surfaces as [`GenerationError::Timeout`].
    pub fn from_descriptor(descriptor: &ProviderDescriptor) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(descriptor.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            descriptor: descriptor.clone(),
            prompt_builder: PromptBuilder::new(),
        }
    }
}

#[async_trait]
impl StoryProvider for ApiProvider {
    fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Issue the chat-completions call and parse the response text.
    ///
    /// The `Authorization: Bearer …` header is attached **only** when the
    /// descriptor carries a non-empty API key — safe for local providers
    /// that require no authentication.
    async fn generate(&self, request: &GenerationRequest) -> Result<Story, GenerationError> {
        let (system_msg, user_msg) = self.prompt_builder.build_chat(request);

        let url = format!("{}/v1/chat/completions", self.descriptor.base_url);

        let body = serde_json::json!({
            "model":       self.descriptor.model,
            "messages": [
                { "role": "system", "content": system_msg },
                { "role": "user",   "content": user_msg   }
            ],
            "stream":      false,
            "max_tokens":  1024
        });

        let mut req = self.client.post(&url).json(&body);

        let key = self.descriptor.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;

        if !response.status().is_success() {
            return Err(GenerationError::Unavailable(format!(
                "HTTP {} from {}",
                response.status(),
                self.descriptor.name
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| GenerationError::InvalidResponse("no message content".into()))?;

        parse::parse_story(
            content,
            Provenance::Remote {
                provider: self.descriptor.name.clone(),
            },
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
