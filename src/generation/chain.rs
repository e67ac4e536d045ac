//! Provider chain — remote generation with deterministic local fallback.
//!
//! [`ProviderChain::generate`] is the only generation entry point the
//! orchestrator sees, and it **always** resolves to a valid story:
//!
//! 1. The first enabled [`ProviderDescriptor`] (configured order) becomes
//!    the active remote provider; none enabled means straight to local
//!    generation with no network call.
//! 2. A remote failure of any kind — unreachable, timed out, malformed or
//!    invalid response — is absorbed by the local storyteller.
//!
//! Callers never need a secondary fallback.

use std::sync::Arc;

use crate::config::GenerationConfig;
use crate::generation::fallback::LocalStoryteller;
use crate::generation::provider::{ApiProvider, StoryProvider};
use crate::generation::story::{GenerationRequest, Story};

// ---------------------------------------------------------------------------
// ProviderChain
// ---------------------------------------------------------------------------

pub struct ProviderChain {
    remote: Option<Arc<dyn StoryProvider>>,
    local: LocalStoryteller,
}

impl ProviderChain {
    /// Resolve the chain from configuration: first enabled descriptor wins.
    pub fn from_config(config: &GenerationConfig) -> Self {
        let remote = config.providers.iter().find(|d| d.enabled).map(|d| {
            log::info!("provider chain: using remote provider '{}'", d.name);
            Arc::new(ApiProvider::from_descriptor(d)) as Arc<dyn StoryProvider>
        });

        if remote.is_none() {
            log::info!("provider chain: no remote provider enabled, stories are generated locally");
        }

        Self {
            remote,
            local: LocalStoryteller::new(),
        }
    }

    /// Build a chain around an explicit provider (or none). Useful for tests
    /// and embedding.
    pub fn with_provider(remote: Option<Arc<dyn StoryProvider>>) -> Self {
        Self {
            remote,
            local: LocalStoryteller::new(),
        }
    }

    /// Whether a remote provider is active.
    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Generate a story. Never fails; see the module-level contract.
    pub async fn generate(&self, request: &GenerationRequest) -> Story {
        if let Some(provider) = &self.remote {
            match provider.generate(request).await {
                Ok(story) if story.is_valid() => {
                    log::info!("story generated by '{}'", provider.name());
                    return story;
                }
                Ok(_) => {
                    log::warn!(
                        "provider '{}' returned an invalid story, falling back to local generation",
                        provider.name()
                    );
                }
                Err(e) => {
                    log::warn!(
                        "provider '{}' failed ({e}), falling back to local generation",
                        provider.name()
                    );
                }
            }
        } else {
            log::debug!("no remote provider, generating locally");
        }

        self.local.generate(request)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
