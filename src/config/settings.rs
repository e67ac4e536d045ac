//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// SpeechConfig
// ---------------------------------------------------------------------------

/// Settings for spoken output (the platform text-to-speech voice).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// BCP-47 language tag for synthesis and recognition.
    pub language: String,
    /// Speaking rate multiplier (1.0 = platform default). Slightly slower
    /// than default reads better for young listeners.
    pub rate: f32,
    /// Voice pitch multiplier (1.0 = platform default).
    pub pitch: f32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            language: "pt-BR".into(),
            rate: 0.9,
            pitch: 1.1,
        }
    }
}

// ---------------------------------------------------------------------------
// CaptureConfig
// ---------------------------------------------------------------------------

/// Settings for one bounded voice-capture attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Hard cap on a capture attempt, in seconds. The session is force-ended
    /// when this elapses regardless of recognizer activity.
    pub hard_timeout_secs: u64,
    /// Seconds to keep listening after a final transcript fragment arrives.
    /// Long enough not to cut off hesitant speech, short enough to stay
    /// responsive.
    pub grace_timeout_secs: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            hard_timeout_secs: 20,
            grace_timeout_secs: 2,
        }
    }
}

// ---------------------------------------------------------------------------
// ProviderDescriptor
// ---------------------------------------------------------------------------

/// One remote story provider entry. Read-only after load.
///
/// Providers are kept in an explicit ordered list; the chain resolves the
/// first entry with `enabled == true`. Iteration order is the configured
/// order, nothing else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    /// Display name, also recorded as the story's provenance tag.
    pub name: String,
    /// Whether this provider may be selected.
    pub enabled: bool,
    /// Base URL of an OpenAI-compatible chat-completions endpoint.
    pub base_url: String,
    /// Model identifier sent to the API.
    pub model: String,
    /// API key — `None` for local providers that require no authentication.
    pub api_key: Option<String>,
    /// Maximum seconds to wait for a response before the call is cancelled.
    pub timeout_secs: u64,
}

impl Default for ProviderDescriptor {
    fn default() -> Self {
        Self {
            name: "openai".into(),
            enabled: false,
            base_url: "https://api.openai.com".into(),
            model: "gpt-3.5-turbo".into(),
            api_key: None,
            timeout_secs: 20,
        }
    }
}

// ---------------------------------------------------------------------------
// GenerationConfig
// ---------------------------------------------------------------------------

/// Settings for the story provider chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Remote providers in resolution order. The first enabled entry is the
    /// active provider; an empty or fully disabled list means every story is
    /// generated locally.
    pub providers: Vec<ProviderDescriptor>,
    /// Milliseconds to hold a locally generated story back before presenting
    /// it, so the response does not feel uncannily instantaneous.
    pub local_reveal_delay_ms: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            providers: vec![ProviderDescriptor::default()],
            local_reveal_delay_ms: 1200,
        }
    }
}

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Settings for the interaction state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Consecutive empty/failed captures tolerated before the turn stops
    /// auto-restarting and waits for an explicit user action instead.
    pub max_capture_attempts: u32,
    /// Milliseconds to wait after an apology before re-entering the prompt.
    pub retry_delay_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_capture_attempts: 3,
            retry_delay_ms: 1500,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use voice_to_story::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Spoken-output voice settings.
    pub speech: SpeechConfig,
    /// Voice-capture timeouts.
    pub capture: CaptureConfig,
    /// Story provider chain settings.
    pub generation: GenerationConfig,
    /// Interaction state machine settings.
    pub session: SessionConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Verify that a default `AppConfig` can be serialised to TOML and
    /// deserialised back without any data loss.
    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");

        // SpeechConfig
        assert_eq!(original.speech.language, loaded.speech.language);
        assert_eq!(original.speech.rate, loaded.speech.rate);
        assert_eq!(original.speech.pitch, loaded.speech.pitch);

        // CaptureConfig
        assert_eq!(
            original.capture.hard_timeout_secs,
            loaded.capture.hard_timeout_secs
        );
        assert_eq!(
            original.capture.grace_timeout_secs,
            loaded.capture.grace_timeout_secs
        );

        // GenerationConfig
        assert_eq!(
            original.generation.providers.len(),
            loaded.generation.providers.len()
        );
        assert_eq!(
            original.generation.providers[0].name,
            loaded.generation.providers[0].name
        );
        assert_eq!(
            original.generation.local_reveal_delay_ms,
            loaded.generation.local_reveal_delay_ms
        );

        // SessionConfig
        assert_eq!(
            original.session.max_capture_attempts,
            loaded.session.max_capture_attempts
        );
    }

    /// `load_from` on a non-existent path must return `Default` without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        let default = AppConfig::default();

        assert_eq!(config.speech.language, default.speech.language);
        assert_eq!(
            config.capture.hard_timeout_secs,
            default.capture.hard_timeout_secs
        );
        assert_eq!(
            config.session.max_capture_attempts,
            default.session.max_capture_attempts
        );
    }

    /// Verify default values match the product design.
    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.speech.language, "pt-BR");
        assert_eq!(cfg.capture.hard_timeout_secs, 20);
        assert_eq!(cfg.capture.grace_timeout_secs, 2);
        assert_eq!(cfg.generation.providers.len(), 1);
        assert!(!cfg.generation.providers[0].enabled);
        assert_eq!(cfg.generation.providers[0].timeout_secs, 20);
        assert_eq!(cfg.generation.local_reveal_delay_ms, 1200);
        assert_eq!(cfg.session.max_capture_attempts, 3);
    }

    /// Verify that modified non-default values survive a round trip, in
    /// particular that provider order is preserved exactly as written.
    #[test]
    fn round_trip_preserves_provider_order() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.generation.providers = vec![
            ProviderDescriptor {
                name: "primary".into(),
                enabled: false,
                ..ProviderDescriptor::default()
            },
            ProviderDescriptor {
                name: "secondary".into(),
                enabled: true,
                base_url: "http://localhost:11434".into(),
                model: "qwen2.5:3b".into(),
                api_key: Some("sk-test".into()),
                timeout_secs: 30,
            },
        ];
        cfg.session.max_capture_attempts = 5;

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.generation.providers[0].name, "primary");
        assert_eq!(loaded.generation.providers[1].name, "secondary");
        assert!(loaded.generation.providers[1].enabled);
        assert_eq!(
            loaded.generation.providers[1].api_key,
            Some("sk-test".into())
        );
        assert_eq!(loaded.generation.providers[1].timeout_secs, 30);
        assert_eq!(loaded.session.max_capture_attempts, 5);
    }
}
