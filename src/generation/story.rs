//! Story data model — the artifacts flowing through the provider chain.

// ---------------------------------------------------------------------------
// Provenance
// ---------------------------------------------------------------------------

/// Where a story came from. Never absent on a [`Story`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    /// Generated by a remote provider, identified by its configured name.
    Remote { provider: String },
    /// Generated by the deterministic local templates.
    Local,
}

impl Provenance {
    pub fn is_local(&self) -> bool {
        matches!(self, Provenance::Local)
    }

    /// Short label for display ("local" or the provider name).
    pub fn label(&self) -> &str {
        match self {
            Provenance::Remote { provider } => provider,
            Provenance::Local => "local",
        }
    }
}

// ---------------------------------------------------------------------------
// Story
// ---------------------------------------------------------------------------

/// A generated story.
///
/// A story is valid only when the title is non-empty and the body holds at
/// least one non-empty paragraph. Anything else is a generation failure and
/// must never reach presentation — the provider chain enforces this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Story {
    /// Story title. Non-empty in a valid story.
    pub title: String,
    /// Ordered paragraph texts. Non-empty, each paragraph non-empty, in a
    /// valid story.
    pub body: Vec<String>,
    /// Origin tag.
    pub provenance: Provenance,
}

impl Story {
    /// Check the validity invariant.
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty()
            && !self.body.is_empty()
            && self.body.iter().all(|p| !p.trim().is_empty())
    }

    /// Total word count across title and body, used for readout pacing.
    pub fn word_count(&self) -> usize {
        self.title.split_whitespace().count()
            + self
                .body
                .iter()
                .map(|p| p.split_whitespace().count())
                .sum::<usize>()
    }

    /// The full story text as one string, for spoken readout.
    pub fn full_text(&self) -> String {
        format!("{}. {}", self.title, self.body.join(" "))
    }
}

// ---------------------------------------------------------------------------
// StoryHints
// ---------------------------------------------------------------------------

/// Theme/characters/setting extracted from speech or selected by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryHints {
    /// Theme keyword (e.g. "amizade", "aventura").
    pub theme: String,
    /// Character phrase with articles (e.g. "um dragão e uma fada").
    pub characters: String,
    /// Setting word (e.g. "floresta").
    pub setting: String,
}

// ---------------------------------------------------------------------------
// GenerationRequest
// ---------------------------------------------------------------------------

/// Input to the provider chain. Immutable once constructed — the chain may
/// retry the *same* request across providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    raw_user_text: String,
    hints: Option<StoryHints>,
}

impl GenerationRequest {
    /// A request from spoken text alone. Empty text is fine — it yields a
    /// default-topic story.
    pub fn new(raw_user_text: impl Into<String>) -> Self {
        Self {
            raw_user_text: raw_user_text.into(),
            hints: None,
        }
    }

    /// A request with explicit hints (e.g. user-selected theme).
    pub fn with_hints(raw_user_text: impl Into<String>, hints: StoryHints) -> Self {
        Self {
            raw_user_text: raw_user_text.into(),
            hints: Some(hints),
        }
    }

    pub fn raw_user_text(&self) -> &str {
        &self.raw_user_text
    }

    pub fn hints(&self) -> Option<&StoryHints> {
        self.hints.as_ref()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn story(title: &str, body: &[&str]) -> Story {
        Story {
            title: title.into(),
            body: body.iter().map(|p| p.to_string()).collect(),
            provenance: Provenance::Local,
        }
    }

    #[test]
    fn valid_story_passes_invariant() {
        assert!(story("O Dragão", &["Era uma vez."]).is_valid());
    }

    #[test]
    fn empty_title_is_invalid() {
        assert!(!story("", &["Era uma vez."]).is_valid());
        assert!(!story("   ", &["Era uma vez."]).is_valid());
    }

    #[test]
    fn empty_body_is_invalid() {
        assert!(!story("O Dragão", &[]).is_valid());
    }

    #[test]
    fn blank_paragraph_is_invalid() {
        assert!(!story("O Dragão", &["Era uma vez.", "  "]).is_valid());
    }

    #[test]
    fn word_count_spans_title_and_body() {
        let s = story("O Dragão Estelar", &["Era uma vez um dragão.", "Fim."]);
        assert_eq!(s.word_count(), 3 + 5 + 1);
    }

    #[test]
    fn full_text_joins_title_and_paragraphs() {
        let s = story("O Dragão", &["Era uma vez.", "Fim."]);
        assert_eq!(s.full_text(), "O Dragão. Era uma vez. Fim.");
    }

    #[test]
    fn provenance_labels() {
        assert_eq!(Provenance::Local.label(), "local");
        assert_eq!(
            Provenance::Remote {
                provider: "openai".into()
            }
            .label(),
            "openai"
        );
        assert!(Provenance::Local.is_local());
    }

    #[test]
    fn request_is_immutable_by_construction() {
        let request = GenerationRequest::new("um dragão");
        assert_eq!(request.raw_user_text(), "um dragão");
        assert!(request.hints().is_none());

        let hints = StoryHints {
            theme: "coragem".into(),
            characters: "um dragão".into(),
            setting: "castelo".into(),
        };
        let request = GenerationRequest::with_hints("", hints.clone());
        assert_eq!(request.hints(), Some(&hints));
    }
}
