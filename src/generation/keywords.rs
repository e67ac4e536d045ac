//! Fixed-vocabulary keyword extraction from spoken text.
//!
//! A child's spoken topic is scanned against three small Portuguese
//! vocabularies — themes, characters, settings — to produce [`StoryHints`].
//! Matching is case-insensitive substring containment; every field has a
//! default so extraction always yields usable hints.

use crate::generation::story::StoryHints;

// ---------------------------------------------------------------------------
// Vocabularies
// ---------------------------------------------------------------------------

pub const DEFAULT_THEME: &str = "aventura";
pub const DEFAULT_CHARACTERS: &str = "amigos mágicos";
pub const DEFAULT_SETTING: &str = "mundo mágico";

/// Theme keywords in priority order — the first one present in the text wins.
pub const THEMES: &[&str] = &["amizade", "coragem", "aventura", "magia"];

/// Character keyword → article-carrying phrase.
const CHARACTERS: &[(&str, &str)] = &[
    ("gato", "um gato"),
    ("cachorro", "um cachorro"),
    ("dragão", "um dragão"),
    ("fada", "uma fada"),
    ("princesa", "uma princesa"),
    ("príncipe", "um príncipe"),
    ("unicórnio", "um unicórnio"),
    ("coruja", "uma coruja"),
    ("leão", "um leão"),
    ("rato", "um rato"),
    ("menino", "um menino"),
    ("menina", "uma menina"),
];

const SETTINGS: &[&str] = &[
    "floresta", "castelo", "espaço", "oceano", "montanha", "cidade", "escola", "casa", "jardim",
    "praia",
];

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Extract story hints from spoken text.
///
/// Multiple character matches are joined with " e "; unmatched fields fall
/// back to the defaults, so the result is always a complete set of hints.
///
/// # Example
/// ```rust
/// use voice_to_story::generation::extract_hints;
///
/// let hints = extract_hints("um dragão na floresta");
/// assert_eq!(hints.characters, "um dragão");
/// assert_eq!(hints.setting, "floresta");
/// assert_eq!(hints.theme, "aventura"); // no theme word present — default
/// ```
pub fn extract_hints(text: &str) -> StoryHints {
    let lower = text.to_lowercase();

    let theme = THEMES
        .iter()
        .find(|theme| lower.contains(**theme))
        .copied()
        .unwrap_or(DEFAULT_THEME);

    let characters: Vec<&str> = CHARACTERS
        .iter()
        .filter(|(keyword, _)| lower.contains(keyword))
        .map(|(_, phrase)| *phrase)
        .collect();
    let characters = if characters.is_empty() {
        DEFAULT_CHARACTERS.to_string()
    } else {
        characters.join(" e ")
    };

    let setting = SETTINGS
        .iter()
        .find(|setting| lower.contains(**setting))
        .copied()
        .unwrap_or(DEFAULT_SETTING);

    StoryHints {
        theme: theme.to_string(),
        characters,
        setting: setting.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
