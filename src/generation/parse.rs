//! Raw provider response → validated `{title, paragraphs}`.
//!
//! Providers return free text that should contain a `TÍTULO:` line plus
//! paragraph lines, but nothing about that wire format is guaranteed. The
//! parser is defensive: the title label is matched case-insensitively (with
//! and without the accent, and the English spelling), bullet/list lines are
//! dropped, and a response with zero usable paragraphs is rejected rather
//! than presented.

use crate::generation::provider::GenerationError;
use crate::generation::story::{Provenance, Story};

/// Title used when the response carries no title line.
pub const DEFAULT_TITLE: &str = "História Mágica";

const TITLE_LABELS: &[&str] = &["TÍTULO:", "TITULO:", "TITLE:"];

/// Returns the text after the title label when `line` is a title line.
///
/// Skips by character count rather than byte offset — case folding is not
/// length-preserving for arbitrary input.
fn strip_title_label(line: &str) -> Option<&str> {
    let upper = line.to_uppercase();
    let label = TITLE_LABELS.iter().find(|label| upper.starts_with(**label))?;
    let rest = match line.char_indices().nth(label.chars().count()) {
        Some((offset, _)) => &line[offset..],
        None => "",
    };
    Some(rest.trim())
}

fn is_bullet(line: &str) -> bool {
    line.starts_with('-') || line.starts_with('*') || line.starts_with('•')
}

/// Parse a raw provider response into a valid [`Story`].
///
/// Fails with [`GenerationError::InvalidResponse`] when no paragraph
/// survives filtering — the caller falls back to local generation.
pub fn parse_story(raw: &str, provenance: Provenance) -> Result<Story, GenerationError> {
    let mut title: Option<String> = None;
    let mut paragraphs: Vec<String> = Vec::new();

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || is_bullet(line) {
            continue;
        }
        match strip_title_label(line) {
            // First title line wins; later ones are treated as paragraphs
            // only if they carry no label.
            Some(text) if title.is_none() => {
                if !text.is_empty() {
                    title = Some(text.to_string());
                }
            }
            Some(_) => {}
            None => paragraphs.push(line.to_string()),
        }
    }

    if paragraphs.is_empty() {
        return Err(GenerationError::InvalidResponse(
            "no paragraphs in provider response".into(),
        ));
    }

    Ok(Story {
        title: title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        body: paragraphs,
        provenance,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
