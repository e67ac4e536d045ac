//! Deterministic local story generation.
//!
//! [`LocalStoryteller`] is the last link of the provider chain: it always
//! produces a valid story, with no I/O and no randomness. The same request
//! yields the same story, every time.
//!
//! A template is selected by the first theme keyword found in the spoken
//! text (checked in the fixed order amizade → coragem → aventura → magia,
//! default aventura); the extracted character and setting phrases are
//! substituted into the template's four paragraph slots.

use crate::generation::keywords::{self, extract_hints};
use crate::generation::story::{GenerationRequest, Provenance, Story, StoryHints};

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

/// Four paragraph slots per theme. `{c}` = characters, `{s}` = setting.
struct StoryTemplate {
    theme: &'static str,
    slots: [&'static str; 4],
}

static TEMPLATES: &[StoryTemplate] = &[
    StoryTemplate {
        theme: "amizade",
        slots: [
            "Era uma vez {c} que viviam em um {s} muito especial. Eles eram os melhores amigos do mundo.",
            "Um dia, eles descobriram que a verdadeira magia não estava nos poderes, mas na amizade que compartilhavam.",
            "Juntos, eles enfrentaram todos os desafios e aprenderam que amigos de verdade sempre se ajudam.",
            "Agora, eles vivem felizes para sempre, espalhando magia e amizade por todo o {s}.",
        ],
    },
    StoryTemplate {
        theme: "coragem",
        slots: [
            "Havia {c} que moravam em um {s} misterioso. Eles sempre tiveram medo de aventuras.",
            "Mas um dia, eles decidiram ser corajosos e sair em busca de uma grande descoberta.",
            "Com muito esforço e determinação, eles superaram todos os seus medos e desafios.",
            "Agora eles são conhecidos como os mais corajosos de todo o {s}!",
        ],
    },
    StoryTemplate {
        theme: "aventura",
        slots: [
            "Em um {s} distante, viviam {c} que sonhavam com grandes aventuras.",
            "Um dia, eles partiram em uma jornada incrível cheia de surpresas e descobertas mágicas.",
            "Pelo caminho, eles encontraram novos amigos e descobriram lugares nunca vistos antes.",
            "Quando voltaram para casa, eles tinham histórias incríveis para contar e memórias para sempre!",
        ],
    },
    StoryTemplate {
        theme: "magia",
        slots: [
            "{c} viviam em um {s} onde a magia era real e acontecia todos os dias.",
            "Eles descobriram que cada um tinha um poder especial e único dentro de si.",
            "Juntos, eles aprenderam a usar seus poderes para ajudar outros e fazer o bem.",
            "Agora, eles são os guardiões da magia no {s}, protegendo todos os sonhos e esperanças.",
        ],
    },
];

/// Position of the aventura template, the default.
const DEFAULT_TEMPLATE_INDEX: usize = 2;

fn select_template(theme: &str) -> &'static StoryTemplate {
    TEMPLATES
        .iter()
        .find(|t| t.theme == theme)
        .unwrap_or(&TEMPLATES[DEFAULT_TEMPLATE_INDEX])
}

// ---------------------------------------------------------------------------
// Title derivation
// ---------------------------------------------------------------------------

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Title from the first usable spoken word, else from the character phrase,
/// else the generic default.
fn derive_title(raw_text: &str, hints: &StoryHints) -> String {
    if let Some(word) = raw_text
        .split_whitespace()
        .find(|word| word.chars().count() > 2)
    {
        return format!("A Aventura dos {}", capitalize_first(word));
    }
    if hints.characters != keywords::DEFAULT_CHARACTERS {
        return format!("{} Mágico", capitalize_first(&hints.characters));
    }
    "História Mágica".to_string()
}

// ---------------------------------------------------------------------------
// LocalStoryteller
// ---------------------------------------------------------------------------

/// Deterministic template-based storyteller. Infallible by construction.
#[derive(Debug, Default)]
pub struct LocalStoryteller;

impl LocalStoryteller {
    pub fn new() -> Self {
        Self
    }

    /// Generate a story for `request`. Always returns a valid story tagged
    /// `provenance = Local`.
    pub fn generate(&self, request: &GenerationRequest) -> Story {
        let hints = match request.hints() {
            Some(hints) => hints.clone(),
            None => extract_hints(request.raw_user_text()),
        };

        let template = select_template(&hints.theme);
        log::debug!(
            "local storyteller: theme '{}', characters '{}', setting '{}'",
            template.theme,
            hints.characters,
            hints.setting
        );

        let body = template
            .slots
            .iter()
            .map(|slot| {
                slot.replace("{c}", &hints.characters)
                    .replace("{s}", &hints.setting)
            })
            .collect();

        Story {
            title: derive_title(request.raw_user_text(), &hints),
            body,
            provenance: Provenance::Local,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
