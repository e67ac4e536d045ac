//! Prompt construction for remote story providers.
//!
//! [`PromptBuilder`] produces a `(system_msg, user_msg)` pair for any
//! OpenAI-compatible `/v1/chat/completions` endpoint. The user prompt pins
//! the response format the parser expects: an optional `TÍTULO:` line plus
//! plain paragraph lines.

use crate::generation::keywords::extract_hints;
use crate::generation::story::GenerationRequest;

// ---------------------------------------------------------------------------
// Instructions
// ---------------------------------------------------------------------------

const SYSTEM_INSTRUCTION: &str = "Você é um contador de histórias mágicas para crianças. \
Crie histórias divertidas, educativas e apropriadas para a idade.";

// ---------------------------------------------------------------------------
// PromptBuilder
// ---------------------------------------------------------------------------

/// Builds story-generation prompts from a [`GenerationRequest`].
///
/// When the request carries no explicit hints they are extracted from the
/// spoken text, so the prompt always names a theme, characters and a setting.
#[derive(Debug, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build a `(system_msg, user_msg)` pair for a chat-completions call.
    pub fn build_chat(&self, request: &GenerationRequest) -> (String, String) {
        let hints = match request.hints() {
            Some(hints) => hints.clone(),
            None => extract_hints(request.raw_user_text()),
        };

        let mut user_msg = format!(
            "Crie uma história mágica para crianças com os seguintes elementos: \
             tema {}, personagens {}, cenário {}.",
            hints.theme, hints.characters, hints.setting
        );

        let spoken = request.raw_user_text().trim();
        if !spoken.is_empty() {
            user_msg.push_str(&format!("\nA criança pediu: \"{spoken}\"."));
        }

        user_msg.push_str(
            "\n\nA história deve ter:\n\
             - Um título criativo\n\
             - 4-6 parágrafos curtos\n\
             - Personagens carismáticos\n\
             - Uma mensagem positiva\n\
             - Linguagem simples e divertida\n\n\
             Formato de resposta:\n\
             TÍTULO: [título da história]\n\n\
             [parágrafo 1]\n\n\
             [parágrafo 2]\n\n\
             [parágrafo 3]\n\n\
             [parágrafo 4]",
        );

        (SYSTEM_INSTRUCTION.to_string(), user_msg)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
