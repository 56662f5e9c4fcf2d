//! Best-effort guesses about a model from its identifier.
//!
//! OpenAI-compatible model lists usually carry nothing but an id, so the
//! capability set and model kind are inferred from substrings of that id.
//! These are heuristics, not provider contracts: an id like "codellama-chat"
//! or a vendor's private naming scheme will be classified however its
//! substrings happen to fall. Matching is case-sensitive. When the provider
//! does send explicit `capabilities` or `type` fields, those take precedence
//! (see the model-list parsing in the provider client).

use crate::{Capability, ModelKind};

/// Infer the capability set of a model from its id.
///
/// Every model gets [`Capability::TextGeneration`]; "gpt"/"claude" ids add
/// conversation and summarization; "code"/"codex" ids add code generation.
pub fn infer_capabilities(model_id: &str) -> Vec<Capability> {
    let mut capabilities = vec![Capability::TextGeneration];

    if model_id.contains("gpt") || model_id.contains("claude") {
        capabilities.push(Capability::Conversation);
        capabilities.push(Capability::Summarization);
    }

    // "codex" contains "code"; both are listed to keep the rule explicit.
    if model_id.contains("code") || model_id.contains("codex") {
        capabilities.push(Capability::CodeGeneration);
    }

    capabilities
}

/// Infer the broad kind of a model from its id.
pub fn infer_kind(model_id: &str) -> ModelKind {
    if model_id.contains("embedding") {
        ModelKind::Embedding
    } else if ["image", "vision", "dall"]
        .iter()
        .any(|needle| model_id.contains(needle))
    {
        ModelKind::Image
    } else if ["gpt", "claude", "chat"]
        .iter()
        .any(|needle| model_id.contains(needle))
    {
        ModelKind::Chat
    } else {
        ModelKind::Text
    }
}
