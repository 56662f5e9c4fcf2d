//! Model metadata derived from provider responses.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Something a model is able to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Free-form text generation. Every model has it.
    TextGeneration,
    /// Multi-turn conversation.
    Conversation,
    /// Condensing long input.
    Summarization,
    /// Only ever set by an explicit upstream override.
    Translation,
    /// Writing and completing source code.
    CodeGeneration,
}

impl Capability {
    /// Parse the wire name (`text_generation`, `conversation`, ...).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text_generation" => Some(Self::TextGeneration),
            "conversation" => Some(Self::Conversation),
            "summarization" => Some(Self::Summarization),
            "translation" => Some(Self::Translation),
            "code_generation" => Some(Self::CodeGeneration),
            _ => None,
        }
    }

    /// The wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TextGeneration => "text_generation",
            Self::Conversation => "conversation",
            Self::Summarization => "summarization",
            Self::Translation => "translation",
            Self::CodeGeneration => "code_generation",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Broad category of a model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Chat,
    #[default]
    Text,
    Image,
    Embedding,
}

impl ModelKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "chat" => Some(Self::Chat),
            "text" => Some(Self::Text),
            "image" => Some(Self::Image),
            "embedding" => Some(Self::Embedding),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Text => "text",
            Self::Image => "image",
            Self::Embedding => "embedding",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the provider reports the model as usable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    #[default]
    Available,
    Unavailable,
}

/// Metadata about one model exposed by a provider.
///
/// Built from a model-list response; only ever stored inside the model cache
/// of the configuration it was fetched for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Model identifier as the provider reports it (e.g., "gpt-4o").
    pub id: String,
    /// Human-readable name. Providers rarely send one, so it defaults to the id.
    pub name: String,
    /// Free-text description, empty when the provider sends none.
    #[serde(default)]
    pub description: String,
    /// Ordered capability set.
    pub capabilities: Vec<Capability>,
    /// Maximum tokens per request, if the provider advertises it.
    pub max_tokens: Option<u32>,
    /// Cost per 1000 tokens in USD, if the provider advertises it.
    pub cost_per_1k_tokens: Option<f64>,
    /// Broad category.
    pub kind: ModelKind,
    /// Availability status.
    pub availability: Availability,
}

impl ModelDescriptor {
    /// Create a new descriptor builder.
    pub fn builder(id: &str) -> ModelDescriptorBuilder {
        ModelDescriptorBuilder::new(id)
    }

    /// Check whether the model has a capability.
    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Estimated cost of `tokens` tokens, when pricing is known.
    pub fn estimate_cost(&self, tokens: u64) -> Option<f64> {
        self.cost_per_1k_tokens
            .map(|per_1k| (tokens as f64 / 1000.0) * per_1k)
    }
}

/// Builder for constructing [`ModelDescriptor`].
#[derive(Debug)]
pub struct ModelDescriptorBuilder {
    id: String,
    name: Option<String>,
    description: String,
    capabilities: Vec<Capability>,
    max_tokens: Option<u32>,
    cost_per_1k_tokens: Option<f64>,
    kind: ModelKind,
    availability: Availability,
}

impl ModelDescriptorBuilder {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: None,
            description: String::new(),
            capabilities: vec![Capability::TextGeneration],
            max_tokens: None,
            cost_per_1k_tokens: None,
            kind: ModelKind::default(),
            availability: Availability::default(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn capabilities(mut self, capabilities: Vec<Capability>) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    pub fn cost_per_1k_tokens(mut self, cost: f64) -> Self {
        self.cost_per_1k_tokens = Some(cost);
        self
    }

    pub fn kind(mut self, kind: ModelKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn availability(mut self, availability: Availability) -> Self {
        self.availability = availability;
        self
    }

    /// Build the descriptor.
    pub fn build(self) -> ModelDescriptor {
        ModelDescriptor {
            name: self.name.unwrap_or_else(|| self.id.clone()),
            id: self.id,
            description: self.description,
            capabilities: self.capabilities,
            max_tokens: self.max_tokens,
            cost_per_1k_tokens: self.cost_per_1k_tokens,
            kind: self.kind,
            availability: self.availability,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_wire_names_round_trip() {
        for capability in [
            Capability::TextGeneration,
            Capability::Conversation,
            Capability::Summarization,
            Capability::Translation,
            Capability::CodeGeneration,
        ] {
            assert_eq!(Capability::parse(capability.as_str()), Some(capability));
        }
        assert_eq!(Capability::parse("Conversation"), None);
    }

    #[test]
    fn capability_serializes_snake_case() {
        let json = serde_json::to_string(&Capability::CodeGeneration).unwrap();
        assert_eq!(json, "\"code_generation\"");
    }

    #[test]
    fn model_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ModelKind::Embedding).unwrap(), "\"embedding\"");
        assert_eq!(ModelKind::parse("image"), Some(ModelKind::Image));
        assert_eq!(ModelKind::parse("video"), None);
    }

    #[test]
    fn builder_defaults_name_to_id() {
        let model = ModelDescriptor::builder("gpt-4o").build();
        assert_eq!(model.name, "gpt-4o");
        assert_eq!(model.capabilities, vec![Capability::TextGeneration]);
        assert_eq!(model.kind, ModelKind::Text);
        assert_eq!(model.availability, Availability::Available);
        assert!(model.description.is_empty());
    }

    #[test]
    fn builder_sets_all_fields() {
        let model = ModelDescriptor::builder("claude-3-haiku")
            .name("Claude 3 Haiku")
            .description("fast")
            .capabilities(vec![Capability::TextGeneration, Capability::Conversation])
            .max_tokens(4096)
            .cost_per_1k_tokens(0.25)
            .kind(ModelKind::Chat)
            .availability(Availability::Unavailable)
            .build();

        assert_eq!(model.name, "Claude 3 Haiku");
        assert!(model.supports(Capability::Conversation));
        assert!(!model.supports(Capability::CodeGeneration));
        assert_eq!(model.max_tokens, Some(4096));
        assert_eq!(model.availability, Availability::Unavailable);
    }

    #[test]
    fn estimate_cost_uses_per_1k_pricing() {
        let priced = ModelDescriptor::builder("m").cost_per_1k_tokens(0.5).build();
        let cost = priced.estimate_cost(3000).unwrap();
        assert!((cost - 1.5).abs() < 1e-9);

        let unpriced = ModelDescriptor::builder("m").build();
        assert!(unpriced.estimate_cost(3000).is_none());
    }
}
