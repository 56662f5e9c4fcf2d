//! OpenAI-compatible wire format.
//!
//! Responses from "OpenAI-compatible" servers vary a lot in practice, so the
//! response side is parsed leniently from `serde_json::Value` instead of
//! strict structs: missing or mistyped fields degrade to defaults rather than
//! failing the whole operation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::infer::{infer_capabilities, infer_kind};
use crate::{Availability, Capability, ModelDescriptor, ModelKind};

use super::{
    DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, DEFAULT_TOP_P, GenerationRequest, GenerationResult,
    Usage,
};

// ────────────────────────────────────────────────────────────────────────────
// Chat completion request
// ────────────────────────────────────────────────────────────────────────────

/// Message in a chat completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Body of `POST /v1/chat/completions`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl ChatCompletionRequest {
    /// Build the payload for a single user prompt.
    pub fn from_generation(request: &GenerationRequest, default_model: &str) -> Self {
        Self {
            model: request
                .model
                .clone()
                .unwrap_or_else(|| default_model.to_string()),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: request.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            top_p: request.top_p.unwrap_or(DEFAULT_TOP_P),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Model list response
// ────────────────────────────────────────────────────────────────────────────

/// One entry of the `data` array returned by `GET /v1/models`.
///
/// Only `id` is required. Optional fields with an unexpected shape are
/// treated as absent so one odd field never hides the model.
#[derive(Debug)]
pub struct WireModel {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub max_tokens: Option<u32>,
    pub cost_per_1k_tokens: Option<f64>,
    /// Explicit capability list; overrides inference when it parses.
    pub capabilities: Option<Vec<String>>,
    /// Explicit model kind (`type` on the wire); overrides inference when it parses.
    pub kind: Option<String>,
    pub status: Option<String>,
}

impl WireModel {
    /// Read an entry, returning `None` when it has no string `id`.
    pub fn from_value(entry: &Value) -> Option<Self> {
        let id = entry.get("id")?.as_str()?.to_string();
        let text = |key: &str| entry.get(key).and_then(Value::as_str).map(str::to_string);

        Some(Self {
            name: text("name"),
            description: text("description"),
            max_tokens: entry.get("max_tokens").and_then(token_limit),
            cost_per_1k_tokens: entry.get("cost_per_1k_tokens").and_then(Value::as_f64),
            capabilities: entry.get("capabilities").and_then(string_list),
            kind: text("type"),
            status: text("status"),
            id,
        })
    }

    /// Convert to a [`ModelDescriptor`], preferring explicit fields over
    /// id-based inference.
    pub fn to_descriptor(&self) -> ModelDescriptor {
        let capabilities = self
            .capabilities
            .as_ref()
            .map(|names| {
                names
                    .iter()
                    .filter_map(|name| Capability::parse(name))
                    .collect::<Vec<_>>()
            })
            .filter(|parsed| !parsed.is_empty())
            .unwrap_or_else(|| infer_capabilities(&self.id));

        let kind = self
            .kind
            .as_deref()
            .and_then(ModelKind::parse)
            .unwrap_or_else(|| infer_kind(&self.id));

        let availability = match self.status.as_deref() {
            Some("unavailable" | "disabled" | "deprecated") => Availability::Unavailable,
            _ => Availability::Available,
        };

        let mut builder = ModelDescriptor::builder(&self.id)
            .description(self.description.clone().unwrap_or_default())
            .capabilities(capabilities)
            .kind(kind)
            .availability(availability);
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            builder = builder.name(name);
        }
        if let Some(max_tokens) = self.max_tokens {
            builder = builder.max_tokens(max_tokens);
        }
        if let Some(cost) = self.cost_per_1k_tokens {
            builder = builder.cost_per_1k_tokens(cost);
        }
        builder.build()
    }
}

/// Integer token limit; whole floats such as `128000.0` are accepted.
fn token_limit(value: &Value) -> Option<u32> {
    let n = match value.as_u64() {
        Some(n) => n,
        None => {
            let f = value.as_f64()?;
            if f.fract() != 0.0 || f < 0.0 || f > f64::from(u32::MAX) {
                return None;
            }
            f as u64
        }
    };
    u32::try_from(n).ok()
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}

/// Parse a model-list body.
///
/// Returns `None` when there is no `data` array at all. Entries that lack a
/// string `id` are skipped individually.
pub fn parse_model_list(body: &Value) -> Option<Vec<ModelDescriptor>> {
    let entries = body.get("data")?.as_array()?;
    let models = entries
        .iter()
        .filter_map(|entry| match WireModel::from_value(entry) {
            Some(model) => Some(model.to_descriptor()),
            None => {
                debug!(entry = %entry, "skipping model entry without an id");
                None
            }
        })
        .collect();
    Some(models)
}

// ────────────────────────────────────────────────────────────────────────────
// Chat completion response
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
    #[serde(default)]
    total_tokens: Option<u64>,
}

impl From<WireUsage> for Usage {
    fn from(usage: WireUsage) -> Self {
        Self {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage
                .total_tokens
                .unwrap_or(usage.prompt_tokens.saturating_add(usage.completion_tokens)),
        }
    }
}

/// Extract the generated text.
///
/// Looks at `choices[0].message.content`, then `choices[0].text`, then the
/// top-level `response` and `text` fields used by some non-OpenAI servers.
/// Empty strings fall through to the next candidate.
pub fn extract_content(body: &Value) -> String {
    let first_choice = body.get("choices").and_then(|choices| choices.get(0));

    let candidates = [
        first_choice
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content")),
        first_choice.and_then(|choice| choice.get("text")),
        body.get("response"),
        body.get("text"),
    ];

    candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .find(|text| !text.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Extract token usage, if the response carries a usage object.
pub fn extract_usage(body: &Value) -> Option<Usage> {
    let usage = body.get("usage")?;
    if !usage.is_object() {
        return None;
    }
    serde_json::from_value::<WireUsage>(usage.clone())
        .ok()
        .map(Usage::from)
}

/// Normalize a chat completion body into a [`GenerationResult`].
///
/// `requested_model` is reported when the body does not name a model.
pub fn parse_generation(body: &Value, requested_model: &str) -> GenerationResult {
    GenerationResult {
        content: extract_content(body),
        usage: extract_usage(body),
        model: body
            .get("model")
            .and_then(Value::as_str)
            .filter(|model| !model.is_empty())
            .unwrap_or(requested_model)
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn prompt_only_request_uses_defaults() {
        let payload =
            ChatCompletionRequest::from_generation(&GenerationRequest::new("Hello"), "gpt-4o");
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["model"], "gpt-4o");
        assert_eq!(value["messages"], json!([{"role": "user", "content": "Hello"}]));
        assert_eq!(value["max_tokens"], 2000);
        assert!((value["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert!((value["top_p"].as_f64().unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn explicit_overrides_win_including_zero() {
        let request = GenerationRequest::new("Hello")
            .with_model("claude-3-haiku")
            .with_max_tokens(10)
            .with_temperature(0.0);
        let payload = ChatCompletionRequest::from_generation(&request, "gpt-4o");

        assert_eq!(payload.model, "claude-3-haiku");
        assert_eq!(payload.max_tokens, 10);
        assert_eq!(payload.temperature, 0.0);
        assert_eq!(payload.top_p, 1.0);
    }

    #[test]
    fn model_list_infers_from_id() {
        let body = json!({"object": "list", "data": [{"id": "gpt-4o", "object": "model"}]});
        let models = parse_model_list(&body).unwrap();

        assert_eq!(models.len(), 1);
        let model = &models[0];
        assert_eq!(model.id, "gpt-4o");
        assert_eq!(model.name, "gpt-4o");
        assert_eq!(model.kind, ModelKind::Chat);
        assert!(model.supports(Capability::Conversation));
        assert!(model.supports(Capability::Summarization));
    }

    #[test]
    fn model_list_reads_optional_metadata() {
        let body = json!({"data": [{
            "id": "text-davinci-003",
            "description": "legacy completion model",
            "max_tokens": 4097,
            "cost_per_1k_tokens": 0.02
        }]});
        let model = &parse_model_list(&body).unwrap()[0];

        assert_eq!(model.description, "legacy completion model");
        assert_eq!(model.max_tokens, Some(4097));
        assert_eq!(model.cost_per_1k_tokens, Some(0.02));
        assert_eq!(model.kind, ModelKind::Text);
    }

    #[test]
    fn explicit_capabilities_and_type_override_inference() {
        let body = json!({"data": [{
            "id": "gpt-translate",
            "capabilities": ["translation", "made_up"],
            "type": "text",
            "status": "deprecated"
        }]});
        let model = &parse_model_list(&body).unwrap()[0];

        assert_eq!(model.capabilities, vec![Capability::Translation]);
        assert_eq!(model.kind, ModelKind::Text);
        assert_eq!(model.availability, Availability::Unavailable);
    }

    #[test]
    fn unparseable_override_falls_back_to_inference() {
        let body = json!({"data": [{"id": "claude-3", "capabilities": ["??"], "type": "video"}]});
        let model = &parse_model_list(&body).unwrap()[0];

        assert!(model.supports(Capability::Conversation));
        assert_eq!(model.kind, ModelKind::Chat);
    }

    #[test]
    fn model_list_skips_entries_without_id() {
        let body = json!({"data": [{"object": "model"}, {"id": 42}, {"id": "llama3"}]});
        let models = parse_model_list(&body).unwrap();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].id, "llama3");
    }

    #[test]
    fn mistyped_optional_fields_do_not_drop_the_model() {
        let body = json!({"data": [
            {
                "id": "mistral-large-latest",
                "object": "model",
                "capabilities": {"completion_chat": true, "function_calling": true},
                "max_context_length": 131072
            },
            {"id": "gpt-4o", "max_tokens": 128000.0},
            {"id": "odd", "max_tokens": "lots", "cost_per_1k_tokens": "cheap", "name": 7}
        ]});
        let models = parse_model_list(&body).unwrap();

        assert_eq!(models.len(), 3);
        assert_eq!(models[0].id, "mistral-large-latest");
        assert_eq!(models[0].capabilities, vec![Capability::TextGeneration]);
        assert_eq!(models[1].max_tokens, Some(128_000));
        assert_eq!(models[2].max_tokens, None);
        assert_eq!(models[2].cost_per_1k_tokens, None);
        assert_eq!(models[2].name, "odd");
    }

    #[test]
    fn token_limit_rejects_fractions_and_out_of_range() {
        assert_eq!(token_limit(&json!(4096)), Some(4096));
        assert_eq!(token_limit(&json!(4096.0)), Some(4096));
        assert_eq!(token_limit(&json!(4096.5)), None);
        assert_eq!(token_limit(&json!(-1)), None);
        assert_eq!(token_limit(&json!(u64::from(u32::MAX) + 1)), None);
    }

    #[test]
    fn model_list_without_data_array_is_none() {
        assert!(parse_model_list(&json!({"models": []})).is_none());
        assert!(parse_model_list(&json!({"data": "nope"})).is_none());
        assert!(parse_model_list(&Value::Null).is_none());
    }

    #[test]
    fn generation_reads_choice_content_and_usage() {
        let body = json!({
            "choices": [{"message": {"content": "hi"}}],
            "usage": {"prompt_tokens": 3, "completion_tokens": 1, "total_tokens": 4},
            "model": "m"
        });
        let result = parse_generation(&body, "fallback");

        assert_eq!(result.content, "hi");
        assert_eq!(result.usage.unwrap().total_tokens, 4);
        assert_eq!(result.model, "m");
    }

    #[test]
    fn content_falls_back_through_alternate_shapes() {
        assert_eq!(extract_content(&json!({"choices": [{"text": "legacy"}]})), "legacy");
        assert_eq!(extract_content(&json!({"response": "ollama style"})), "ollama style");
        assert_eq!(extract_content(&json!({"text": "bare"})), "bare");
        assert_eq!(
            extract_content(&json!({"choices": [{"message": {"content": ""}}], "text": "next"})),
            "next"
        );
        assert_eq!(extract_content(&json!({"choices": []})), "");
        assert_eq!(extract_content(&Value::Null), "");
    }

    #[test]
    fn usage_total_is_derived_when_missing() {
        let usage = extract_usage(&json!({"usage": {"prompt_tokens": 5, "completion_tokens": 7}}))
            .unwrap();
        assert_eq!(usage.total_tokens, 12);
        assert!(extract_usage(&json!({"usage": null})).is_none());
        assert!(extract_usage(&json!({})).is_none());
    }

    #[test]
    fn derived_usage_total_saturates() {
        let usage = extract_usage(&json!({
            "usage": {"prompt_tokens": u64::MAX, "completion_tokens": 1}
        }))
        .unwrap();
        assert_eq!(usage.total_tokens, u64::MAX);
    }

    #[test]
    fn generation_model_falls_back_to_requested() {
        let result = parse_generation(&json!({"choices": []}), "gpt-4o");
        assert_eq!(result.model, "gpt-4o");
        assert!(result.usage.is_none());
        assert!(result.content.is_empty());
    }
}
