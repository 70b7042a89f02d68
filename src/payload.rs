// ABOUTME: Provider-keyed table of minimal synthetic request bodies for probing
// ABOUTME: Also decides which provider/id combinations are skipped without a request
//
// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 dravr.ai

use serde_json::{json, Value};

/// Prompt sent to every probed model
const PROBE_PROMPT: &str = "Hi";

/// Output cap for every probed model
const PROBE_MAX_TOKENS: u32 = 10;

/// `anthropic_version` required by Anthropic models on Bedrock
const ANTHROPIC_BEDROCK_VERSION: &str = "bedrock-2023-05-31";

/// Request shapes understood by the Bedrock model families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestShape {
    /// Anthropic messages API with `anthropic_version`
    AnthropicMessages,
    /// Chat message list with `max_tokens` (the common default)
    ChatMessages,
    /// Llama `prompt` + `max_gen_len`
    MetaPrompt,
    /// Titan `inputText` + `textGenerationConfig`
    TitanText,
    /// Jurassic `prompt` + `maxTokens`
    Ai21Prompt,
    /// `prompt` + `max_tokens` (Cohere command, Mistral)
    PromptMaxTokens,
}

/// Provider tag → request shape
///
/// Providers missing from this table use [`RequestShape::ChatMessages`].
const SHAPE_TABLE: &[(&str, RequestShape)] = &[
    ("anthropic", RequestShape::AnthropicMessages),
    ("meta", RequestShape::MetaPrompt),
    ("amazon", RequestShape::TitanText),
    ("ai21", RequestShape::Ai21Prompt),
    ("cohere", RequestShape::PromptMaxTokens),
    ("mistral", RequestShape::PromptMaxTokens),
    ("openai", RequestShape::ChatMessages),
];

/// Providers that only generate images
const IMAGE_PROVIDERS: &[&str] = &["stability"];

/// Providers whose catalog mixes embedding models in with text models, and
/// the id markers that identify those models
const NON_TEXT_MARKERS: &[(&str, &[&str])] = &[
    ("amazon", &["embed", "image"]),
    ("cohere", &["embed"]),
];

/// Why a candidate is skipped before any request is made
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Image-generation provider
    ImageProvider,
    /// Id names an embedding or image model
    NonTextModel,
}

/// Decide whether a candidate is excluded up front
#[must_use]
pub fn skip_reason(provider: &str, base_id: &str) -> Option<SkipReason> {
    if IMAGE_PROVIDERS.contains(&provider) {
        return Some(SkipReason::ImageProvider);
    }
    NON_TEXT_MARKERS
        .iter()
        .find(|(p, _)| *p == provider)
        .and_then(|(_, markers)| {
            markers
                .iter()
                .any(|marker| base_id.contains(marker))
                .then_some(SkipReason::NonTextModel)
        })
}

/// Look up the request shape for a provider tag
#[must_use]
pub fn shape_for(provider: &str) -> RequestShape {
    SHAPE_TABLE
        .iter()
        .find(|(p, _)| *p == provider)
        .map_or(RequestShape::ChatMessages, |(_, shape)| *shape)
}

impl RequestShape {
    /// Build the JSON body for this shape
    #[must_use]
    pub fn body(self) -> Value {
        match self {
            Self::AnthropicMessages => json!({
                "max_tokens": PROBE_MAX_TOKENS,
                "messages": [{"role": "user", "content": PROBE_PROMPT}],
                "anthropic_version": ANTHROPIC_BEDROCK_VERSION,
            }),
            Self::ChatMessages => json!({
                "messages": [{"role": "user", "content": PROBE_PROMPT}],
                "max_tokens": PROBE_MAX_TOKENS,
            }),
            Self::MetaPrompt => json!({
                "prompt": PROBE_PROMPT,
                "max_gen_len": PROBE_MAX_TOKENS,
            }),
            Self::TitanText => json!({
                "inputText": PROBE_PROMPT,
                "textGenerationConfig": {"maxTokenCount": PROBE_MAX_TOKENS},
            }),
            Self::Ai21Prompt => json!({
                "prompt": PROBE_PROMPT,
                "maxTokens": PROBE_MAX_TOKENS,
            }),
            Self::PromptMaxTokens => json!({
                "prompt": PROBE_PROMPT,
                "max_tokens": PROBE_MAX_TOKENS,
            }),
        }
    }
}

/// Serialized probe body for a provider tag
#[must_use]
pub fn probe_body(provider: &str) -> Vec<u8> {
    // Serializing a `Value` built from literals cannot fail
    serde_json::to_vec(&shape_for(provider).body()).unwrap_or_default()
}
