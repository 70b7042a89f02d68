// ABOUTME: Anatomy of Bedrock model identifiers: routing prefixes and provider tags
// ABOUTME: Splits "us."/"global." prefixes off raw ids and derives the vendor namespace
//
// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 dravr.ai

/// Routing prefixes tried, in order, for an id that carries none
///
/// The empty prefix means "the raw id as listed in the catalog".
pub const ROUTING_PREFIXES: &[&str] = &["us.", "global.", ""];

/// Prefixes that mark an id as already routed
const KNOWN_PREFIXES: &[&str] = &["us.", "global."];

/// Split a routing prefix off an id that already carries one
///
/// - `"us.anthropic.claude-x"` → `Some(("us.", "anthropic.claude-x"))`
/// - `"anthropic.claude-x"` → `None`
#[must_use]
pub fn split_routing_prefix(model_id: &str) -> Option<(&'static str, &str)> {
    KNOWN_PREFIXES
        .iter()
        .find_map(|prefix| model_id.strip_prefix(prefix).map(|rest| (*prefix, rest)))
}

/// Vendor namespace of an un-prefixed id, lower-cased
///
/// `"Anthropic.claude-x"` → `"anthropic"`. An id without a dot is its own tag.
#[must_use]
pub fn provider_tag(base_id: &str) -> String {
    base_id
        .split_once('.')
        .map_or(base_id, |(provider, _)| provider)
        .to_lowercase()
}

/// Build a fully-qualified id from a routing prefix and a raw id
#[must_use]
pub fn qualify(prefix: &str, model_id: &str) -> String {
    if prefix.is_empty() {
        model_id.to_owned()
    } else {
        format!("{prefix}{model_id}")
    }
}
