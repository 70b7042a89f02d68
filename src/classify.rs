// ABOUTME: Decision table mapping Bedrock invocation failures to working / not-working
// ABOUTME: Separates "wrong id or prefix" from "right id, some other obstacle"
//
// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 dravr.ai

//! # Failure Classification
//!
//! A failed synthetic invocation still tells us something. Access denial,
//! throttling and a missing streaming path all prove that the id names a
//! real model, so those count as working. Not-found style errors mean the
//! prefix or id is wrong. Validation errors and uncatalogued codes are
//! ambiguous and resolve according to [`Strictness`].

use crate::types::{InvokeFailure, Strictness};

/// Service error codes with a fixed interpretation
pub mod codes {
    /// Wrong id or wrong routing prefix
    pub const RESOURCE_NOT_FOUND: &str = "ResourceNotFoundException";
    /// Request rejected by input validation
    pub const VALIDATION: &str = "ValidationException";
    /// Model exists but the account lacks access
    pub const ACCESS_DENIED: &str = "AccessDeniedException";
    /// Model exists but the caller is rate-limited
    pub const THROTTLING: &str = "ThrottlingException";
    /// Model exists but cannot be streamed
    pub const STREAMING_NOT_SUPPORTED: &str = "ModelStreamingNotSupportedException";
}

/// Message fragments that turn a validation error into a not-found
const NOT_FOUND_PATTERNS: &[&str] = &[
    "model not found",
    "does not exist",
    "not available",
    "cannot find",
    "unknown model",
    "unsupported model",
    "invalid model",
    "no model named",
    "model '",
];

/// Message fragments that reject an otherwise uncatalogued code
const GENERIC_NOT_FOUND_PATTERNS: &[&str] = &["not found", "does not exist"];

/// Classification of one failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The id is valid despite the failure
    Working,
    /// The id or prefix is wrong, or the failure is inconclusive
    NotWorking,
}

impl Verdict {
    /// Whether the verdict accepts the id
    #[must_use]
    pub const fn is_working(self) -> bool {
        matches!(self, Self::Working)
    }
}

/// Map a failure onto a verdict
#[must_use]
pub fn classify(failure: &InvokeFailure, strictness: Strictness) -> Verdict {
    match failure {
        InvokeFailure::Service { code, message } => classify_service(code, message, strictness),
        InvokeFailure::Transport(_) => Verdict::NotWorking,
    }
}

fn classify_service(code: &str, message: &str, strictness: Strictness) -> Verdict {
    let message = message.to_lowercase();
    match code {
        codes::RESOURCE_NOT_FOUND => Verdict::NotWorking,
        codes::VALIDATION => {
            if contains_any(&message, NOT_FOUND_PATTERNS) {
                Verdict::NotWorking
            } else {
                lenient_only(strictness)
            }
        }
        codes::ACCESS_DENIED | codes::THROTTLING | codes::STREAMING_NOT_SUPPORTED => {
            Verdict::Working
        }
        _ => {
            if contains_any(&message, GENERIC_NOT_FOUND_PATTERNS) {
                Verdict::NotWorking
            } else {
                lenient_only(strictness)
            }
        }
    }
}

const fn lenient_only(strictness: Strictness) -> Verdict {
    match strictness {
        Strictness::Strict => Verdict::NotWorking,
        Strictness::Lenient => Verdict::Working,
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Normalise an event-stream exception type to its service error code
///
/// Exceptions raised inside a response stream are named in lowerCamel form
/// (`throttlingException`); HTTP errors use `ThrottlingException`.
#[must_use]
pub fn normalize_code(raw: &str) -> String {
    let mut chars = raw.trim().chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
