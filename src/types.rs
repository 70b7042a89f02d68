// ABOUTME: Core types for the Bedrock model prober: errors, outcomes, catalog records
// ABOUTME: Provides the ModelCatalog and ModelRuntime traits that the prober is written against
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 dravr.ai

//! # Core Types
//!
//! Self-contained type definitions shared by the prober, the Bedrock HTTP
//! client and the command-line host. The two service seams (catalog listing
//! and model invocation) are traits so the probing logic can be exercised
//! without network access.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ============================================================================
// Error Type
// ============================================================================

/// Error type for run-level prober failures
///
/// Per-candidate invocation failures are never surfaced through this type;
/// they are [`InvokeFailure`]s and get classified into a [`ProbeOutcome`].
#[derive(Debug, Clone)]
pub struct ProbeError {
    /// Error category
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
}

/// Categories of errors that abort a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Internal error (bug, unexpected state)
    Internal,
    /// The model catalog could not be listed
    CatalogUnavailable,
    /// Missing or unusable AWS credentials
    AuthFailure,
    /// Configuration error
    Config,
}

impl ProbeError {
    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Internal,
            message: message.into(),
        }
    }

    /// Create a catalog-unavailable error
    pub fn catalog_unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::CatalogUnavailable,
            message: message.into(),
        }
    }

    /// Create an auth failure error
    pub fn auth_failure(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::AuthFailure,
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Config,
            message: message.into(),
        }
    }
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ProbeError {}

// ============================================================================
// Invocation Failures
// ============================================================================

/// Why a single synthetic invocation did not succeed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvokeFailure {
    /// Structured error returned by the service
    Service {
        /// Vendor error code, e.g. `ValidationException`
        code: String,
        /// Human-readable message attached to the error
        message: String,
    },
    /// Anything that never produced a structured error (network, decoding)
    Transport(String),
}

impl InvokeFailure {
    /// Create a structured service failure
    pub fn service(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create a transport-level failure
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }
}

impl fmt::Display for InvokeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Service { code, message } => write!(f, "{code}: {message}"),
            Self::Transport(message) => write!(f, "transport: {message}"),
        }
    }
}

// ============================================================================
// Probe Vocabulary
// ============================================================================

/// How much evidence is required before a model id counts as working
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Validate through the streaming path and treat ambiguous errors as failures
    #[default]
    Strict,
    /// Validate through the single-shot path and give ambiguous errors the benefit of the doubt
    Lenient,
}

impl fmt::Display for Strictness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Lenient => write!(f, "lenient"),
        }
    }
}

/// Result of testing one fully-qualified model id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The id is reachable; carries the fully-qualified id
    Working(String),
    /// The id is wrong or unusable
    NotWorking,
}

impl ProbeOutcome {
    /// Consume the outcome and return the working id, if any
    #[must_use]
    pub fn into_working_id(self) -> Option<String> {
        match self {
            Self::Working(id) => Some(id),
            Self::NotWorking => None,
        }
    }
}

/// A record from the foundation model catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSummary {
    /// Raw model identifier
    pub model_id: String,
    /// Vendor display name
    #[serde(default)]
    pub provider_name: Option<String>,
    /// Model display name
    #[serde(default)]
    pub model_name: Option<String>,
    /// Output modalities advertised by the catalog (TEXT, IMAGE, EMBEDDING)
    #[serde(default)]
    pub output_modalities: Vec<String>,
    /// Whether the catalog claims streaming support
    #[serde(default)]
    pub response_streaming_supported: Option<bool>,
}

impl ModelSummary {
    /// Create a summary carrying only a model id
    #[must_use]
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            provider_name: None,
            model_name: None,
            output_modalities: Vec::new(),
            response_streaming_supported: None,
        }
    }
}

// ============================================================================
// Service Traits
// ============================================================================

/// Source of candidate model ids
#[async_trait]
pub trait ModelCatalog: Send + Sync {
    /// List every model the catalog knows about, in catalog order
    async fn list_models(&self) -> Result<Vec<ModelSummary>, ProbeError>;
}

/// Model invocation service used to test candidate ids
#[async_trait]
pub trait ModelRuntime: Send + Sync {
    /// Single-response invocation; `Ok` means the call succeeded
    async fn invoke(&self, model_id: &str, body: &[u8]) -> Result<(), InvokeFailure>;

    /// Streaming invocation
    ///
    /// `Ok` means the stream was established and either yielded its first
    /// event or ended without one.
    async fn invoke_stream(&self, model_id: &str, body: &[u8]) -> Result<(), InvokeFailure>;
}
