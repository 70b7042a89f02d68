// ABOUTME: Configuration types for the Bedrock prober and its HTTP client
// ABOUTME: Defines probe options, client endpoints/timeouts, and comma-list parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 dravr.ai

use std::time::Duration;

use crate::auth::AwsCredentials;
use crate::types::{ProbeError, Strictness};

/// Default AWS region for catalog and invocation calls
pub const DEFAULT_REGION: &str = "us-west-2";

/// Default timeout for a single HTTP request (60 seconds)
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Options controlling a probe run
#[derive(Debug, Clone)]
pub struct ProbeOptions {
    /// Evidence required before an id counts as working
    pub strictness: Strictness,
    /// Catalog ids starting with any of these are dropped before probing
    pub ignore_prefixes: Vec<String>,
    /// Ids placed first in the result without probing or filtering
    pub pinned_first: Vec<String>,
    /// Number of catalog ids probed at once (1 = strictly sequential)
    pub concurrency: usize,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            strictness: Strictness::Strict,
            ignore_prefixes: Vec::new(),
            pinned_first: Vec::new(),
            concurrency: 1,
        }
    }
}

impl ProbeOptions {
    /// Create options with defaults (strict, no filtering, sequential)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the strictness
    #[must_use]
    pub const fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    /// Set the ignore prefixes; blank entries are dropped and the rest trimmed
    #[must_use]
    pub fn with_ignore_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.ignore_prefixes = normalize_list(prefixes);
        self
    }

    /// Set the pinned ids; blank entries are dropped and the rest trimmed
    #[must_use]
    pub fn with_pinned_first(mut self, ids: Vec<String>) -> Self {
        self.pinned_first = normalize_list(ids);
        self
    }

    /// Set how many catalog ids are probed at once (minimum 1)
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Whether a catalog id is excluded by the ignore list
    #[must_use]
    pub fn is_ignored(&self, model_id: &str) -> bool {
        self.ignore_prefixes
            .iter()
            .any(|prefix| model_id.starts_with(prefix.as_str()))
    }
}

/// Connection settings for the Bedrock control and runtime endpoints
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// AWS region
    pub region: String,
    /// Credentials used to sign or authorize requests
    pub credentials: AwsCredentials,
    /// Override for the control-plane endpoint (catalog listing)
    pub control_endpoint: Option<String>,
    /// Override for the runtime endpoint (model invocation)
    pub runtime_endpoint: Option<String>,
    /// Maximum time for a single HTTP request
    pub timeout: Duration,
}

impl ClientConfig {
    /// Create a client configuration for a region
    #[must_use]
    pub fn new(region: impl Into<String>, credentials: AwsCredentials) -> Self {
        Self {
            region: region.into(),
            credentials,
            control_endpoint: None,
            runtime_endpoint: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Point both endpoints at a single base URL (local mocks, VPC endpoints)
    #[must_use]
    pub fn with_endpoint(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.control_endpoint = Some(base_url.clone());
        self.runtime_endpoint = Some(base_url);
        self
    }

    /// Set the request timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base URL of the control-plane endpoint
    #[must_use]
    pub fn control_base_url(&self) -> String {
        self.control_endpoint
            .clone()
            .unwrap_or_else(|| format!("https://bedrock.{}.amazonaws.com", self.region))
    }

    /// Base URL of the runtime endpoint
    #[must_use]
    pub fn runtime_base_url(&self) -> String {
        self.runtime_endpoint
            .clone()
            .unwrap_or_else(|| format!("https://bedrock-runtime.{}.amazonaws.com", self.region))
    }
}

/// Parse a comma-separated list, trimming entries and dropping blanks
#[must_use]
pub fn parse_csv_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn normalize_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse a timeout value from a string (in seconds)
///
/// # Errors
///
/// Returns a config error unless the value is a positive whole number.
pub fn parse_timeout(input: &str) -> Result<Duration, ProbeError> {
    let secs = input
        .trim()
        .parse::<u64>()
        .map_err(|e| ProbeError::config(format!("Invalid timeout {input:?}: {e}")))?;
    timeout_from_secs(secs)
}

/// Turn a whole number of seconds into a request timeout
///
/// # Errors
///
/// Returns a config error for zero, which would fail every request at once.
pub fn timeout_from_secs(secs: u64) -> Result<Duration, ProbeError> {
    if secs == 0 {
        return Err(ProbeError::config("Timeout must be at least 1 second"));
    }
    Ok(Duration::from_secs(secs))
}
