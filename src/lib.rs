// ABOUTME: Library for finding which Amazon Bedrock model ids actually work for an account
// ABOUTME: Re-exports the prober, the Bedrock client, and the output formatters
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 dravr.ai

//! # Bedrock Probe
//!
//! Bedrock lists foundation models under raw ids, but many of them can only
//! be invoked through a cross-region (`us.`) or global (`global.`)
//! inference profile. This crate takes the catalog, sends a tiny synthetic
//! request per routing prefix, and reports the first fully-qualified id that
//! works for each model.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bedrock_probe::{AwsCredentials, BedrockClient, ClientConfig, ProbeOptions, Prober};
//!
//! # async fn example() -> Result<(), bedrock_probe::types::ProbeError> {
//! let credentials = AwsCredentials::from_lookup(|key| std::env::var(key).ok())?;
//! let client = BedrockClient::new(ClientConfig::new("us-west-2", credentials))?;
//! let prober = Prober::new(client, ProbeOptions::new());
//! let report = bedrock_probe::run(prober.runtime(), &prober).await?;
//! println!("{}", report.models.join(","));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`types`]: Errors, outcomes, and the catalog/runtime traits
//! - [`config`]: Probe options and client configuration
//! - [`auth`]: AWS credential resolution
//! - [`model_id`]: Routing prefixes and provider tags
//! - [`payload`]: Per-provider synthetic request bodies
//! - [`classify`]: Failure → working/not-working decision table
//! - [`probe`]: The prober and full-run driver
//! - [`output`]: env / list / yaml serialization
//! - [`bedrock`]: reqwest-based Bedrock client
//! - [`sigv4`]: AWS Signature Version 4
//! - [`event_stream`]: Streaming response framing

/// Core types: errors, outcomes, and service traits
pub mod types;

/// AWS credential resolution
pub mod auth;
/// Bedrock HTTP client
pub mod bedrock;
/// Failure classification table
pub mod classify;
/// Probe and client configuration
pub mod config;
/// Event-stream frame decoding
pub mod event_stream;
/// Model id anatomy
pub mod model_id;
/// Result serialization
pub mod output;
/// Synthetic request bodies
pub mod payload;
/// The prober
pub mod probe;
/// Request signing
pub mod sigv4;

pub use auth::{AwsCredentials, SharedProfile};
pub use bedrock::BedrockClient;
pub use config::{ClientConfig, ProbeOptions, DEFAULT_REGION};
pub use output::{OutputFormat, DEFAULT_ENV_KEY};
pub use probe::{run, ProbeReport, Prober};
pub use types::{InvokeFailure, ModelCatalog, ModelRuntime, ProbeOutcome, Strictness};
