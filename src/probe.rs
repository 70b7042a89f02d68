// ABOUTME: Model availability prober that resolves each catalog id to its working fully-qualified id
// ABOUTME: Tries routing prefixes in order, classifies failures, then merges pinned ids and dedups
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 dravr.ai

//! # Prober
//!
//! For every catalog id the prober sends one tiny synthetic request per
//! routing prefix (`us.`, `global.`, none) and keeps the first prefix that
//! works. Ids that already carry a prefix are tested once, as-is.
//!
//! Per-attempt failures never abort a run: they are classified by
//! [`crate::classify`] and an id that works under no prefix simply
//! contributes nothing.

use std::collections::HashSet;

use futures::stream::{self, StreamExt};
use tracing::{debug, info};

use crate::classify::classify;
use crate::config::ProbeOptions;
use crate::model_id::{provider_tag, qualify, split_routing_prefix, ROUTING_PREFIXES};
use crate::payload::{probe_body, skip_reason};
use crate::types::{ModelCatalog, ModelRuntime, ProbeError, ProbeOutcome, Strictness};

/// Probes model ids against a [`ModelRuntime`]
pub struct Prober<R> {
    runtime: R,
    options: ProbeOptions,
}

impl<R: ModelRuntime> Prober<R> {
    /// Create a prober over a runtime
    #[must_use]
    pub const fn new(runtime: R, options: ProbeOptions) -> Self {
        Self { runtime, options }
    }

    /// The runtime requests are sent through
    pub const fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Options this prober was built with
    pub const fn options(&self) -> &ProbeOptions {
        &self.options
    }

    /// Probe candidate ids and return the working list
    ///
    /// The result starts with the pinned ids (in caller order, never probed,
    /// never filtered), followed by probed successes in candidate order.
    /// Every id appears at most once.
    pub async fn probe(&self, candidate_ids: &[String]) -> Vec<String> {
        let working = self.probe_candidates(candidate_ids).await;
        merge_pinned(&self.options.pinned_first, working)
    }

    /// Filter and resolve candidates without applying pinned ids
    async fn probe_candidates(&self, candidate_ids: &[String]) -> Vec<String> {
        let kept: Vec<&str> = candidate_ids
            .iter()
            .map(String::as_str)
            .filter(|id| {
                let ignored = self.options.is_ignored(id);
                if ignored {
                    debug!(model_id = id, "Ignored by prefix filter");
                }
                !ignored
            })
            .collect();

        // `buffered` yields in input order regardless of completion order
        let resolved: Vec<Option<String>> = stream::iter(kept)
            .map(|id| self.resolve(id))
            .buffered(self.options.concurrency.max(1))
            .collect()
            .await;

        resolved.into_iter().flatten().collect()
    }

    /// Find the working fully-qualified id for one raw catalog id
    pub async fn resolve(&self, model_id: &str) -> Option<String> {
        info!(model_id, "Testing model");

        if let Some((prefix, base_id)) = split_routing_prefix(model_id) {
            let outcome = self.test_candidate(model_id, base_id).await;
            let working = report(model_id, prefix, outcome);
            if working.is_none() {
                info!(model_id, "✗ doesn't work as listed");
            }
            return working;
        }

        for prefix in ROUTING_PREFIXES {
            let qualified = qualify(prefix, model_id);
            let outcome = self.test_candidate(&qualified, model_id).await;
            if let Some(working) = report(model_id, prefix, outcome) {
                return Some(working);
            }
        }

        info!(model_id, "✗ doesn't work with any prefix");
        None
    }

    /// Send one synthetic request for `qualified` and classify the result
    ///
    /// `base_id` is the id without routing prefix; it selects the request
    /// shape and decides up-front exclusions.
    pub async fn test_candidate(&self, qualified: &str, base_id: &str) -> ProbeOutcome {
        let provider = provider_tag(base_id);
        let strictness = self.options.strictness;

        if let Some(reason) = skip_reason(&provider, base_id) {
            debug!(model_id = qualified, provider = %provider, ?reason, "Skipped without request");
            return ProbeOutcome::NotWorking;
        }

        debug!(model_id = qualified, provider = %provider, %strictness, "Testing candidate");

        let body = probe_body(&provider);
        let result = match strictness {
            Strictness::Strict => self.runtime.invoke_stream(qualified, &body).await,
            Strictness::Lenient => self.runtime.invoke(qualified, &body).await,
        };

        match result {
            Ok(()) => {
                debug!(model_id = qualified, "Invocation succeeded");
                ProbeOutcome::Working(qualified.to_owned())
            }
            Err(failure) => {
                let verdict = classify(&failure, strictness);
                debug!(model_id = qualified, error = %failure, ?verdict, "Invocation failed");
                if verdict.is_working() {
                    ProbeOutcome::Working(qualified.to_owned())
                } else {
                    ProbeOutcome::NotWorking
                }
            }
        }
    }
}

fn report(model_id: &str, prefix: &str, outcome: ProbeOutcome) -> Option<String> {
    let working = outcome.into_working_id()?;
    if prefix.is_empty() {
        info!(model_id, working_id = %working, "✓ works without prefix");
    } else {
        info!(model_id, prefix, working_id = %working, "✓ works with prefix");
    }
    Some(working)
}

/// Put pinned ids first and drop duplicates, keeping first occurrences
#[must_use]
pub fn merge_pinned(pinned_first: &[String], probed: Vec<String>) -> Vec<String> {
    dedup_preserving_order(pinned_first.iter().cloned().chain(probed))
}

/// Exact-string dedup that keeps the first occurrence of each id
#[must_use]
pub fn dedup_preserving_order<I>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    ids.into_iter()
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// Summary of a complete run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    /// Models listed by the catalog
    pub catalog_count: usize,
    /// Models left after the ignore filter
    pub tested_count: usize,
    /// Pinned ids placed first
    pub pinned_count: usize,
    /// Final ordered, deduplicated list
    pub models: Vec<String>,
}

impl ProbeReport {
    /// Models contributed by probing rather than pinning
    #[must_use]
    pub fn probed_count(&self) -> usize {
        self.models.len().saturating_sub(self.pinned_count)
    }
}

/// List the catalog, probe every listed id, and merge pinned ids
///
/// # Errors
///
/// Returns `CatalogUnavailable` when the catalog cannot be listed. Nothing
/// that happens while probing individual ids is an error.
pub async fn run<C, R>(catalog: &C, prober: &Prober<R>) -> Result<ProbeReport, ProbeError>
where
    C: ModelCatalog + ?Sized,
    R: ModelRuntime,
{
    let summaries = catalog.list_models().await?;
    for summary in &summaries {
        debug!(
            model_id = %summary.model_id,
            provider = summary.provider_name.as_deref().unwrap_or("-"),
            name = summary.model_name.as_deref().unwrap_or("-"),
            modalities = ?summary.output_modalities,
            streaming = ?summary.response_streaming_supported,
            "Catalog entry"
        );
    }
    let candidate_ids: Vec<String> = summaries.into_iter().map(|s| s.model_id).collect();
    let catalog_count = candidate_ids.len();
    info!(count = catalog_count, "Found models in catalog");

    let options = prober.options();
    let tested_count = candidate_ids
        .iter()
        .filter(|id| !options.is_ignored(id))
        .count();
    info!(count = tested_count, "Testing models after filtering");

    for pinned in &options.pinned_first {
        info!(model_id = %pinned, "Using pre-validated pinned model");
    }

    let models = prober.probe(&candidate_ids).await;
    let pinned_count = dedup_preserving_order(options.pinned_first.iter().cloned()).len();

    let report = ProbeReport {
        catalog_count,
        tested_count,
        pinned_count,
        models,
    };
    info!(
        total = report.models.len(),
        pinned = report.pinned_count,
        probed = report.probed_count(),
        "Found working models"
    );
    Ok(report)
}
