// ABOUTME: Integration tests for the prober against a scripted in-memory catalog and runtime
// ABOUTME: Covers prefix order, short-circuiting, pinned ids, ignore filtering, dedup, and ordering
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 dravr.ai

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bedrock_probe::types::{ErrorKind, ModelSummary, ProbeError};
use bedrock_probe::{
    run, InvokeFailure, ModelCatalog, ModelRuntime, ProbeOptions, Prober, Strictness,
};

/// Which runtime entry point a request went through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Path {
    Invoke,
    Stream,
}

/// Runtime that answers from a fixed table and records every request
///
/// Ids missing from the table fail with `ResourceNotFoundException`.
#[derive(Default)]
struct ScriptedRuntime {
    answers: HashMap<String, Result<(), InvokeFailure>>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<(String, Path)>>,
}

impl ScriptedRuntime {
    fn new() -> Self {
        Self::default()
    }

    fn works(mut self, model_id: &str) -> Self {
        self.answers.insert(model_id.to_owned(), Ok(()));
        self
    }

    fn fails(mut self, model_id: &str, code: &str, message: &str) -> Self {
        self.answers.insert(
            model_id.to_owned(),
            Err(InvokeFailure::service(code, message)),
        );
        self
    }

    fn delayed(mut self, model_id: &str, millis: u64) -> Self {
        self.delays
            .insert(model_id.to_owned(), Duration::from_millis(millis));
        self
    }

    fn calls(&self) -> Vec<(String, Path)> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn called_ids(&self) -> Vec<String> {
        self.calls().into_iter().map(|(id, _)| id).collect()
    }

    async fn answer(&self, model_id: &str, path: Path) -> Result<(), InvokeFailure> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((model_id.to_owned(), path));
        if let Some(delay) = self.delays.get(model_id) {
            tokio::time::sleep(*delay).await;
        }
        self.answers.get(model_id).cloned().unwrap_or_else(|| {
            Err(InvokeFailure::service(
                "ResourceNotFoundException",
                "Model not found",
            ))
        })
    }
}

#[async_trait]
impl ModelRuntime for ScriptedRuntime {
    async fn invoke(&self, model_id: &str, _body: &[u8]) -> Result<(), InvokeFailure> {
        self.answer(model_id, Path::Invoke).await
    }

    async fn invoke_stream(&self, model_id: &str, _body: &[u8]) -> Result<(), InvokeFailure> {
        self.answer(model_id, Path::Stream).await
    }
}

/// Catalog that returns a fixed list, or fails
struct StaticCatalog {
    ids: Option<Vec<&'static str>>,
}

#[async_trait]
impl ModelCatalog for StaticCatalog {
    async fn list_models(&self) -> Result<Vec<ModelSummary>, ProbeError> {
        self.ids.as_ref().map_or_else(
            || Err(ProbeError::catalog_unavailable("HTTP 500")),
            |ids| Ok(ids.iter().map(|id| ModelSummary::new(*id)).collect()),
        )
    }
}

fn ids(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

// ============================================================================
// Prefix Iteration
// ============================================================================

#[tokio::test]
async fn prefixed_id_gets_exactly_one_request() {
    let runtime = ScriptedRuntime::new();
    let prober = Prober::new(runtime, ProbeOptions::new());

    let result = prober.probe(&ids(&["global.anthropic.claude-y"])).await;

    assert!(result.is_empty());
    assert_eq!(
        prober.runtime().called_ids(),
        ids(&["global.anthropic.claude-y"])
    );
}

#[tokio::test]
async fn prefixed_id_that_works_is_kept_as_listed() {
    let runtime = ScriptedRuntime::new().works("us.meta.llama3-70b-instruct-v1:0");
    let prober = Prober::new(runtime, ProbeOptions::new());

    let result = prober
        .probe(&ids(&["us.meta.llama3-70b-instruct-v1:0"]))
        .await;

    assert_eq!(result, ids(&["us.meta.llama3-70b-instruct-v1:0"]));
    assert_eq!(prober.runtime().calls().len(), 1);
}

#[tokio::test]
async fn prefixes_tried_in_fixed_order() {
    let runtime = ScriptedRuntime::new();
    let prober = Prober::new(runtime, ProbeOptions::new());

    let result = prober.probe(&ids(&["mistral.mistral-large"])).await;

    assert!(result.is_empty());
    assert_eq!(
        prober.runtime().called_ids(),
        ids(&[
            "us.mistral.mistral-large",
            "global.mistral.mistral-large",
            "mistral.mistral-large",
        ])
    );
}

#[tokio::test]
async fn first_success_short_circuits() {
    let runtime = ScriptedRuntime::new().works("global.anthropic.claude-x");
    let prober = Prober::new(runtime, ProbeOptions::new());

    let result = prober.probe(&ids(&["anthropic.claude-x"])).await;

    assert_eq!(result, ids(&["global.anthropic.claude-x"]));
    assert_eq!(
        prober.runtime().called_ids(),
        ids(&["us.anthropic.claude-x", "global.anthropic.claude-x"])
    );
}

#[tokio::test]
async fn bare_id_used_when_only_it_works() {
    let runtime = ScriptedRuntime::new().works("meta.llama3-8b-instruct-v1:0");
    let prober = Prober::new(runtime, ProbeOptions::new());

    let result = prober
        .probe(&ids(&["meta.llama3-8b-instruct-v1:0"]))
        .await;

    assert_eq!(result, ids(&["meta.llama3-8b-instruct-v1:0"]));
    assert_eq!(prober.runtime().calls().len(), 3);
}

// ============================================================================
// Strictness
// ============================================================================

#[tokio::test]
async fn strict_mode_uses_streaming_path() {
    let runtime = ScriptedRuntime::new().works("us.anthropic.claude-x");
    let prober = Prober::new(runtime, ProbeOptions::new());

    prober.probe(&ids(&["anthropic.claude-x"])).await;

    assert_eq!(
        prober.runtime().calls(),
        vec![("us.anthropic.claude-x".to_owned(), Path::Stream)]
    );
}

#[tokio::test]
async fn lenient_mode_uses_single_shot_path() {
    let runtime = ScriptedRuntime::new().works("us.anthropic.claude-x");
    let options = ProbeOptions::new().with_strictness(Strictness::Lenient);
    let prober = Prober::new(runtime, options);

    prober.probe(&ids(&["anthropic.claude-x"])).await;

    assert_eq!(
        prober.runtime().calls(),
        vec![("us.anthropic.claude-x".to_owned(), Path::Invoke)]
    );
}

#[tokio::test]
async fn malformed_input_depends_on_mode() {
    let build = || {
        ScriptedRuntime::new().fails(
            "us.cohere.command-r-v1:0",
            "ValidationException",
            "Malformed input request",
        )
    };

    let strict = Prober::new(build(), ProbeOptions::new());
    assert!(strict.probe(&ids(&["cohere.command-r-v1:0"])).await.is_empty());

    let lenient = Prober::new(
        build(),
        ProbeOptions::new().with_strictness(Strictness::Lenient),
    );
    assert_eq!(
        lenient.probe(&ids(&["cohere.command-r-v1:0"])).await,
        ids(&["us.cohere.command-r-v1:0"])
    );
}

#[tokio::test]
async fn access_denied_and_throttling_count_as_working() {
    let runtime = ScriptedRuntime::new()
        .fails(
            "us.anthropic.claude-opus",
            "AccessDeniedException",
            "You don't have access to the model with the specified model ID.",
        )
        .fails("us.meta.llama-big", "ThrottlingException", "Too many requests");
    let prober = Prober::new(runtime, ProbeOptions::new());

    let result = prober
        .probe(&ids(&["anthropic.claude-opus", "meta.llama-big"]))
        .await;

    assert_eq!(
        result,
        ids(&["us.anthropic.claude-opus", "us.meta.llama-big"])
    );
}

#[tokio::test]
async fn validation_not_found_rejects_in_both_modes() {
    for strictness in [Strictness::Strict, Strictness::Lenient] {
        let runtime = ScriptedRuntime::new().fails(
            "us.ai21.jamba",
            "ValidationException",
            "model 'x' does not exist",
        );
        let prober = Prober::new(runtime, ProbeOptions::new().with_strictness(strictness));
        assert!(prober.probe(&ids(&["ai21.jamba"])).await.is_empty());
        assert_eq!(prober.runtime().calls().len(), 3);
    }
}

#[tokio::test]
async fn transport_failure_is_not_working() {
    let mut runtime = ScriptedRuntime::new();
    runtime.answers.insert(
        "us.anthropic.claude-x".to_owned(),
        Err(InvokeFailure::transport("connection reset")),
    );
    let prober = Prober::new(
        runtime,
        ProbeOptions::new().with_strictness(Strictness::Lenient),
    );

    assert!(prober.probe(&ids(&["anthropic.claude-x"])).await.is_empty());
}

// ============================================================================
// Filtering, Pinning, Dedup
// ============================================================================

#[tokio::test]
async fn excluded_models_send_no_requests() {
    let runtime = ScriptedRuntime::new();
    let prober = Prober::new(runtime, ProbeOptions::new());

    let result = prober
        .probe(&ids(&[
            "amazon.titan-embed-text-v2:0",
            "cohere.embed-english-v3",
            "stability.sd3-large-v1:0",
            "amazon.titan-image-generator-v2:0",
        ]))
        .await;

    assert!(result.is_empty());
    assert!(prober.runtime().calls().is_empty());
}

#[tokio::test]
async fn ignored_prefixes_are_never_probed() {
    let runtime = ScriptedRuntime::new().works("us.anthropic.claude-x");
    let options = ProbeOptions::new().with_ignore_prefixes(ids(&["meta."]));
    let prober = Prober::new(runtime, options);

    let result = prober
        .probe(&ids(&["meta.llama3-70b-instruct-v1:0", "anthropic.claude-x"]))
        .await;

    assert_eq!(result, ids(&["us.anthropic.claude-x"]));
    assert!(prober
        .runtime()
        .called_ids()
        .iter()
        .all(|id| !id.contains("meta.")));
}

#[tokio::test]
async fn ignore_filter_does_not_apply_to_pinned() {
    let runtime = ScriptedRuntime::new();
    let options = ProbeOptions::new()
        .with_ignore_prefixes(ids(&["A"]))
        .with_pinned_first(ids(&["A.something"]));
    let prober = Prober::new(runtime, options);

    let result = prober.probe(&ids(&["A.other"])).await;

    assert_eq!(result, ids(&["A.something"]));
    assert!(prober.runtime().calls().is_empty());
}

#[tokio::test]
async fn pinned_id_appears_once_at_front() {
    let runtime = ScriptedRuntime::new()
        .works("us.meta.llama-x")
        .works("us.anthropic.claude-x");
    let options = ProbeOptions::new().with_pinned_first(ids(&["us.anthropic.claude-x"]));
    let prober = Prober::new(runtime, options);

    let result = prober
        .probe(&ids(&["meta.llama-x", "anthropic.claude-x"]))
        .await;

    assert_eq!(result, ids(&["us.anthropic.claude-x", "us.meta.llama-x"]));
}

#[tokio::test]
async fn pinned_ids_are_not_probed() {
    let runtime = ScriptedRuntime::new();
    let options = ProbeOptions::new().with_pinned_first(ids(&["us.anthropic.claude-pinned"]));
    let prober = Prober::new(runtime, options);

    let result = prober.probe(&[]).await;

    assert_eq!(result, ids(&["us.anthropic.claude-pinned"]));
    assert!(prober.runtime().calls().is_empty());
}

#[tokio::test]
async fn distinct_ids_resolving_to_same_string_dedup() {
    let runtime = ScriptedRuntime::new().works("us.anthropic.claude-x");
    let prober = Prober::new(runtime, ProbeOptions::new());

    let result = prober
        .probe(&ids(&["anthropic.claude-x", "us.anthropic.claude-x"]))
        .await;

    assert_eq!(result, ids(&["us.anthropic.claude-x"]));
}

#[tokio::test]
async fn repeated_runs_are_identical() {
    let candidates = ids(&[
        "anthropic.claude-x",
        "meta.llama-x",
        "global.openai.gpt-oss",
        "amazon.titan-embed-x",
    ]);
    let runtime = ScriptedRuntime::new()
        .works("global.anthropic.claude-x")
        .works("meta.llama-x")
        .works("global.openai.gpt-oss");
    let prober = Prober::new(runtime, ProbeOptions::new());

    let first = prober.probe(&candidates).await;
    let second = prober.probe(&candidates).await;

    assert_eq!(first, second);
    assert_eq!(
        first,
        ids(&["global.anthropic.claude-x", "meta.llama-x", "global.openai.gpt-oss"])
    );
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test(start_paused = true)]
async fn concurrent_probing_keeps_catalog_order() {
    let runtime = ScriptedRuntime::new()
        .works("us.anthropic.slow")
        .works("us.meta.fast")
        .works("us.mistral.medium")
        .delayed("us.anthropic.slow", 300)
        .delayed("us.meta.fast", 10)
        .delayed("us.mistral.medium", 100);
    let options = ProbeOptions::new().with_concurrency(3);
    let prober = Prober::new(runtime, options);

    let result = prober
        .probe(&ids(&["anthropic.slow", "meta.fast", "mistral.medium"]))
        .await;

    assert_eq!(
        result,
        ids(&["us.anthropic.slow", "us.meta.fast", "us.mistral.medium"])
    );
}

#[tokio::test]
async fn concurrency_zero_is_clamped_to_one() {
    let options = ProbeOptions::new().with_concurrency(0);
    assert_eq!(options.concurrency, 1);

    let runtime = ScriptedRuntime::new().works("us.anthropic.claude-x");
    let prober = Prober::new(runtime, options);
    assert_eq!(
        prober.probe(&ids(&["anthropic.claude-x"])).await,
        ids(&["us.anthropic.claude-x"])
    );
}

// ============================================================================
// Full Run
// ============================================================================

#[tokio::test]
async fn end_to_end_skips_embedding_and_finds_prefix() {
    let catalog = StaticCatalog {
        ids: Some(vec!["anthropic.claude-x", "amazon.titan-embed-x"]),
    };
    let runtime = ScriptedRuntime::new().works("us.anthropic.claude-x");
    let prober = Prober::new(runtime, ProbeOptions::new());

    let report = run(&catalog, &prober).await.expect("run succeeds");

    assert_eq!(report.models, ids(&["us.anthropic.claude-x"]));
    assert_eq!(report.catalog_count, 2);
    assert_eq!(report.tested_count, 2);
    assert_eq!(report.pinned_count, 0);
    assert_eq!(report.probed_count(), 1);
    assert_eq!(
        prober.runtime().called_ids(),
        ids(&["us.anthropic.claude-x"])
    );
}

#[tokio::test]
async fn run_reports_ignored_and_pinned_counts() {
    let catalog = StaticCatalog {
        ids: Some(vec!["anthropic.claude-x", "meta.llama-x", "cohere.command-r"]),
    };
    let runtime = ScriptedRuntime::new().works("us.anthropic.claude-x");
    let options = ProbeOptions::new()
        .with_ignore_prefixes(ids(&["meta."]))
        .with_pinned_first(ids(&["global.openai.gpt-oss", "global.openai.gpt-oss"]));
    let prober = Prober::new(runtime, options);

    let report = run(&catalog, &prober).await.expect("run succeeds");

    assert_eq!(report.catalog_count, 3);
    assert_eq!(report.tested_count, 2);
    assert_eq!(report.pinned_count, 1);
    assert_eq!(
        report.models,
        ids(&["global.openai.gpt-oss", "us.anthropic.claude-x"])
    );
}

#[tokio::test]
async fn catalog_failure_aborts_run() {
    let catalog = StaticCatalog { ids: None };
    let prober = Prober::new(ScriptedRuntime::new(), ProbeOptions::new());

    let err = run(&catalog, &prober).await.expect_err("catalog fails");

    assert_eq!(err.kind, ErrorKind::CatalogUnavailable);
    assert!(prober.runtime().calls().is_empty());
}

#[tokio::test]
async fn empty_catalog_yields_empty_list() {
    let catalog = StaticCatalog { ids: Some(vec![]) };
    let prober = Prober::new(ScriptedRuntime::new(), ProbeOptions::new());

    let report = run(&catalog, &prober).await.expect("run succeeds");

    assert!(report.models.is_empty());
}
