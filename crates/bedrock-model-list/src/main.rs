// ABOUTME: CLI entry point for the bedrock-model-list binary
// ABOUTME: Parses flags, probes the Bedrock catalog, and prints the working model ids
//
// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 dravr.ai

mod settings;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use bedrock_probe::config::parse_timeout;
use bedrock_probe::output::write_models;
use bedrock_probe::types::ProbeError;
use bedrock_probe::{
    AwsCredentials, BedrockClient, ClientConfig, OutputFormat, Prober, SharedProfile,
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use settings::{default_config_path, load_file_config, Settings};

/// Generate `BEDROCK_AWS_MODELS` by testing which Bedrock model ids work
#[derive(Parser, Debug)]
#[command(name = "bedrock-model-list", version, about)]
pub struct Cli {
    /// Comma-separated model ids to place first, unprobed (e.g. `us.anthropic.claude-3-5-sonnet-20241022-v2:0`)
    #[arg(long)]
    pub first: Option<String>,

    /// Comma-separated model id prefixes to skip (e.g. `amazon.titan-embed,cohere.embed`)
    #[arg(long)]
    pub ignore: Option<String>,

    /// AWS region to list and test models in [default: us-west-2]
    #[arg(long)]
    pub region: Option<String>,

    /// Print per-model progress to stderr
    #[arg(long, short)]
    pub verbose: bool,

    /// Print every attempt and raw error to stderr
    #[arg(long)]
    pub debug: bool,

    /// Lenient mode: single-shot invocation and benefit of the doubt on ambiguous errors
    #[arg(long)]
    pub loose: bool,

    /// Output format: env, list, or yaml [default: env]
    #[arg(long, value_parser = parse_format)]
    pub format: Option<OutputFormat>,

    /// Variable name used by env and yaml output [default: `BEDROCK_AWS_MODELS`]
    #[arg(long)]
    pub env_key: Option<String>,

    /// Number of models probed at once [default: 1]
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Per-request timeout in seconds [default: 60]
    #[arg(long, value_parser = parse_timeout)]
    pub timeout: Option<Duration>,

    /// Override both Bedrock endpoints (VPC endpoint, local mock)
    #[arg(long)]
    pub endpoint_url: Option<String>,

    /// Profile in `~/.aws/credentials` [default: `$AWS_PROFILE`, then `default`]
    #[arg(long)]
    pub profile: Option<String>,

    /// TOML config file [default: `$XDG_CONFIG_HOME/bedrock-model-list/config.toml`]
    #[arg(long)]
    pub config: Option<PathBuf>,
}

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    s.parse()
}

/// Default log filter for the verbosity flags; `RUST_LOG` overrides it
fn log_filter(cli: &Cli) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if cli.debug {
            "debug"
        } else if cli.verbose {
            "info"
        } else {
            "warn"
        };
        EnvFilter::new(format!(
            "warn,bedrock_probe={level},bedrock_model_list={level}"
        ))
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr to keep stdout clean for the generated list
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(&cli))
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    match run_cli(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", failure_message(&e));
            ExitCode::FAILURE
        }
    }
}

/// One-line message printed for a fatal error
fn failure_message(err: &ProbeError) -> String {
    format!("bedrock-model-list: {err}")
}

async fn run_cli(cli: &Cli) -> Result<(), ProbeError> {
    let file_config = match (&cli.config, default_config_path()) {
        (Some(path), _) => load_file_config(path, true)?,
        (None, Some(path)) => load_file_config(&path, false)?,
        (None, None) => settings::FileConfig::default(),
    };
    let settings = Settings::merge(cli, file_config);

    tracing::info!(
        mode = %settings.options.strictness,
        region = %settings.region,
        ignore = ?settings.options.ignore_prefixes,
        first = ?settings.options.pinned_first,
        concurrency = settings.options.concurrency,
        "Starting Bedrock model probe"
    );

    let env = |key: &str| std::env::var(key).ok();
    let shared = SharedProfile::locate(
        env,
        dirs::home_dir().as_deref(),
        settings.profile.as_deref(),
    );
    let credentials = AwsCredentials::resolve(env, shared.as_ref())?;
    tracing::debug!(credentials = credentials.kind_label(), "Using AWS credentials");

    let mut client_config = ClientConfig::new(settings.region.clone(), credentials);
    if let Some(timeout) = settings.timeout {
        client_config = client_config.with_timeout(timeout);
    }
    if let Some(endpoint) = &settings.endpoint_url {
        client_config = client_config.with_endpoint(endpoint.clone());
    }

    let client = BedrockClient::new(client_config)?;
    tracing::debug!(region = client.region(), "Bedrock client ready");
    let prober = Prober::new(client, settings.options.clone());
    let report = bedrock_probe::run(prober.runtime(), &prober).await?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_models(&mut out, settings.format, &settings.env_key, &report.models)
        .and_then(|()| out.flush())
        .map_err(|e| ProbeError::internal(format!("Failed to write output: {e}")))
}
