// ABOUTME: Loads the optional TOML config file and merges it with command-line flags
// ABOUTME: Command-line values win; the file supplies defaults for repeated runs
//
// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 dravr.ai

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bedrock_probe::config::{parse_csv_list, timeout_from_secs};
use bedrock_probe::types::ProbeError;
use bedrock_probe::{OutputFormat, ProbeOptions, Strictness, DEFAULT_ENV_KEY, DEFAULT_REGION};
use serde::Deserialize;
use tracing::debug;

use crate::Cli;

/// Directory name under the user config dir
const APP_DIR: &str = "bedrock-model-list";

/// Config file name inside [`APP_DIR`]
const CONFIG_FILE: &str = "config.toml";

/// Contents of `config.toml`; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub region: Option<String>,
    #[serde(default)]
    pub first: Vec<String>,
    #[serde(default)]
    pub ignore: Vec<String>,
    pub format: Option<OutputFormat>,
    pub env_key: Option<String>,
    pub loose: Option<bool>,
    pub concurrency: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub endpoint_url: Option<String>,
    pub profile: Option<String>,
}

/// Default config path: `$XDG_CONFIG_HOME/bedrock-model-list/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// Load a config file
///
/// An explicitly requested file must exist. The default location is
/// optional and a missing file yields an empty config.
pub fn load_file_config(path: &Path, explicit: bool) -> Result<FileConfig, ProbeError> {
    if !path.exists() {
        if explicit {
            return Err(ProbeError::config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        debug!(path = %path.display(), "No config file, using flags only");
        return Ok(FileConfig::default());
    }

    let content = fs::read_to_string(path).map_err(|e| {
        ProbeError::config(format!("Failed to read {}: {e}", path.display()))
    })?;
    let config: FileConfig = toml::from_str(&content).map_err(|e| {
        ProbeError::config(format!("Failed to parse {}: {e}", path.display()))
    })?;
    if let Some(secs) = config.timeout_secs {
        timeout_from_secs(secs)
            .map_err(|e| ProbeError::config(format!("{}: {}", path.display(), e.message)))?;
    }
    debug!(path = %path.display(), "Loaded config file");
    Ok(config)
}

/// Fully resolved run settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub region: String,
    pub options: ProbeOptions,
    pub format: OutputFormat,
    pub env_key: String,
    pub timeout: Option<Duration>,
    pub endpoint_url: Option<String>,
    pub profile: Option<String>,
}

impl Settings {
    /// Merge flags over file values over built-in defaults
    pub fn merge(cli: &Cli, file: FileConfig) -> Self {
        let first = cli
            .first
            .as_deref()
            .map_or(file.first, parse_csv_list);
        let ignore = cli
            .ignore
            .as_deref()
            .map_or(file.ignore, parse_csv_list);
        let loose = cli.loose || file.loose.unwrap_or(false);
        let strictness = if loose {
            Strictness::Lenient
        } else {
            Strictness::Strict
        };

        let options = ProbeOptions::new()
            .with_strictness(strictness)
            .with_ignore_prefixes(ignore)
            .with_pinned_first(first)
            .with_concurrency(cli.concurrency.or(file.concurrency).unwrap_or(1));

        Self {
            region: cli
                .region
                .clone()
                .or(file.region)
                .unwrap_or_else(|| DEFAULT_REGION.to_owned()),
            options,
            format: cli.format.or(file.format).unwrap_or_default(),
            env_key: cli
                .env_key
                .clone()
                .or(file.env_key)
                .unwrap_or_else(|| DEFAULT_ENV_KEY.to_owned()),
            timeout: cli.timeout.or(file.timeout_secs.map(Duration::from_secs)),
            endpoint_url: cli.endpoint_url.clone().or(file.endpoint_url),
            profile: cli.profile.clone().or(file.profile),
        }
    }
}
