// ABOUTME: Serializes the working model list as an env assignment, a plain list, or YAML
// ABOUTME: Output is written to any io::Write so the binary can target stdout
//
// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 dravr.ai

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Key used for env and YAML output unless overridden
pub const DEFAULT_ENV_KEY: &str = "BEDROCK_AWS_MODELS";

/// Output serialization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `KEY=a,b,c`
    #[default]
    Env,
    /// One id per line
    List,
    /// `KEY:` followed by `  - id` lines
    Yaml,
}

impl OutputFormat {
    /// All formats, in help-text order
    pub const ALL: &'static [Self] = &[Self::Env, Self::List, Self::Yaml];

    /// Name used on the command line and in config files
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Env => "env",
            Self::List => "list",
            Self::Yaml => "yaml",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "env" => Ok(Self::Env),
            "list" => Ok(Self::List),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(format!("Unknown format: {other}. Valid: env, list, yaml")),
        }
    }
}

/// Write `models` in the requested format
///
/// # Errors
///
/// Propagates I/O errors from the writer.
pub fn write_models<W: Write>(
    out: &mut W,
    format: OutputFormat,
    env_key: &str,
    models: &[String],
) -> io::Result<()> {
    match format {
        OutputFormat::Env => writeln!(out, "{env_key}={}", models.join(",")),
        OutputFormat::List => {
            for model in models {
                writeln!(out, "{model}")?;
            }
            Ok(())
        }
        OutputFormat::Yaml => {
            writeln!(out, "{env_key}:")?;
            for model in models {
                writeln!(out, "  - {model}")?;
            }
            Ok(())
        }
    }
}

/// Render `models` to a string
#[must_use]
pub fn render(format: OutputFormat, env_key: &str, models: &[String]) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail
    let _ = write_models(&mut buf, format, env_key, models);
    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn models() -> Vec<String> {
        vec![
            "us.anthropic.claude-x".to_owned(),
            "meta.llama3-70b-instruct-v1:0".to_owned(),
        ]
    }

    #[test]
    fn env_format_joins_with_commas() {
        assert_eq!(
            render(OutputFormat::Env, DEFAULT_ENV_KEY, &models()),
            "BEDROCK_AWS_MODELS=us.anthropic.claude-x,meta.llama3-70b-instruct-v1:0\n"
        );
    }

    #[test]
    fn env_format_with_no_models() {
        assert_eq!(
            render(OutputFormat::Env, DEFAULT_ENV_KEY, &[]),
            "BEDROCK_AWS_MODELS=\n"
        );
    }

    #[test]
    fn list_format_one_per_line() {
        assert_eq!(
            render(OutputFormat::List, DEFAULT_ENV_KEY, &models()),
            "us.anthropic.claude-x\nmeta.llama3-70b-instruct-v1:0\n"
        );
        assert_eq!(render(OutputFormat::List, DEFAULT_ENV_KEY, &[]), "");
    }

    #[test]
    fn yaml_format_indents_items() {
        assert_eq!(
            render(OutputFormat::Yaml, "MODELS", &models()),
            "MODELS:\n  - us.anthropic.claude-x\n  - meta.llama3-70b-instruct-v1:0\n"
        );
    }

    #[test]
    fn parse_formats() {
        assert_eq!("env".parse::<OutputFormat>(), Ok(OutputFormat::Env));
        assert_eq!("LIST".parse::<OutputFormat>(), Ok(OutputFormat::List));
        assert_eq!("yml".parse::<OutputFormat>(), Ok(OutputFormat::Yaml));
        assert!("json".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn display_round_trips_names() {
        for format in OutputFormat::ALL {
            assert_eq!(format.as_str().parse::<OutputFormat>(), Ok(*format));
        }
    }
}
