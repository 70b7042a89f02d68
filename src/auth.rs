// ABOUTME: AWS credential resolution for the Bedrock client
// ABOUTME: Builds SigV4 or bearer credentials from an explicit key lookup and the shared credentials file
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 dravr.ai

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::types::ProbeError;

/// Bedrock API key (bearer token)
pub const BEARER_TOKEN_KEY: &str = "AWS_BEARER_TOKEN_BEDROCK";
/// Access key id for SigV4 signing
pub const ACCESS_KEY_ID_KEY: &str = "AWS_ACCESS_KEY_ID";
/// Secret access key for SigV4 signing
pub const SECRET_ACCESS_KEY_KEY: &str = "AWS_SECRET_ACCESS_KEY";
/// Optional session token for temporary credentials
pub const SESSION_TOKEN_KEY: &str = "AWS_SESSION_TOKEN";
/// Profile to read from the shared credentials file
pub const PROFILE_KEY: &str = "AWS_PROFILE";
/// Override for the shared credentials file location
pub const SHARED_CREDENTIALS_FILE_KEY: &str = "AWS_SHARED_CREDENTIALS_FILE";
/// Profile used when none is named
pub const DEFAULT_PROFILE: &str = "default";

/// Credentials used to authorize Bedrock requests
#[derive(Clone, PartialEq, Eq)]
pub enum AwsCredentials {
    /// Access key pair, signed with AWS Signature Version 4
    Sigv4 {
        /// Access key id
        access_key_id: String,
        /// Secret access key
        secret_access_key: String,
        /// Session token for temporary credentials
        session_token: Option<String>,
    },
    /// Bedrock API key sent as `Authorization: Bearer`
    Bearer {
        /// API key
        token: String,
    },
}


impl AwsCredentials {
    /// Resolve credentials through a key lookup only
    ///
    /// Equivalent to [`AwsCredentials::resolve`] without a shared credentials file.
    ///
    /// # Errors
    ///
    /// Returns an `AuthFailure` error when neither form is complete.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ProbeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::resolve(lookup, None)
    }

    /// Resolve credentials
    ///
    /// Resolution order:
    /// 1. `AWS_BEARER_TOKEN_BEDROCK`
    /// 2. `AWS_ACCESS_KEY_ID` + `AWS_SECRET_ACCESS_KEY` (+ `AWS_SESSION_TOKEN`)
    /// 3. the profile in the shared credentials file, when one is given
    ///
    /// The caller decides where keys and files come from; the binary passes
    /// the process environment and `~/.aws/credentials`, tests pass a map and
    /// a temp file.
    ///
    /// # Errors
    ///
    /// Returns an `AuthFailure` error when no source yields complete
    /// credentials, or when a named profile is missing or incomplete.
    pub fn resolve<F>(lookup: F, shared: Option<&SharedProfile>) -> Result<Self, ProbeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(credentials) = Self::from_env(&lookup)? {
            return Ok(credentials);
        }
        if let Some(credentials) = shared.map(Self::from_profile).transpose()?.flatten() {
            return Ok(credentials);
        }
        Err(ProbeError::auth_failure(format!(
            "Amazon Bedrock requires AWS credentials. Set {ACCESS_KEY_ID_KEY}/{SECRET_ACCESS_KEY_KEY}, {BEARER_TOKEN_KEY}, or a profile in ~/.aws/credentials"
        )))
    }

    fn from_env<F>(lookup: &F) -> Result<Option<Self>, ProbeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| non_blank(lookup(key));

        if let Some(token) = get(BEARER_TOKEN_KEY) {
            debug!(source = BEARER_TOKEN_KEY, "Resolved Bedrock bearer token");
            return Ok(Some(Self::Bearer { token }));
        }

        match (get(ACCESS_KEY_ID_KEY), get(SECRET_ACCESS_KEY_KEY)) {
            (Some(access_key_id), Some(secret_access_key)) => {
                let session_token = get(SESSION_TOKEN_KEY);
                debug!(
                    has_session_token = session_token.is_some(),
                    "Resolved SigV4 access key credentials"
                );
                Ok(Some(Self::Sigv4 {
                    access_key_id,
                    secret_access_key,
                    session_token,
                }))
            }
            (Some(_), None) => Err(ProbeError::auth_failure(format!(
                "{ACCESS_KEY_ID_KEY} is set but {SECRET_ACCESS_KEY_KEY} is missing"
            ))),
            _ => Ok(None),
        }
    }

    /// Read a profile from the shared credentials file
    ///
    /// A missing file or a missing `default` profile yields `Ok(None)`; a
    /// profile the caller named explicitly must exist.
    ///
    /// # Errors
    ///
    /// Returns an `AuthFailure` error when the file cannot be read, a named
    /// profile is absent, or the profile lacks a key pair.
    pub fn from_profile(shared: &SharedProfile) -> Result<Option<Self>, ProbeError> {
        let path = shared.path.display();
        let content = match fs::read_to_string(&shared.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound && !shared.explicit => {
                debug!(path = %path, "No shared credentials file");
                return Ok(None);
            }
            Err(e) => {
                return Err(ProbeError::auth_failure(format!(
                    "Failed to read shared credentials file {path}: {e}"
                )))
            }
        };

        let Some(mut section) = profile_section(&content, &shared.profile) else {
            if shared.explicit {
                return Err(ProbeError::auth_failure(format!(
                    "Profile {} not found in {path}",
                    shared.profile
                )));
            }
            debug!(path = %path, profile = %shared.profile, "Profile not in shared credentials file");
            return Ok(None);
        };

        let mut take = |key: &str| non_blank(section.remove(key));
        match (take("aws_access_key_id"), take("aws_secret_access_key")) {
            (Some(access_key_id), Some(secret_access_key)) => {
                let session_token = take("aws_session_token");
                debug!(
                    path = %path,
                    profile = %shared.profile,
                    has_session_token = session_token.is_some(),
                    "Resolved SigV4 credentials from shared credentials file"
                );
                Ok(Some(Self::Sigv4 {
                    access_key_id,
                    secret_access_key,
                    session_token,
                }))
            }
            _ => Err(ProbeError::auth_failure(format!(
                "Profile {} in {path} needs aws_access_key_id and aws_secret_access_key",
                shared.profile
            ))),
        }
    }

    /// Short label for diagnostics
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::Sigv4 { .. } => "sigv4",
            Self::Bearer { .. } => "bearer",
        }
    }
}

/// Location of the shared credentials file and the profile to read from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedProfile {
    /// Path of the credentials file
    pub path: PathBuf,
    /// Section name inside the file
    pub profile: String,
    /// Whether the profile was named by the caller rather than defaulted
    pub explicit: bool,
}

impl SharedProfile {
    /// Point at a profile in a specific file
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, profile: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            profile: profile.into(),
            explicit: true,
        }
    }

    /// Locate the shared credentials file and profile
    ///
    /// Path: `AWS_SHARED_CREDENTIALS_FILE`, else `<home>/.aws/credentials`.
    /// Profile: `profile_override`, else `AWS_PROFILE`, else `default`.
    /// Returns `None` when no path can be determined.
    pub fn locate<F>(lookup: F, home: Option<&Path>, profile_override: Option<&str>) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = non_blank(lookup(SHARED_CREDENTIALS_FILE_KEY))
            .map(PathBuf::from)
            .or_else(|| home.map(|dir| dir.join(".aws").join("credentials")))?;
        let named = non_blank(profile_override.map(ToOwned::to_owned))
            .or_else(|| non_blank(lookup(PROFILE_KEY)));

        Some(Self {
            path,
            explicit: named.is_some(),
            profile: named.unwrap_or_else(|| DEFAULT_PROFILE.to_owned()),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

/// Keys of one `[profile]` section, lower-cased; `None` if the section is absent
fn profile_section(content: &str, profile: &str) -> Option<HashMap<String, String>> {
    let mut current: Option<&str> = None;
    let mut section: Option<HashMap<String, String>> = None;

    for line in content.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            current = Some(name.trim());
            if current == Some(profile) {
                section.get_or_insert_with(HashMap::new);
            }
            continue;
        }
        if current != Some(profile) {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            section
                .get_or_insert_with(HashMap::new)
                .insert(key.trim().to_lowercase(), value.trim().to_owned());
        }
    }

    section
}

// Secrets never reach logs
impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sigv4 {
                access_key_id,
                session_token,
                ..
            } => f
                .debug_struct("Sigv4")
                .field("access_key_id", access_key_id)
                .field("secret_access_key", &"<redacted>")
                .field("session_token", &session_token.as_ref().map(|_| "<redacted>"))
                .finish(),
            Self::Bearer { .. } => f
                .debug_struct("Bearer")
                .field("token", &"<redacted>")
                .finish(),
        }
    }
}
