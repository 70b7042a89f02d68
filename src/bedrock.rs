// ABOUTME: reqwest-based Amazon Bedrock client implementing ModelCatalog and ModelRuntime
// ABOUTME: Lists foundation models and issues signed invoke / invoke-with-response-stream calls
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 dravr.ai

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use tokio_stream::StreamExt;
use tracing::{debug, trace};
use url::Url;

use crate::auth::AwsCredentials;
use crate::classify::codes;
use crate::config::ClientConfig;
use crate::event_stream::{Decoder, StreamMessage};
use crate::sigv4::{self, aws_percent_encode, SigningKey};
use crate::types::{InvokeFailure, ModelCatalog, ModelRuntime, ModelSummary, ProbeError};

/// Header carrying the modeled error code on HTTP error responses
const ERROR_TYPE_HEADER: &str = "x-amzn-errortype";

/// Catalog listing response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListFoundationModelsResponse {
    #[serde(default)]
    model_summaries: Vec<ModelSummary>,
}

/// JSON error body returned by both endpoints
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(alias = "Message")]
    message: Option<String>,
    #[serde(rename = "__type")]
    error_type: Option<String>,
}

/// Amazon Bedrock client
///
/// Talks to the control-plane endpoint for the model catalog and to the
/// runtime endpoint for invocations. Every request is either SigV4-signed
/// or carries a bearer API key, depending on [`AwsCredentials`].
pub struct BedrockClient {
    http: Client,
    config: ClientConfig,
}

impl BedrockClient {
    /// Create a client from its configuration
    ///
    /// # Errors
    ///
    /// Returns an internal error if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ProbeError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProbeError::internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    /// Region requests are sent to
    #[must_use]
    pub fn region(&self) -> &str {
        &self.config.region
    }

    fn catalog_url(&self) -> Result<Url, ProbeError> {
        let base = self.config.control_base_url();
        Url::parse(&format!("{}/foundation-models", base.trim_end_matches('/')))
            .map_err(|e| ProbeError::config(format!("Invalid control endpoint {base}: {e}")))
    }

    /// Model ids contain `:` and must be percent-encoded into one path segment
    fn invoke_url(&self, model_id: &str, action: &str) -> Result<Url, ProbeError> {
        let base = self.config.runtime_base_url();
        Url::parse(&format!(
            "{}/model/{}/{action}",
            base.trim_end_matches('/'),
            aws_percent_encode(model_id)
        ))
        .map_err(|e| ProbeError::config(format!("Invalid runtime endpoint {base}: {e}")))
    }

    /// Build an authorized request
    fn request(
        &self,
        method: Method,
        url: Url,
        body: &[u8],
        accept: &str,
    ) -> Result<RequestBuilder, ProbeError> {
        let mut builder = self
            .http
            .request(method.clone(), url.clone())
            .header("content-type", "application/json")
            .header("accept", accept);

        match &self.config.credentials {
            AwsCredentials::Bearer { token } => {
                builder = builder.bearer_auth(token);
            }
            AwsCredentials::Sigv4 {
                access_key_id,
                secret_access_key,
                session_token,
            } => {
                let key = SigningKey {
                    access_key_id,
                    secret_access_key,
                    session_token: session_token.as_deref(),
                    region: &self.config.region,
                };
                let signed = sigv4::sign(method.as_str(), &url, body, &key, Utc::now())?;
                for (name, value) in signed.pairs() {
                    builder = builder.header(name, value);
                }
            }
        }

        if !body.is_empty() {
            builder = builder.body(body.to_vec());
        }
        Ok(builder)
    }

    async fn send_invoke(
        &self,
        model_id: &str,
        action: &str,
        accept: &str,
        body: &[u8],
    ) -> Result<reqwest::Response, InvokeFailure> {
        let url = self
            .invoke_url(model_id, action)
            .map_err(|e| InvokeFailure::transport(e.message))?;
        let request = self
            .request(Method::POST, url, body, accept)
            .map_err(|e| InvokeFailure::transport(e.message))?;

        let response = request
            .send()
            .await
            .map_err(|e| InvokeFailure::transport(format!("{action} request failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let headers = response.headers().clone();
        let text = response.text().await.unwrap_or_default();
        Err(service_failure(status, &headers, &text))
    }
}

#[async_trait]
impl ModelCatalog for BedrockClient {
    async fn list_models(&self) -> Result<Vec<ModelSummary>, ProbeError> {
        let url = self.catalog_url()?;
        debug!(url = %url, "Listing foundation models");

        let response = self
            .request(Method::GET, url, b"", "application/json")?
            .send()
            .await
            .map_err(|e| ProbeError::catalog_unavailable(format!("Catalog request failed: {e}")))?;

        let status = response.status();
        let headers = response.headers().clone();
        let text = response.text().await.map_err(|e| {
            ProbeError::catalog_unavailable(format!("Failed to read catalog response: {e}"))
        })?;

        if !status.is_success() {
            let failure = service_failure(status, &headers, &text);
            return Err(ProbeError::catalog_unavailable(format!(
                "Catalog listing failed (HTTP {status}): {failure}"
            )));
        }

        let parsed: ListFoundationModelsResponse = serde_json::from_str(&text).map_err(|e| {
            ProbeError::catalog_unavailable(format!("Failed to parse catalog response: {e}"))
        })?;

        debug!(count = parsed.model_summaries.len(), "Catalog listed");
        Ok(parsed.model_summaries)
    }
}

#[async_trait]
impl ModelRuntime for BedrockClient {
    async fn invoke(&self, model_id: &str, body: &[u8]) -> Result<(), InvokeFailure> {
        let response = self
            .send_invoke(model_id, "invoke", "application/json", body)
            .await?;
        trace!(model_id, status = %response.status(), "Invocation succeeded");
        Ok(())
    }

    async fn invoke_stream(&self, model_id: &str, body: &[u8]) -> Result<(), InvokeFailure> {
        let response = self
            .send_invoke(
                model_id,
                "invoke-with-response-stream",
                "application/vnd.amazon.eventstream",
                body,
            )
            .await?;

        let mut decoder = Decoder::new();
        let mut chunks = response.bytes_stream();

        while let Some(chunk) = chunks.next().await {
            let bytes = chunk
                .map_err(|e| InvokeFailure::transport(format!("Error reading stream: {e}")))?;
            decoder.push(&bytes);

            if let Some(message) = decoder
                .next_message()
                .map_err(|e| InvokeFailure::transport(e.message))?
            {
                return match message.classify() {
                    StreamMessage::Event { event_type } => {
                        trace!(model_id, event_type = %event_type, "First stream event received");
                        Ok(())
                    }
                    StreamMessage::Exception { code, message }
                    | StreamMessage::Error { code, message } => {
                        Err(InvokeFailure::Service { code, message })
                    }
                };
            }
        }

        // Stream closed before a full frame; the call itself was accepted
        trace!(model_id, "Stream ended without events");
        Ok(())
    }
}

/// Turn an HTTP error response into a structured service failure
///
/// Code precedence: `x-amzn-ErrorType` header, body `__type`, HTTP status.
pub(crate) fn service_failure(status: StatusCode, headers: &HeaderMap, text: &str) -> InvokeFailure {
    let body: ErrorBody = serde_json::from_str(text).unwrap_or_default();

    let code = headers
        .get(ERROR_TYPE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(error_code_from_header)
        .or_else(|| body.error_type.as_deref().map(error_code_from_type))
        .filter(|c| !c.is_empty())
        .or_else(|| code_for_status(status).map(ToOwned::to_owned))
        .unwrap_or_else(|| format!("Http{}", status.as_u16()));

    let message = body
        .message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| text.trim().to_owned());

    InvokeFailure::Service { code, message }
}

/// `ValidationException:http://internal.amazon.com/coral/...` → `ValidationException`
fn error_code_from_header(value: &str) -> String {
    value.split(':').next().unwrap_or_default().trim().to_owned()
}

/// `com.amazon.bedrock#ValidationException` → `ValidationException`
fn error_code_from_type(value: &str) -> String {
    value
        .rsplit('#')
        .next()
        .map(error_code_from_header)
        .unwrap_or_default()
}

const fn code_for_status(status: StatusCode) -> Option<&'static str> {
    match status.as_u16() {
        400 => Some(codes::VALIDATION),
        403 => Some(codes::ACCESS_DENIED),
        404 => Some(codes::RESOURCE_NOT_FOUND),
        429 => Some(codes::THROTTLING),
        _ => None,
    }
}
