// ABOUTME: Decoder for the binary event-stream framing of Bedrock streaming responses
// ABOUTME: Splits prelude/headers/payload, verifies CRC32s, and classifies event vs exception frames
//
// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 dravr.ai

//! # Event Stream Framing
//!
//! `invoke-with-response-stream` answers with `application/vnd.amazon.eventstream`:
//!
//! ```text
//! [total_len u32][headers_len u32][prelude_crc u32][headers][payload][message_crc u32]
//! ```
//!
//! All integers are big-endian. The prober only needs the first frame, so
//! this decoder is incremental: feed bytes as they arrive and ask for the
//! next complete message.

use serde::Deserialize;

use crate::classify::normalize_code;
use crate::types::ProbeError;

/// Prelude: total length, headers length, prelude CRC
const PRELUDE_LEN: usize = 12;

/// Trailing message CRC
const TRAILER_LEN: usize = 4;

/// Upper bound on a single frame (16 MiB)
const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// Header value type tags
const TYPE_BOOL_TRUE: u8 = 0;
const TYPE_BOOL_FALSE: u8 = 1;
const TYPE_BYTE: u8 = 2;
const TYPE_SHORT: u8 = 3;
const TYPE_INT: u8 = 4;
const TYPE_LONG: u8 = 5;
const TYPE_BYTES: u8 = 6;
const TYPE_STRING: u8 = 7;
const TYPE_TIMESTAMP: u8 = 8;
const TYPE_UUID: u8 = 9;

/// One decoded frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// String-valued headers in wire order; other header types are skipped
    pub headers: Vec<(String, String)>,
    /// Raw payload bytes
    pub payload: Vec<u8>,
}

/// What a frame means to the prober
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamMessage {
    /// A regular event such as `chunk`
    Event {
        /// Value of `:event-type`
        event_type: String,
    },
    /// A modeled exception raised mid-stream
    Exception {
        /// Service error code, normalised to PascalCase
        code: String,
        /// Message from the JSON payload
        message: String,
    },
    /// An unmodeled error frame
    Error {
        /// Value of `:error-code`
        code: String,
        /// Value of `:error-message`
        message: String,
    },
}

#[derive(Deserialize)]
struct ExceptionPayload {
    #[serde(alias = "Message")]
    message: Option<String>,
}

impl Message {
    /// Look up a string header by name
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Interpret the frame using its `:message-type` header
    #[must_use]
    pub fn classify(&self) -> StreamMessage {
        match self.header(":message-type") {
            Some("exception") => {
                let message = serde_json::from_slice::<ExceptionPayload>(&self.payload)
                    .ok()
                    .and_then(|p| p.message)
                    .unwrap_or_else(|| String::from_utf8_lossy(&self.payload).into_owned());
                StreamMessage::Exception {
                    code: normalize_code(self.header(":exception-type").unwrap_or_default()),
                    message,
                }
            }
            Some("error") => StreamMessage::Error {
                code: self.header(":error-code").unwrap_or_default().to_owned(),
                message: self.header(":error-message").unwrap_or_default().to_owned(),
            },
            _ => StreamMessage::Event {
                event_type: self.header(":event-type").unwrap_or_default().to_owned(),
            },
        }
    }
}

/// Incremental frame decoder
#[derive(Debug, Default)]
pub struct Decoder {
    buffer: Vec<u8>,
}

impl Decoder {
    /// Create an empty decoder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append received bytes
    pub fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Decode the next complete frame, if one is buffered
    ///
    /// # Errors
    ///
    /// Returns an error for impossible lengths, CRC mismatches, or truncated
    /// headers. The decoder should be discarded after an error.
    pub fn next_message(&mut self) -> Result<Option<Message>, ProbeError> {
        if self.buffer.len() < PRELUDE_LEN {
            return Ok(None);
        }

        let total_len = read_u32(&self.buffer, 0) as usize;
        let headers_len = read_u32(&self.buffer, 4) as usize;
        let prelude_crc = read_u32(&self.buffer, 8);

        if crc32fast::hash(&self.buffer[..8]) != prelude_crc {
            return Err(ProbeError::internal("Event stream prelude CRC mismatch"));
        }
        if total_len < PRELUDE_LEN + TRAILER_LEN + headers_len || total_len > MAX_FRAME_LEN {
            return Err(ProbeError::internal(format!(
                "Invalid event stream frame length {total_len} (headers {headers_len})"
            )));
        }
        if self.buffer.len() < total_len {
            return Ok(None);
        }

        let frame: Vec<u8> = self.buffer.drain(..total_len).collect();
        let body_end = total_len - TRAILER_LEN;
        let message_crc = read_u32(&frame, body_end);
        if crc32fast::hash(&frame[..body_end]) != message_crc {
            return Err(ProbeError::internal("Event stream message CRC mismatch"));
        }

        let headers_end = PRELUDE_LEN + headers_len;
        let headers = parse_headers(&frame[PRELUDE_LEN..headers_end])?;
        let payload = frame[headers_end..body_end].to_vec();

        Ok(Some(Message { headers, payload }))
    }
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn parse_headers(mut bytes: &[u8]) -> Result<Vec<(String, String)>, ProbeError> {
    let truncated = || ProbeError::internal("Truncated event stream header");
    let mut headers = Vec::new();

    while !bytes.is_empty() {
        let name_len = usize::from(bytes[0]);
        let name_end = 1 + name_len;
        if bytes.len() < name_end + 1 {
            return Err(truncated());
        }
        let name = String::from_utf8_lossy(&bytes[1..name_end]).into_owned();
        let value_type = bytes[name_end];
        bytes = &bytes[name_end + 1..];

        let fixed_len = match value_type {
            TYPE_BOOL_TRUE | TYPE_BOOL_FALSE => Some(0),
            TYPE_BYTE => Some(1),
            TYPE_SHORT => Some(2),
            TYPE_INT => Some(4),
            TYPE_LONG | TYPE_TIMESTAMP => Some(8),
            TYPE_UUID => Some(16),
            TYPE_BYTES | TYPE_STRING => None,
            other => {
                return Err(ProbeError::internal(format!(
                    "Unknown event stream header type {other}"
                )))
            }
        };

        if let Some(len) = fixed_len {
            if bytes.len() < len {
                return Err(truncated());
            }
            bytes = &bytes[len..];
            continue;
        }

        if bytes.len() < 2 {
            return Err(truncated());
        }
        let value_len = usize::from(u16::from_be_bytes([bytes[0], bytes[1]]));
        if bytes.len() < 2 + value_len {
            return Err(truncated());
        }
        if value_type == TYPE_STRING {
            let value = String::from_utf8_lossy(&bytes[2..2 + value_len]).into_owned();
            headers.push((name, value));
        }
        bytes = &bytes[2 + value_len..];
    }

    Ok(headers)
}

/// Encode a frame with string headers
///
/// Used to build fixtures for the decoder and for mocked streaming endpoints.
#[must_use]
pub fn encode_frame(headers: &[(&str, &str)], payload: &[u8]) -> Vec<u8> {
    let mut header_bytes = Vec::new();
    for (name, value) in headers {
        header_bytes.push(name.len() as u8);
        header_bytes.extend_from_slice(name.as_bytes());
        header_bytes.push(TYPE_STRING);
        header_bytes.extend_from_slice(&(value.len() as u16).to_be_bytes());
        header_bytes.extend_from_slice(value.as_bytes());
    }

    let total_len = PRELUDE_LEN + header_bytes.len() + payload.len() + TRAILER_LEN;
    let mut frame = Vec::with_capacity(total_len);
    frame.extend_from_slice(&(total_len as u32).to_be_bytes());
    frame.extend_from_slice(&(header_bytes.len() as u32).to_be_bytes());
    let prelude_crc = crc32fast::hash(&frame);
    frame.extend_from_slice(&prelude_crc.to_be_bytes());
    frame.extend_from_slice(&header_bytes);
    frame.extend_from_slice(payload);
    let message_crc = crc32fast::hash(&frame);
    frame.extend_from_slice(&message_crc.to_be_bytes());
    frame
}
