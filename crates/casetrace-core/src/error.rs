// SPDX-FileCopyrightText: 2026 Casetrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Casetrace client data layer.

use thiserror::Error;

/// The primary error type used across the Casetrace gateway traits and stores.
#[derive(Debug, Error)]
pub enum CasetraceError {
    /// Configuration errors (invalid TOML, missing required fields, bad URLs).
    #[error("configuration error: {0}")]
    Config(String),

    /// Gateway transport errors (HTTP failure, bad response body, server error).
    #[error("gateway error: {message}")]
    Gateway {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Authentication failures. The message is the gateway's own error text
    /// and is surfaced to callers verbatim.
    #[error("{0}")]
    Auth(String),

    /// An operation that requires a signed-in user was called without one.
    #[error("User not authenticated")]
    NotAuthenticated,

    /// The requested record does not exist on the gateway.
    #[error("record not found: {0}")]
    NotFound(String),

    /// A field value fell outside its permitted range.
    #[error("invalid field value: {0}")]
    InvalidField(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
