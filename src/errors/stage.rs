// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised by stage constructors and per-record stage calls.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StageError {
    #[error("missing required metadata '{key}'")]
    MissingMetadata { key: String },

    #[error("invalid metadata '{key}': {reason}")]
    InvalidMetadata { key: String, reason: String },

    /// The record payload is not the shape this stage operates on.
    #[error("unexpected payload: expected {expected}, found {found}")]
    PayloadShape {
        expected: &'static str,
        found: &'static str,
    },

    #[error("payload has no field '{field}'")]
    MissingField { field: String },

    #[error("shared resource '{name}' has not been initialized")]
    SharedResourceMissing { name: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
