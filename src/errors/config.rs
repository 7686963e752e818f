// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;

use thiserror::Error;

use crate::errors::StageError;
use crate::registry::StageKind;

/// Errors detected while loading task configuration or constructing a task.
///
/// Every variant is raised before any worker starts. A running task never
/// produces a `ConfigError`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unsupported config file extension for '{path}' (expected yaml, yml, json or toml)")]
    UnsupportedFormat { path: PathBuf },

    #[error("task '{task}' has no consumers configured")]
    NoConsumers { task: String },

    #[error("task '{task}' has a {kind} with an empty type name")]
    EmptyTypeName { task: String, kind: StageKind },

    /// A producer or consumer type name has no registered constructor.
    #[error("task '{task}': no {kind} registered under type '{type_name}'")]
    UnknownStage {
        task: String,
        kind: StageKind,
        type_name: String,
    },

    /// A producer or consumer constructor rejected its spec.
    #[error("task '{task}': failed to construct {kind} '{type_name}': {source}")]
    StageConstruction {
        task: String,
        kind: StageKind,
        type_name: String,
        #[source]
        source: StageError,
    },
}
