// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;

use crate::config::consts::MIN_THREAD_COUNT;
use crate::config::StageMetadata;
use crate::errors::ConfigError;
use crate::registry::StageKind;

/// Configuration for one task: a producer, ordered transforms and one or more consumers.
///
/// Immutable once a [`Task`](crate::engine::Task) has been built from it.
///
/// # Example
/// ```yaml
/// - description: "orders to log"
///   thread_count: 4
///   producer:
///     type: file
///     metadata:
///       path: /var/data/orders.jsonl
///   transforms:
///     - type: json
///     - type: sequence_id
///       metadata:
///         key: seq
///   consumers:
///     - type: log
/// ```
///
/// The older field names `desc`, `threads`, `source`, `filters`, `sinks` and
/// `sink` are accepted as aliases, and `consumers` may be a single stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskConfig {
    #[serde(default, alias = "desc")]
    pub description: String,
    /// Worker pool size. Values below one run a single worker.
    #[serde(default, alias = "threads")]
    pub thread_count: i64,
    #[serde(alias = "source")]
    pub producer: StageSpec,
    #[serde(default, alias = "filters")]
    pub transforms: Vec<StageSpec>,
    #[serde(
        default,
        alias = "sinks",
        alias = "sink",
        deserialize_with = "one_or_many"
    )]
    pub consumers: Vec<StageSpec>,
}

impl TaskConfig {
    pub fn normalized_thread_count(&self) -> usize {
        self.thread_count.max(MIN_THREAD_COUNT as i64) as usize
    }

    /// Static checks that need no registry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.consumers.is_empty() {
            return Err(ConfigError::NoConsumers {
                task: self.description.clone(),
            });
        }

        let stages = std::iter::once((StageKind::Producer, &self.producer))
            .chain(self.transforms.iter().map(|s| (StageKind::Transform, s)))
            .chain(self.consumers.iter().map(|s| (StageKind::Consumer, s)));

        for (kind, spec) in stages {
            if spec.type_name.trim().is_empty() {
                return Err(ConfigError::EmptyTypeName {
                    task: self.description.clone(),
                    kind,
                });
            }
        }

        Ok(())
    }
}

/// Selects an adapter by type name and hands it an opaque metadata bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSpec {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub metadata: StageMetadata,
}

impl StageSpec {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            metadata: StageMetadata::new(),
        }
    }

    pub fn with_metadata(type_name: impl Into<String>, metadata: StageMetadata) -> Self {
        Self {
            type_name: type_name.into(),
            metadata,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(StageSpec),
    Many(Vec<StageSpec>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<StageSpec>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(spec) => vec![spec],
        OneOrMany::Many(specs) => specs,
    })
}

#[derive(Deserialize)]
struct TomlTasks {
    #[serde(default)]
    tasks: Vec<TaskConfig>,
}

pub fn parse_yaml(content: &str) -> Result<Vec<TaskConfig>, ConfigError> {
    Ok(serde_yaml::from_str(content)?)
}

pub fn parse_json(content: &str) -> Result<Vec<TaskConfig>, ConfigError> {
    Ok(serde_json::from_str(content)?)
}

/// TOML has no top-level arrays, so tasks live under `[[tasks]]`.
pub fn parse_toml(content: &str) -> Result<Vec<TaskConfig>, ConfigError> {
    let parsed: TomlTasks = toml::from_str(content)?;
    Ok(parsed.tasks)
}

/// Load task definitions from a file, choosing the format by extension.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Vec<TaskConfig>, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("yaml") | Some("yml") => parse_yaml(&content),
        Some("json") => parse_json(&content),
        Some("toml") => parse_toml(&content),
        _ => Err(ConfigError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Load task definitions and run [`TaskConfig::validate`] on each.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Vec<TaskConfig>, ConfigError> {
    let tasks = load_config(path)?;
    for task in &tasks {
        task.validate()?;
    }
    Ok(tasks)
}
