// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for per-record stage events, stage failures and construction fallbacks.

use crate::record::Record;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A stage call returned an error for one record. Processing continues.
///
/// # Log Level
/// `error!`
///
/// # Example
/// ```
/// use the_conveyor::observability::messages::stage::StageFailed;
/// use the_conveyor::record::Record;
///
/// let record = Record::new(b"{oops".to_vec());
/// let error = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad json");
/// let msg = StageFailed {
///     stage: "transform[0]:json",
///     record: &record,
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct StageFailed<'a> {
    pub stage: &'a str,
    pub record: &'a Record,
    pub error: &'a dyn std::error::Error,
}

impl Display for StageFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Stage '{}' failed: {}", self.stage, self.error)
    }
}

impl StructuredLog for StageFailed<'_> {
    fn log(&self) {
        tracing::error!(
            tag = self.stage,
            error = %self.error,
            record = %self.record.to_json(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "stage_failed",
            span_name = name,
            tag = self.stage,
            error = %self.error,
        )
    }
}

/// A stage call panicked for one record; the fault barrier kept the worker alive.
///
/// # Log Level
/// `error!`
pub struct StagePanicked<'a> {
    pub stage: &'a str,
    pub record: &'a Record,
    pub message: &'a str,
}

impl Display for StagePanicked<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Stage '{}' panicked: {}", self.stage, self.message)
    }
}

impl StructuredLog for StagePanicked<'_> {
    fn log(&self) {
        tracing::error!(
            tag = self.stage,
            panic = self.message,
            record = %self.record.to_json(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("stage_panicked", span_name = name, tag = self.stage)
    }
}

/// A transform could not be built and was left out of the pipeline.
///
/// # Log Level
/// `warn!` - The task runs with a degraded but valid pipeline
pub struct TransformSkipped<'a> {
    pub task: &'a str,
    pub type_name: &'a str,
    pub reason: &'a str,
}

impl Display for TransformSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Task '{}' skipping transform '{}': {}",
            self.task, self.type_name, self.reason
        )
    }
}

impl StructuredLog for TransformSkipped<'_> {
    fn log(&self) {
        tracing::warn!(
            task = self.task,
            stage_type = self.type_name,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "transform_skipped",
            span_name = name,
            task = self.task,
            stage_type = self.type_name,
        )
    }
}

/// Background work owned by a stage (a producer's reader, a consumer's final
/// flush) ended with an error.
///
/// # Log Level
/// `error!` - A producer closes its channel early; a consumer may lose buffered output
pub struct BackgroundFailed<'a> {
    pub stage: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for BackgroundFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Stage '{}' background work failed: {}", self.stage, self.error)
    }
}

impl StructuredLog for BackgroundFailed<'_> {
    fn log(&self) {
        tracing::error!(tag = self.stage, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("background_failed", span_name = name, tag = self.stage)
    }
}

/// A record reached the `log` consumer.
///
/// # Log Level
/// `info!`
pub struct RecordLogged<'a> {
    pub record: &'a Record,
}

impl Display for RecordLogged<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Record {}", self.record.to_json())
    }
}

impl StructuredLog for RecordLogged<'_> {
    fn log(&self) {
        tracing::info!(
            shape = self.record.payload.shape(),
            metadata_keys = self.record.metadata.len(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("record", span_name = name, shape = self.record.payload.shape())
    }
}

/// A record reached the `discard` consumer and was dropped.
///
/// # Log Level
/// `debug!`
pub struct RecordDiscarded<'a> {
    pub record: &'a Record,
}

impl Display for RecordDiscarded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Discarded {} record", self.record.payload.shape())
    }
}

impl StructuredLog for RecordDiscarded<'_> {
    fn log(&self) {
        tracing::debug!(shape = self.record.payload.shape(), "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("discarded", span_name = name)
    }
}
