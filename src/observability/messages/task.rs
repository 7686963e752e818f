// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for task lifecycle events.
//!
//! This module contains message types for logging events related to:
//! * Worker pool start and shutdown
//! * Stop requests and repeated run calls
//! * Individual worker start and exit

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Task worker pool started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_conveyor::observability::messages::task::TaskStarted;
///
/// let msg = TaskStarted {
///     task: "orders",
///     thread_count: 4,
///     transform_count: 2,
///     consumer_count: 1,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct TaskStarted<'a> {
    pub task: &'a str,
    pub thread_count: usize,
    pub transform_count: usize,
    pub consumer_count: usize,
}

impl Display for TaskStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Task '{}' started: {} workers, {} transforms, {} consumers",
            self.task, self.thread_count, self.transform_count, self.consumer_count
        )
    }
}

impl StructuredLog for TaskStarted<'_> {
    fn log(&self) {
        tracing::info!(
            task = self.task,
            thread_count = self.thread_count,
            transform_count = self.transform_count,
            consumer_count = self.consumer_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "task",
            span_name = name,
            task = self.task,
            thread_count = self.thread_count,
        )
    }
}

/// Task terminated: every worker exited and every stage reported termination.
///
/// # Log Level
/// `info!` - Important operational event
pub struct TaskFinished<'a> {
    pub task: &'a str,
    pub records: u64,
    pub duration: Duration,
}

impl Display for TaskFinished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Task '{}' finished: {} records in {:?}",
            self.task, self.records, self.duration
        )
    }
}

impl StructuredLog for TaskFinished<'_> {
    fn log(&self) {
        tracing::info!(
            task = self.task,
            records = self.records,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "task_finished",
            span_name = name,
            task = self.task,
            records = self.records,
        )
    }
}

/// Stop requested; the shared cancellation has been triggered.
///
/// # Log Level
/// `info!`
pub struct TaskStopRequested<'a> {
    pub task: &'a str,
}

impl Display for TaskStopRequested<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Task '{}' stop requested", self.task)
    }
}

impl StructuredLog for TaskStopRequested<'_> {
    fn log(&self) {
        tracing::info!(task = self.task, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("task_stop", span_name = name, task = self.task)
    }
}

/// `run` called on a task that already left the created state.
///
/// # Log Level
/// `debug!` - Expected when several callers race to start a task
pub struct RunIgnored<'a> {
    pub task: &'a str,
    pub state: &'a str,
}

impl Display for RunIgnored<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Task '{}' already {}, run ignored", self.task, self.state)
    }
}

impl StructuredLog for RunIgnored<'_> {
    fn log(&self) {
        tracing::debug!(task = self.task, state = self.state, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("run_ignored", span_name = name, task = self.task)
    }
}

/// A worker was spawned into the task's pool.
///
/// The span from [`StructuredLog::span`] wraps the worker future, so every
/// event the worker emits carries its task and id.
///
/// # Log Level
/// `debug!`
pub struct WorkerStarted<'a> {
    pub task: &'a str,
    pub worker_id: usize,
}

impl Display for WorkerStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Task '{}' worker {} started", self.task, self.worker_id)
    }
}

impl StructuredLog for WorkerStarted<'_> {
    fn log(&self) {
        tracing::debug!(task = self.task, worker_id = self.worker_id, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "worker",
            span_name = name,
            task = self.task,
            worker_id = self.worker_id,
        )
    }
}

/// A worker left its loop because the producer channel closed.
///
/// # Log Level
/// `debug!`
pub struct WorkerExited {
    pub worker_id: usize,
    pub records: u64,
}

impl Display for WorkerExited {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker {} exited after {} records",
            self.worker_id, self.records
        )
    }
}

impl StructuredLog for WorkerExited {
    fn log(&self) {
        tracing::debug!(worker_id = self.worker_id, records = self.records, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("worker", span_name = name, worker_id = self.worker_id)
    }
}

/// A worker future ended abnormally outside any stage fault barrier.
///
/// # Log Level
/// `error!` - The pool is one worker short for the rest of the run
pub struct WorkerAborted<'a> {
    pub task: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for WorkerAborted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Task '{}' worker aborted: {}", self.task, self.error)
    }
}

impl StructuredLog for WorkerAborted<'_> {
    fn log(&self) {
        tracing::error!(task = self.task, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "worker_aborted",
            span_name = name,
            task = self.task,
            error = %self.error,
        )
    }
}

/// A task's supervisor ended abnormally; the task was forced to terminated.
///
/// # Log Level
/// `error!`
pub struct TaskAborted<'a> {
    pub task: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for TaskAborted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Task '{}' aborted: {}", self.task, self.error)
    }
}

impl StructuredLog for TaskAborted<'_> {
    fn log(&self) {
        tracing::error!(task = self.task, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "task_aborted",
            span_name = name,
            task = self.task,
            error = %self.error,
        )
    }
}
