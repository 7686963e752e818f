// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The task orchestrator: one producer, ordered transforms, one or more
//! consumers, a worker pool and the start/stop protocol.
//!
//! # Lifecycle
//!
//! ```text
//! Created --run()--> Running --(workers exited, stages terminated)--> Terminated
//! ```
//!
//! | call     | Created                              | Running            | Terminated |
//! |----------|--------------------------------------|--------------------|------------|
//! | `run()`  | starts the pool, blocks until done   | no-op              | no-op      |
//! | `stop()` | cancels stages, `run()` then drains  | cancels (once)     | no-op      |
//!
//! `stop()` always returns the same [`TerminationSignal`], whatever the state
//! and however many callers race on it.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span};

use crate::config::{StageSpec, TaskConfig};
use crate::engine::stats::{TaskStats, TaskStatsSnapshot};
use crate::engine::termination::{termination_channel, TerminationSignal, TerminationTrigger};
use crate::engine::worker::{run_worker, Pipeline, StageHandle};
use crate::errors::ConfigError;
use crate::observability::messages::stage::TransformSkipped;
use crate::observability::messages::task::{
    RunIgnored, TaskAborted, TaskFinished, TaskStarted, TaskStopRequested, WorkerAborted,
    WorkerStarted,
};
use crate::observability::messages::StructuredLog;
use crate::registry::{PluginRegistry, Registry, StageContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Built and eligible to run.
    Created,
    /// Worker pool started.
    Running,
    /// Every worker exited and every stage reported termination. Final.
    Terminated,
}

impl TaskState {
    fn as_str(&self) -> &'static str {
        match self {
            TaskState::Created => "created",
            TaskState::Running => "running",
            TaskState::Terminated => "terminated",
        }
    }
}

struct Lifecycle {
    state: TaskState,
    cancel_requested: bool,
    trigger: Option<TerminationTrigger>,
}

/// State shared between a task handle and its pool supervisor.
struct TaskShared {
    config: TaskConfig,
    pipeline: Arc<Pipeline>,
    cancel: CancellationToken,
    lifecycle: Mutex<Lifecycle>,
    stats: Arc<TaskStats>,
    span: Span,
}

impl TaskShared {
    fn description(&self) -> &str {
        &self.config.description
    }

    fn request_cancellation(&self) -> bool {
        let mut lifecycle = self.lifecycle.lock();
        if lifecycle.cancel_requested {
            return false;
        }
        lifecycle.cancel_requested = true;
        self.cancel.cancel();
        self.stats.cancellation_issued();
        true
    }

    /// Mark the task terminated and close its signal. Safe to call more than once.
    fn finish(&self) {
        let trigger = {
            let mut lifecycle = self.lifecycle.lock();
            lifecycle.state = TaskState::Terminated;
            lifecycle.trigger.take()
        };
        if let Some(trigger) = trigger {
            trigger.fire();
        }
    }
}

pub struct Task {
    shared: Arc<TaskShared>,
    terminated: TerminationSignal,
}

impl Task {
    /// Resolve and construct every stage of `config` through `registry`.
    ///
    /// The task's cancellation token is a child of `parent`. Must be called
    /// inside a tokio runtime, since producers may start background work as
    /// they are built.
    ///
    /// An unknown or failing producer or consumer is an error. An unknown or
    /// failing transform is logged and left out of the pipeline.
    pub fn new(
        config: TaskConfig,
        registry: &Registry,
        parent: &CancellationToken,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let cancel = parent.child_token();
        let span = tracing::info_span!("task", task = %config.description);

        let pipeline = match build_pipeline(&config, registry, &cancel, &span) {
            Ok(pipeline) => pipeline,
            Err(error) => {
                // Release whatever was already built.
                cancel.cancel();
                return Err(error);
            }
        };

        let (trigger, terminated) = termination_channel();

        Ok(Self {
            shared: Arc::new(TaskShared {
                config,
                pipeline: Arc::new(pipeline),
                cancel,
                lifecycle: Mutex::new(Lifecycle {
                    state: TaskState::Created,
                    cancel_requested: false,
                    trigger: Some(trigger),
                }),
                stats: Arc::new(TaskStats::default()),
                span,
            }),
            terminated,
        })
    }

    /// Run the worker pool until the producer channel closes, then wait for the
    /// producer and every consumer to terminate and close the termination signal.
    ///
    /// Only the first call has any effect; later calls return immediately.
    /// The pool runs on its own supervisor task, so dropping the returned
    /// future does not abandon the workers: the task still terminates once
    /// its producer closes or `stop` is called.
    pub async fn run(&self) {
        {
            let mut lifecycle = self.shared.lifecycle.lock();
            if lifecycle.state != TaskState::Created {
                RunIgnored {
                    task: self.shared.description(),
                    state: lifecycle.state.as_str(),
                }
                .log();
                return;
            }
            lifecycle.state = TaskState::Running;
        }

        let span = self.shared.span.clone();
        let supervisor = tokio::spawn(supervise(self.shared.clone()).instrument(span));

        if let Err(error) = supervisor.await {
            TaskAborted {
                task: self.shared.description(),
                error: &error,
            }
            .log();
            self.shared.request_cancellation();
            self.shared.finish();
        }
    }

    /// Trigger the shared cancellation (at most once) and return the termination signal.
    ///
    /// Never blocks. Safe to call from any number of threads, before, during
    /// or after `run`.
    pub fn stop(&self) -> TerminationSignal {
        if self.shared.request_cancellation() {
            TaskStopRequested {
                task: self.shared.description(),
            }
            .log();
        }
        self.terminated.clone()
    }

    /// The termination signal, without requesting a stop.
    pub fn terminated(&self) -> TerminationSignal {
        self.terminated.clone()
    }

    pub fn state(&self) -> TaskState {
        self.shared.lifecycle.lock().state
    }

    pub fn description(&self) -> &str {
        self.shared.description()
    }

    pub fn config(&self) -> &TaskConfig {
        &self.shared.config
    }

    pub fn stats(&self) -> TaskStatsSnapshot {
        self.shared.stats.snapshot()
    }

    /// Tags of the transforms that made it into the pipeline, in order.
    pub fn transform_tags(&self) -> Vec<&str> {
        self.shared
            .pipeline
            .transforms
            .iter()
            .map(|t| t.tag.as_str())
            .collect()
    }

    pub fn consumer_count(&self) -> usize {
        self.shared.pipeline.consumers.len()
    }
}

impl Drop for Task {
    fn drop(&mut self) {
        self.shared.cancel.cancel();
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("description", &self.description())
            .field("state", &self.state())
            .field("transforms", &self.transform_tags())
            .field("consumers", &self.consumer_count())
            .finish()
    }
}

/// Owns the worker pool for one run: spawn, join, cancel, wait for every
/// stage to report termination, then close the task's signal.
async fn supervise(shared: Arc<TaskShared>) {
    let started = Instant::now();
    let thread_count = shared.config.normalized_thread_count();
    TaskStarted {
        task: shared.description(),
        thread_count,
        transform_count: shared.pipeline.transforms.len(),
        consumer_count: shared.pipeline.consumers.len(),
    }
    .log();

    let mut workers = JoinSet::new();
    for worker_id in 0..thread_count {
        let worker = WorkerStarted {
            task: shared.description(),
            worker_id,
        };
        worker.log();
        workers.spawn(
            run_worker(worker_id, shared.pipeline.clone(), shared.stats.clone())
                .instrument(worker.span("worker")),
        );
    }
    while let Some(joined) = workers.join_next().await {
        if let Err(error) = joined {
            WorkerAborted {
                task: shared.description(),
                error: &error,
            }
            .log();
        }
    }

    // No worker is left; stages can release their resources.
    shared.request_cancellation();
    shared.pipeline.producer.stage.terminated().wait().await;
    for consumer in &shared.pipeline.consumers {
        consumer.stage.terminated().wait().await;
    }

    TaskFinished {
        task: shared.description(),
        records: shared.stats.snapshot().records,
        duration: started.elapsed(),
    }
    .log();
    shared.finish();
}

fn build_pipeline(
    config: &TaskConfig,
    registry: &Registry,
    cancel: &CancellationToken,
    span: &Span,
) -> Result<Pipeline, ConfigError> {
    let task = config.description.as_str();

    let producer = build_stage(&registry.producers, &config.producer, 0, task, cancel, span)?;

    let mut transforms = Vec::with_capacity(config.transforms.len());
    for (index, spec) in config.transforms.iter().enumerate() {
        match build_stage(&registry.transforms, spec, index, task, cancel, span) {
            Ok(handle) => transforms.push(handle),
            Err(error) => TransformSkipped {
                task,
                type_name: &spec.type_name,
                reason: &error.to_string(),
            }
            .log(),
        }
    }

    let consumers = config
        .consumers
        .iter()
        .enumerate()
        .map(|(index, spec)| build_stage(&registry.consumers, spec, index, task, cancel, span))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Pipeline {
        producer,
        transforms,
        consumers,
    })
}

fn build_stage<T: ?Sized>(
    registry: &PluginRegistry<T>,
    spec: &StageSpec,
    index: usize,
    task: &str,
    cancel: &CancellationToken,
    span: &Span,
) -> Result<StageHandle<T>, ConfigError> {
    let kind = registry.kind();
    let constructor =
        registry
            .resolve(&spec.type_name)
            .ok_or_else(|| ConfigError::UnknownStage {
                task: task.to_string(),
                kind,
                type_name: spec.type_name.clone(),
            })?;

    let stage_span = tracing::info_span!(
        parent: span,
        "stage",
        stage_kind = %kind,
        stage_type = %spec.type_name,
        index,
    );
    let stage = constructor(spec, StageContext::new(cancel.clone(), stage_span)).map_err(
        |source| ConfigError::StageConstruction {
            task: task.to_string(),
            kind,
            type_name: spec.type_name.clone(),
            source,
        },
    )?;

    Ok(StageHandle {
        tag: format!("{}[{}]:{}", kind, index, spec.type_name),
        stage,
    })
}
