// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::config::TaskConfig;
use crate::engine::{Task, TerminationSignal};
use crate::errors::ConfigError;
use crate::observability::messages::task::TaskAborted;
use crate::observability::messages::StructuredLog;
use crate::registry::Registry;

/// Every task of one configuration file, run side by side.
#[derive(Debug)]
pub struct TaskGroup {
    tasks: Vec<Arc<Task>>,
}

impl TaskGroup {
    /// Build every task, failing on the first construction error.
    ///
    /// Tasks already built when a later one fails are dropped, which cancels them.
    pub fn build(
        configs: Vec<TaskConfig>,
        registry: &Registry,
        parent: &CancellationToken,
    ) -> Result<Self, ConfigError> {
        let tasks = configs
            .into_iter()
            .map(|config| Task::new(config, registry, parent).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { tasks })
    }

    pub fn tasks(&self) -> &[Arc<Task>] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Run every task concurrently and return when all have terminated.
    pub async fn run_all(&self) {
        let running: Vec<(Arc<Task>, JoinHandle<()>)> = self
            .tasks
            .iter()
            .map(|task| {
                let runner = task.clone();
                (task.clone(), tokio::spawn(async move { runner.run().await }))
            })
            .collect();

        for (task, handle) in running {
            if let Err(error) = handle.await {
                aborted(&task, &error).log();
            }
        }
    }

    /// Stop every task and return their termination signals, in task order.
    pub fn stop_all(&self) -> Vec<TerminationSignal> {
        self.tasks.iter().map(|task| task.stop()).collect()
    }

    /// Wait until every task has terminated.
    pub async fn wait_all(&self) {
        for task in &self.tasks {
            task.terminated().wait().await;
        }
    }
}

fn aborted<'a>(task: &'a Task, error: &'a JoinError) -> TaskAborted<'a> {
    TaskAborted {
        task: task.description(),
        error,
    }
}
