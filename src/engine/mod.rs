// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Task execution: the worker pool, lifecycle and shutdown synchronization.

mod group;
mod stats;
mod task;
mod termination;
mod worker;

#[cfg(test)]
mod integration_tests;

pub use group::TaskGroup;
pub use stats::TaskStatsSnapshot;
pub use task::{Task, TaskState};
pub use termination::{termination_channel, TerminationSignal, TerminationTrigger};
