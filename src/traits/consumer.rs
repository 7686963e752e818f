// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::engine::TerminationSignal;
use crate::errors::StageError;
use crate::record::Record;

/// Side-effecting sink for fully transformed records.
///
/// Called concurrently from every worker of the task. When a task fans a record
/// out to several consumers, none of them may assume the order or the success
/// of any other.
#[async_trait]
pub trait Consumer: Send + Sync {
    async fn consume(&self, record: &Record) -> Result<(), StageError>;

    /// Closed once outstanding asynchronous work has drained after cancellation.
    fn terminated(&self) -> TerminationSignal;

    fn name(&self) -> &'static str;
}
