// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::TerminationSignal;
use crate::record::RecordReceiver;

/// Source of records for a task.
///
/// The record stream is lazy, unbounded and not restartable. A producer must
/// drop every sender of its channel once it will emit nothing more (feed
/// exhausted, or cancellation observed); that closes the channel and drains the
/// task's workers out of their loops.
pub trait Producer: Send + Sync {
    /// Receiving half of the record channel. Every call returns a handle to the same channel.
    fn records(&self) -> RecordReceiver;

    /// Closed once the producer has stopped emitting and released its resources.
    fn terminated(&self) -> TerminationSignal;

    fn name(&self) -> &'static str;
}
