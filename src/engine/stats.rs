// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Counters shared by a task and its workers.
#[derive(Debug, Default)]
pub(crate) struct TaskStats {
    records: AtomicU64,
    worker_exits: AtomicUsize,
    transform_failures: AtomicU64,
    consumer_failures: AtomicU64,
    cancellations: AtomicUsize,
}

impl TaskStats {
    pub(crate) fn record_processed(&self) {
        self.records.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn worker_exited(&self) {
        self.worker_exits.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn transform_failed(&self) {
        self.transform_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn consumer_failed(&self) {
        self.consumer_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn cancellation_issued(&self) {
        self.cancellations.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn snapshot(&self) -> TaskStatsSnapshot {
        TaskStatsSnapshot {
            records: self.records.load(Ordering::Relaxed),
            worker_exits: self.worker_exits.load(Ordering::Acquire),
            transform_failures: self.transform_failures.load(Ordering::Relaxed),
            consumer_failures: self.consumer_failures.load(Ordering::Relaxed),
            cancellations: self.cancellations.load(Ordering::Acquire),
        }
    }
}

/// Point-in-time copy of a task's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStatsSnapshot {
    /// Records that went through every transform and every consumer.
    pub records: u64,
    pub worker_exits: usize,
    /// Transform calls that returned an error or panicked.
    pub transform_failures: u64,
    /// Consumer calls that returned an error or panicked.
    pub consumer_failures: u64,
    /// Times the task's cancellation was triggered. Never more than one.
    pub cancellations: usize,
}
