// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The per-worker record loop and the fault barriers around each stage call.

use futures::FutureExt;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::engine::stats::TaskStats;
use crate::observability::messages::stage::{StageFailed, StagePanicked};
use crate::observability::messages::task::WorkerExited;
use crate::observability::messages::StructuredLog;
use crate::record::Record;
use crate::traits::{Consumer, Producer, Transform};

/// A constructed stage plus the tag used to identify it in logs.
pub(crate) struct StageHandle<T: ?Sized> {
    pub(crate) tag: String,
    pub(crate) stage: Arc<T>,
}

/// Stage instances of one task, shared read-only by all of its workers.
pub(crate) struct Pipeline {
    pub(crate) producer: StageHandle<dyn Producer>,
    pub(crate) transforms: Vec<StageHandle<dyn Transform>>,
    pub(crate) consumers: Vec<StageHandle<dyn Consumer>>,
}

/// Pull records until the producer channel closes.
///
/// Each record runs through every transform in configuration order, then is
/// handed to every consumer. Nothing is retried, requeued or buffered here.
pub(crate) async fn run_worker(worker_id: usize, pipeline: Arc<Pipeline>, stats: Arc<TaskStats>) {
    let records = pipeline.producer.stage.records();
    let mut processed: u64 = 0;

    while let Some(mut record) = records.recv().await {
        for transform in &pipeline.transforms {
            apply_transform(transform, &mut record, &stats);
        }
        for consumer in &pipeline.consumers {
            deliver(consumer, &record, &stats).await;
        }
        processed += 1;
        stats.record_processed();
    }

    stats.worker_exited();
    WorkerExited {
        worker_id,
        records: processed,
    }
    .log();
}

fn apply_transform(handle: &StageHandle<dyn Transform>, record: &mut Record, stats: &TaskStats) {
    // The record may be left partially transformed; it still moves on.
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| handle.stage.apply(record)));

    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(error)) => {
            stats.transform_failed();
            StageFailed {
                stage: &handle.tag,
                record,
                error: &error,
            }
            .log();
        }
        Err(payload) => {
            stats.transform_failed();
            StagePanicked {
                stage: &handle.tag,
                record,
                message: &panic_message(payload.as_ref()),
            }
            .log();
        }
    }
}

async fn deliver(handle: &StageHandle<dyn Consumer>, record: &Record, stats: &TaskStats) {
    let outcome = AssertUnwindSafe(handle.stage.consume(record))
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(error)) => {
            stats.consumer_failed();
            StageFailed {
                stage: &handle.tag,
                record,
                error: &error,
            }
            .log();
        }
        Err(payload) => {
            stats.consumer_failed();
            StagePanicked {
                stage: &handle.tag,
                record,
                message: &panic_message(payload.as_ref()),
            }
            .log();
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
