// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Built-in producers and the channel plumbing they share.
//!
//! Each producer spawns one background emitter when it is constructed. The
//! emitter owns the only sender of the record channel, so the channel closes
//! when the emitter returns, whether it ran out of input or saw cancellation.
//! The producer's termination signal closes right after.

mod lines;
mod static_records;

pub use lines::{FileProducer, StdinProducer};
pub use static_records::StaticProducer;

use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::config::consts::{DEFAULT_CHANNEL_CAPACITY, MAX_CHANNEL_CAPACITY};
use crate::config::StageSpec;
use crate::engine::{termination_channel, TerminationSignal};
use crate::errors::StageError;
use crate::observability::messages::stage::BackgroundFailed;
use crate::observability::messages::StructuredLog;
use crate::record::{record_channel, Record, RecordReceiver, RecordSender};
use crate::registry::StageContext;

/// The record channel capacity from the optional `buffer` metadata key.
pub fn channel_capacity(spec: &StageSpec) -> Result<usize, StageError> {
    let requested = spec
        .metadata
        .u64_or("buffer", DEFAULT_CHANNEL_CAPACITY as u64)?;
    usize::try_from(requested)
        .ok()
        .filter(|capacity| *capacity <= MAX_CHANNEL_CAPACITY)
        .ok_or_else(|| StageError::InvalidMetadata {
            key: "buffer".to_string(),
            reason: format!(
                "{} is above the maximum of {}",
                requested, MAX_CHANNEL_CAPACITY
            ),
        })
}

/// Sending side handed to an emitter.
pub struct Emitter {
    sender: RecordSender,
    cancel: CancellationToken,
}

impl Emitter {
    /// Send `record`, waiting for channel space. Returns false once the
    /// emitter should stop: the task was cancelled or every receiver is gone.
    pub async fn emit(&self, record: Record) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            sent = self.sender.send(record) => sent.is_ok(),
        }
    }

    pub fn cancel(&self) -> &CancellationToken {
        &self.cancel
    }
}

/// Receiving side and termination signal of a spawned emitter.
pub struct EmitterHandle {
    receiver: RecordReceiver,
    terminated: TerminationSignal,
}

impl EmitterHandle {
    pub fn records(&self) -> RecordReceiver {
        self.receiver.clone()
    }

    pub fn terminated(&self) -> TerminationSignal {
        self.terminated.clone()
    }
}

/// Spawn `body` as the producer's emitter inside the stage span.
pub fn spawn_emitter<F, Fut>(
    producer: &'static str,
    ctx: &StageContext,
    capacity: usize,
    body: F,
) -> EmitterHandle
where
    F: FnOnce(Emitter) -> Fut,
    Fut: Future<Output = Result<(), StageError>> + Send + 'static,
{
    let (sender, receiver) = record_channel(capacity);
    let (trigger, terminated) = termination_channel();
    let emitting = body(Emitter {
        sender,
        cancel: ctx.cancel.clone(),
    });

    tokio::spawn(
        async move {
            if let Err(error) = emitting.await {
                BackgroundFailed {
                    stage: producer,
                    error: &error,
                }
                .log();
            }
            trigger.fire();
        }
        .instrument(ctx.span.clone()),
    );

    EmitterHandle {
        receiver,
        terminated,
    }
}
