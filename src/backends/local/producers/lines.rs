// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use parking_lot::Mutex;
use serde_json::json;
use std::io::{BufRead, Read};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use super::{channel_capacity, spawn_emitter, Emitter, EmitterHandle};
use crate::config::StageSpec;
use crate::engine::{termination_channel, TerminationSignal, TerminationTrigger};
use crate::errors::StageError;
use crate::observability::messages::stage::BackgroundFailed;
use crate::observability::messages::StructuredLog;
use crate::record::{record_channel, Record, RecordReceiver, RecordSender};
use crate::registry::StageContext;
use crate::traits::Producer;

/// One raw record per line of `metadata.path`.
///
/// The file is opened during construction so a bad path fails the task up
/// front. Records carry `path` and the 1-based `line` number.
pub struct FileProducer {
    handle: EmitterHandle,
}

impl FileProducer {
    pub fn from_spec(spec: &StageSpec, ctx: &StageContext) -> Result<Self, StageError> {
        let path = spec.metadata.require_str("path")?.to_string();
        let capacity = channel_capacity(spec)?;
        let file = tokio::fs::File::from_std(std::fs::File::open(&path)?);

        let handle = spawn_emitter("file", ctx, capacity, move |emitter| {
            emit_lines(BufReader::new(file), Some(path), emitter)
        });
        Ok(Self { handle })
    }
}

impl Producer for FileProducer {
    fn records(&self) -> RecordReceiver {
        self.handle.records()
    }

    fn terminated(&self) -> TerminationSignal {
        self.handle.terminated()
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

/// One raw record per line of standard input, until EOF or cancellation.
///
/// Reads happen on a dedicated OS thread. A read parked on an idle terminal
/// cannot be interrupted, so cancellation closes the channel from the async
/// side and the thread is left to exit on its next line or EOF.
pub struct StdinProducer {
    handle: EmitterHandle,
}

impl StdinProducer {
    pub fn from_spec(spec: &StageSpec, ctx: &StageContext) -> Result<Self, StageError> {
        let capacity = channel_capacity(spec)?;
        let handle = spawn_line_reader("stdin", ctx, capacity, std::io::stdin())?;
        Ok(Self { handle })
    }
}

impl Producer for StdinProducer {
    fn records(&self) -> RecordReceiver {
        self.handle.records()
    }

    fn terminated(&self) -> TerminationSignal {
        self.handle.terminated()
    }

    fn name(&self) -> &'static str {
        "stdin"
    }
}

async fn emit_lines<R>(reader: R, path: Option<String>, emitter: Emitter) -> Result<(), StageError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut line_number: u64 = 0;

    loop {
        let next = tokio::select! {
            biased;
            _ = emitter.cancel().cancelled() => return Ok(()),
            next = lines.next_line() => next?,
        };
        let line = match next {
            Some(line) => line,
            None => return Ok(()),
        };

        line_number += 1;
        if !emitter.emit(line_record(line, line_number, path.as_deref())).await {
            return Ok(());
        }
    }
}

fn line_record(line: String, line_number: u64, path: Option<&str>) -> Record {
    let mut record = Record::new(line.into_bytes());
    record
        .metadata
        .insert("line".to_string(), json!(line_number));
    if let Some(path) = path {
        record.metadata.insert("path".to_string(), json!(path));
    }
    record
}

type ReaderSlot = Arc<Mutex<Option<(RecordSender, TerminationTrigger)>>>;

/// Drop the channel's last owned sender and close the termination signal.
/// Whichever side gets here first wins; later calls do nothing.
fn close_reader(slot: &ReaderSlot) {
    if let Some((sender, trigger)) = slot.lock().take() {
        drop(sender);
        trigger.fire();
    }
}

/// Feed lines of a blocking `reader` into a record channel from a named OS thread.
///
/// The thread only holds a sender for the duration of one `blocking_send`, so
/// once cancellation closes the slot the channel ends as soon as any
/// in-flight send completes, even while the thread sits in `read`.
fn spawn_line_reader<R>(
    producer: &'static str,
    ctx: &StageContext,
    capacity: usize,
    reader: R,
) -> Result<EmitterHandle, StageError>
where
    R: Read + Send + 'static,
{
    let (sender, receiver) = record_channel(capacity);
    let (trigger, terminated) = termination_channel();
    let slot: ReaderSlot = Arc::new(Mutex::new(Some((sender, trigger))));

    let thread_slot = slot.clone();
    let span = ctx.span.clone();
    std::thread::Builder::new()
        .name(format!("{}-reader", producer))
        .spawn(move || {
            let _entered = span.enter();
            let mut line_number: u64 = 0;
            for line in BufRead::lines(std::io::BufReader::new(reader)) {
                let line = match line {
                    Ok(line) => line,
                    Err(error) => {
                        BackgroundFailed {
                            stage: producer,
                            error: &error,
                        }
                        .log();
                        break;
                    }
                };
                let sender = match thread_slot.lock().as_ref() {
                    Some((sender, _)) => sender.clone(),
                    None => break,
                };
                line_number += 1;
                if sender.blocking_send(line_record(line, line_number, None)).is_err() {
                    break;
                }
            }
            close_reader(&thread_slot);
        })?;

    let cancel = ctx.cancel.clone();
    let watched = terminated.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = cancel.cancelled() => close_reader(&slot),
            _ = watched.wait() => {}
        }
    });

    Ok(EmitterHandle {
        receiver,
        terminated,
    })
}
