// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::config::StageSpec;
use crate::engine::{termination_channel, TerminationSignal};
use crate::errors::StageError;
use crate::observability::messages::stage::BackgroundFailed;
use crate::observability::messages::StructuredLog;
use crate::record::Record;
use crate::registry::StageContext;
use crate::traits::Consumer;

/// Appends one JSON line per record to `metadata.path`.
///
/// Each line is [`Record::to_json`]. Output is buffered; the buffer is
/// flushed once the task is cancelled, and the termination signal closes
/// after that flush. Records written after cancellation are flushed as they
/// arrive.
pub struct JsonLinesConsumer {
    writer: Arc<Mutex<BufWriter<File>>>,
    cancel: CancellationToken,
    terminated: TerminationSignal,
}

impl JsonLinesConsumer {
    pub fn from_spec(spec: &StageSpec, ctx: &StageContext) -> Result<Self, StageError> {
        let path = spec.metadata.require_str("path")?;
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        let writer = Arc::new(Mutex::new(BufWriter::new(File::from_std(file))));

        let (trigger, terminated) = termination_channel();
        {
            let writer = writer.clone();
            let cancel = ctx.cancel.clone();
            tokio::spawn(
                async move {
                    cancel.cancelled().await;
                    if let Err(error) = writer.lock().await.flush().await {
                        BackgroundFailed {
                            stage: "jsonl",
                            error: &error,
                        }
                        .log();
                    }
                    trigger.fire();
                }
                .instrument(ctx.span.clone()),
            );
        }

        Ok(Self {
            writer,
            cancel: ctx.cancel.clone(),
            terminated,
        })
    }
}

#[async_trait]
impl Consumer for JsonLinesConsumer {
    async fn consume(&self, record: &Record) -> Result<(), StageError> {
        let mut line = serde_json::to_vec(&record.to_json())?;
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer.write_all(&line).await?;
        if self.cancel.is_cancelled() {
            writer.flush().await?;
        }
        Ok(())
    }

    fn terminated(&self) -> TerminationSignal {
        self.terminated.clone()
    }

    fn name(&self) -> &'static str {
        "jsonl"
    }
}
