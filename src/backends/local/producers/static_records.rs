// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::{json, Value};

use super::{channel_capacity, spawn_emitter, EmitterHandle};
use crate::config::StageSpec;
use crate::errors::StageError;
use crate::record::{Payload, Record, RecordReceiver};
use crate::registry::StageContext;
use crate::engine::TerminationSignal;
use crate::traits::Producer;

/// Emits the values listed in `metadata.records`, once or on a loop.
///
/// | key       | meaning                                                   |
/// |-----------|-----------------------------------------------------------|
/// | `records` | list of values (a single value is a list of one)          |
/// | `raw`     | emit string entries as raw bytes instead of JSON strings  |
/// | `repeat`  | start over at the end of the list until cancelled         |
/// | `buffer`  | channel capacity                                          |
///
/// Every record carries its running `offset` in metadata.
pub struct StaticProducer {
    handle: EmitterHandle,
}

impl StaticProducer {
    pub fn from_spec(spec: &StageSpec, ctx: &StageContext) -> Result<Self, StageError> {
        let entries = match spec.metadata.require("records")? {
            Value::Array(items) => items.clone(),
            single => vec![single.clone()],
        };
        let raw = spec.metadata.bool("raw");
        let repeat = spec.metadata.bool("repeat");
        let capacity = channel_capacity(spec)?;

        let payloads: Vec<Payload> = entries
            .into_iter()
            .map(|entry| to_payload(entry, raw))
            .collect();

        let handle = spawn_emitter("static", ctx, capacity, move |emitter| async move {
            let mut offset: u64 = 0;
            loop {
                for payload in &payloads {
                    let mut record = Record::new(payload.clone());
                    record.metadata.insert("offset".to_string(), json!(offset));
                    if !emitter.emit(record).await {
                        return Ok(());
                    }
                    offset += 1;
                }
                if !repeat || payloads.is_empty() {
                    return Ok(());
                }
            }
        });

        Ok(Self { handle })
    }
}

fn to_payload(entry: Value, raw: bool) -> Payload {
    match entry {
        Value::String(text) if raw => Payload::Raw(text.into_bytes()),
        other => Payload::Single(other),
    }
}

impl Producer for StaticProducer {
    fn records(&self) -> RecordReceiver {
        self.handle.records()
    }

    fn terminated(&self) -> TerminationSignal {
        self.handle.terminated()
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
