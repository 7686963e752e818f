// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Test-only stages for exercising the engine without real I/O.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::engine::{termination_channel, TerminationSignal, TerminationTrigger};
use crate::errors::StageError;
use crate::record::{record_channel, Payload, Record, RecordReceiver, RecordSender};
use crate::registry::Registry;
use crate::traits::{Consumer, Producer, Transform};

/// Emits a fixed list of records and closes its channel. Needs no runtime.
pub struct VecProducer {
    receiver: RecordReceiver,
}

impl VecProducer {
    pub fn new(values: Vec<Value>) -> Self {
        Self::from_records(values.into_iter().map(Record::new).collect())
    }

    pub fn from_records(records: Vec<Record>) -> Self {
        let (sender, receiver) = record_channel(records.len());
        for record in records {
            sender
                .try_send(record)
                .expect("channel sized to hold every record");
        }
        Self { receiver }
    }
}

impl Producer for VecProducer {
    fn records(&self) -> RecordReceiver {
        self.receiver.clone()
    }

    fn terminated(&self) -> TerminationSignal {
        TerminationSignal::terminated()
    }

    fn name(&self) -> &'static str {
        "vec"
    }
}

/// Keeps its channel open until cancelled, optionally emitting records meanwhile.
pub struct PendingProducer {
    receiver: RecordReceiver,
    sender: Mutex<Option<RecordSender>>,
    trigger: Mutex<Option<TerminationTrigger>>,
    terminated: TerminationSignal,
    emit: bool,
}

impl PendingProducer {
    /// Never emits anything.
    pub fn new() -> Self {
        Self::build(false)
    }

    /// Emits `{"n": 0}`, `{"n": 1}`, ... as fast as the workers take them.
    pub fn endless() -> Self {
        Self::build(true)
    }

    fn build(emit: bool) -> Self {
        let (sender, receiver) = record_channel(4);
        let (trigger, terminated) = termination_channel();
        Self {
            receiver,
            sender: Mutex::new(Some(sender)),
            trigger: Mutex::new(Some(trigger)),
            terminated,
            emit,
        }
    }

    /// Start the background emitter bound to `cancel`. Only the first call does anything.
    pub fn watch(&self, cancel: CancellationToken) {
        let sender = self.sender.lock().take();
        let trigger = self.trigger.lock().take();
        let emit = self.emit;

        tokio::spawn(async move {
            if let Some(sender) = sender {
                let mut n: u64 = 0;
                while emit {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        sent = sender.send(Record::new(json!({"n": n}))) => {
                            if sent.is_err() {
                                break;
                            }
                            n += 1;
                        }
                    }
                }
                cancel.cancelled().await;
                drop(sender);
            }
            if let Some(trigger) = trigger {
                trigger.fire();
            }
        });
    }
}

impl Producer for PendingProducer {
    fn records(&self) -> RecordReceiver {
        self.receiver.clone()
    }

    fn terminated(&self) -> TerminationSignal {
        self.terminated.clone()
    }

    fn name(&self) -> &'static str {
        "pending"
    }
}

/// Writes a fixed string into record metadata.
pub struct TagTransform {
    key: String,
    value: String,
}

impl TagTransform {
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

impl Transform for TagTransform {
    fn apply(&self, record: &mut Record) -> Result<(), StageError> {
        record
            .metadata
            .insert(self.key.clone(), Value::String(self.value.clone()));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "tag"
    }
}

/// Copies the payload's `v` field into metadata `seq`.
pub struct SeqFromV;

impl Transform for SeqFromV {
    fn apply(&self, record: &mut Record) -> Result<(), StageError> {
        let v = match &record.payload {
            Payload::Single(value) => value.get("v").cloned().unwrap_or(Value::Null),
            other => {
                return Err(StageError::PayloadShape {
                    expected: "single",
                    found: other.shape(),
                })
            }
        };
        record.metadata.insert("seq".to_string(), v);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "seq_from_v"
    }
}

/// Appends its label to the `trail` metadata list, recording transform order.
pub struct TrailTransform {
    label: String,
}

impl TrailTransform {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
        }
    }
}

impl Transform for TrailTransform {
    fn apply(&self, record: &mut Record) -> Result<(), StageError> {
        let trail = record
            .metadata
            .entry("trail".to_string())
            .or_insert_with(|| Value::Array(vec![]));
        if let Value::Array(items) = trail {
            items.push(Value::String(self.label.clone()));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "trail"
    }
}

pub struct PanickingTransform;

impl Transform for PanickingTransform {
    fn apply(&self, _record: &mut Record) -> Result<(), StageError> {
        panic!("transform blew up");
    }

    fn name(&self) -> &'static str {
        "panicking"
    }
}

pub struct FailingTransform;

impl Transform for FailingTransform {
    fn apply(&self, _record: &mut Record) -> Result<(), StageError> {
        Err(StageError::InvalidMetadata {
            key: "anything".to_string(),
            reason: "always fails".to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Stores every record it receives.
pub struct CollectingConsumer {
    records: Mutex<Vec<Record>>,
    delay: Option<Duration>,
}

impl CollectingConsumer {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Sleeps for `delay` before storing each record.
    pub fn slow(delay: Duration) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            delay: Some(delay),
        }
    }

    pub fn records(&self) -> Vec<Record> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }
}

#[async_trait]
impl Consumer for CollectingConsumer {
    async fn consume(&self, record: &Record) -> Result<(), StageError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.records.lock().push(record.clone());
        Ok(())
    }

    fn terminated(&self) -> TerminationSignal {
        TerminationSignal::terminated()
    }

    fn name(&self) -> &'static str {
        "collect"
    }
}

/// Accepts every record but reports termination only when the caller fires
/// the trigger handed out by [`HeldConsumer::new`].
pub struct HeldConsumer {
    terminated: TerminationSignal,
}

impl HeldConsumer {
    pub fn new() -> (Self, TerminationTrigger) {
        let (trigger, terminated) = termination_channel();
        (Self { terminated }, trigger)
    }
}

#[async_trait]
impl Consumer for HeldConsumer {
    async fn consume(&self, _record: &Record) -> Result<(), StageError> {
        Ok(())
    }

    fn terminated(&self) -> TerminationSignal {
        self.terminated.clone()
    }

    fn name(&self) -> &'static str {
        "held"
    }
}

/// Fails on every record, panicking instead when built with `panics = true`.
pub struct FailingConsumer {
    panics: bool,
}

impl FailingConsumer {
    pub fn new(panics: bool) -> Self {
        Self { panics }
    }
}

#[async_trait]
impl Consumer for FailingConsumer {
    async fn consume(&self, _record: &Record) -> Result<(), StageError> {
        if self.panics {
            panic!("consumer blew up");
        }
        Err(StageError::InvalidMetadata {
            key: "anything".to_string(),
            reason: "consumer always fails".to_string(),
        })
    }

    fn terminated(&self) -> TerminationSignal {
        TerminationSignal::terminated()
    }

    fn name(&self) -> &'static str {
        "failing_consumer"
    }
}

/// A registry with the stub stages above.
///
/// Producers: `vec` emits `values` as single payloads.
/// Transforms: `seq_from_v`, `panicking`, `failing`, and `needs_key`, which
/// fails construction without a `key` entry.
/// Consumers: `collect` (the returned shared instance) and `broken`, whose
/// constructor always fails.
pub fn test_registry(values: Vec<Value>) -> (Registry, Arc<CollectingConsumer>) {
    let mut registry = Registry::new();
    let sink = Arc::new(CollectingConsumer::new());

    registry.producers.register("vec", move |_spec, _ctx| {
        Ok(Arc::new(VecProducer::new(values.clone())) as Arc<dyn Producer>)
    });

    registry
        .transforms
        .register("seq_from_v", |_spec, _ctx| Ok(Arc::new(SeqFromV) as Arc<dyn Transform>));
    registry.transforms.register("panicking", |_spec, _ctx| {
        Ok(Arc::new(PanickingTransform) as Arc<dyn Transform>)
    });
    registry.transforms.register("failing", |_spec, _ctx| {
        Ok(Arc::new(FailingTransform) as Arc<dyn Transform>)
    });
    registry.transforms.register("needs_key", |spec, _ctx| {
        let key = spec.metadata.require_str("key")?;
        Ok(Arc::new(TagTransform::new(key, "present")) as Arc<dyn Transform>)
    });

    {
        let sink = sink.clone();
        registry
            .consumers
            .register("collect", move |_spec, _ctx| Ok(sink.clone() as Arc<dyn Consumer>));
    }
    registry.consumers.register("broken", |_spec, _ctx| {
        Err(StageError::MissingMetadata {
            key: "path".to_string(),
        })
    });

    (registry, sink)
}
