// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The unit of data flowing through a task.
//!
//! A [`Record`] is owned by exactly one worker at a time. Transforms receive
//! `&mut Record` and consumers receive `&Record`, so the borrow checker
//! enforces the single-writer handoff between stages.
//!
//! Payload shape is an explicit tagged variant. Stages match on [`Payload`]
//! instead of probing the value:
//!
//! ```
//! use the_conveyor::record::{Payload, Record};
//! use serde_json::json;
//!
//! let record = Record::new(Payload::Batch(vec![json!({"v": 1}), json!({"v": 2})]));
//! let count = match &record.payload {
//!     Payload::Raw(bytes) => bytes.len(),
//!     Payload::Single(_) => 1,
//!     Payload::Batch(values) => values.len(),
//! };
//! assert_eq!(count, 2);
//! ```

mod channel;

pub use channel::{record_channel, RecordReceiver, RecordSender};

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Side-channel values written by upstream stages and read by downstream ones.
pub type Metadata = HashMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", content = "value", rename_all = "snake_case")]
pub enum Payload {
    /// Undecoded bytes, typically straight from a producer.
    Raw(Vec<u8>),
    /// One decoded structured value.
    Single(Value),
    /// An ordered sequence of decoded structured values.
    Batch(Vec<Value>),
}

impl Payload {
    /// Short name of the variant, used in logs and shape errors.
    pub fn shape(&self) -> &'static str {
        match self {
            Payload::Raw(_) => "raw",
            Payload::Single(_) => "single",
            Payload::Batch(_) => "batch",
        }
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Raw(bytes)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Single(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub payload: Payload,
    pub metadata: Metadata,
}

impl Record {
    pub fn new(payload: impl Into<Payload>) -> Self {
        Self {
            payload: payload.into(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(payload: impl Into<Payload>, metadata: Metadata) -> Self {
        Self {
            payload: payload.into(),
            metadata,
        }
    }

    /// Render the record as a single JSON value for logging and line-oriented sinks.
    ///
    /// Raw payloads are rendered as UTF-8 text when valid, otherwise as a byte array.
    pub fn to_json(&self) -> Value {
        let payload = match &self.payload {
            Payload::Raw(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => Value::String(text.to_string()),
                Err(_) => Value::from(bytes.clone()),
            },
            Payload::Single(value) => value.clone(),
            Payload::Batch(values) => Value::Array(values.clone()),
        };
        serde_json::json!({
            "payload": payload,
            "metadata": self.metadata,
        })
    }
}
