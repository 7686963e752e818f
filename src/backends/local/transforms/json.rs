// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;

use crate::errors::StageError;
use crate::record::{Payload, Record};
use crate::traits::Transform;

/// Decodes a raw payload into a single structured value.
#[derive(Debug, Default)]
pub struct JsonTransform;

impl Transform for JsonTransform {
    fn apply(&self, record: &mut Record) -> Result<(), StageError> {
        let value: Value = serde_json::from_slice(raw_bytes(record)?)?;
        record.payload = Payload::Single(value);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "json"
    }
}

/// Decodes a raw payload holding a JSON array into a batch.
#[derive(Debug, Default)]
pub struct JsonArrayTransform;

impl Transform for JsonArrayTransform {
    fn apply(&self, record: &mut Record) -> Result<(), StageError> {
        let values = match serde_json::from_slice(raw_bytes(record)?)? {
            Value::Array(values) => values,
            other => {
                return Err(StageError::PayloadShape {
                    expected: "json array",
                    found: json_kind(&other),
                })
            }
        };
        record.payload = Payload::Batch(values);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "json_array"
    }
}

fn raw_bytes(record: &Record) -> Result<&[u8], StageError> {
    match &record.payload {
        Payload::Raw(bytes) => Ok(bytes),
        other => Err(StageError::PayloadShape {
            expected: "raw",
            found: other.shape(),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
