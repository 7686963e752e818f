// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;

use crate::config::StageSpec;
use crate::errors::StageError;
use crate::record::{Payload, Record};
use crate::traits::Transform;

/// Copies payload field `field` into metadata `key` (defaults to the field name).
///
/// For a batch the metadata value is the list of each element's field, with
/// `null` for elements that lack it.
pub struct CopyFieldTransform {
    field: String,
    key: String,
}

impl CopyFieldTransform {
    pub fn from_spec(spec: &StageSpec) -> Result<Self, StageError> {
        let field = spec.metadata.require_str("field")?;
        let key = spec.metadata.str_or("key", field);
        Ok(Self {
            field: field.to_string(),
            key: key.to_string(),
        })
    }
}

impl Transform for CopyFieldTransform {
    fn apply(&self, record: &mut Record) -> Result<(), StageError> {
        let copied = match &record.payload {
            Payload::Single(value) => {
                value
                    .get(&self.field)
                    .cloned()
                    .ok_or_else(|| StageError::MissingField {
                        field: self.field.clone(),
                    })?
            }
            Payload::Batch(values) => Value::Array(
                values
                    .iter()
                    .map(|value| value.get(&self.field).cloned().unwrap_or(Value::Null))
                    .collect(),
            ),
            Payload::Raw(_) => {
                return Err(StageError::PayloadShape {
                    expected: "single or batch",
                    found: "raw",
                })
            }
        };

        record.metadata.insert(self.key.clone(), copied);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "copy_field"
    }
}
