// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::{Map, Value};

use crate::config::StageSpec;
use crate::errors::StageError;
use crate::record::Record;
use crate::traits::Transform;

/// Inserts every entry of `metadata.values` into each record, overwriting existing keys.
pub struct SetMetadataTransform {
    values: Map<String, Value>,
}

impl SetMetadataTransform {
    pub fn from_spec(spec: &StageSpec) -> Result<Self, StageError> {
        match spec.metadata.require("values")? {
            Value::Object(values) => Ok(Self {
                values: values.clone(),
            }),
            other => Err(StageError::InvalidMetadata {
                key: "values".to_string(),
                reason: format!("expected a map, found {}", other),
            }),
        }
    }
}

impl Transform for SetMetadataTransform {
    fn apply(&self, record: &mut Record) -> Result<(), StageError> {
        for (key, value) in &self.values {
            record.metadata.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "set_metadata"
    }
}
