// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::config::consts::DEFAULT_SEQUENCE_KEY;
use crate::config::StageSpec;
use crate::errors::StageError;
use crate::record::Record;
use crate::traits::Transform;
use crate::utils::SharedResource;

/// Lock-free monotonically increasing id source.
#[derive(Debug)]
pub struct SequenceGenerator {
    next: AtomicU64,
    step: u64,
}

impl SequenceGenerator {
    pub fn new(start: u64, step: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
            step: step.max(1),
        }
    }

    pub fn next_id(&self) -> u64 {
        self.next.fetch_add(self.step, Ordering::Relaxed)
    }
}

/// Writes the next id of a sequence into record metadata.
///
/// With `shared: true` every instance draws from the process-wide generator,
/// so ids are unique across tasks. Otherwise the instance owns a generator
/// built from `start` (default 1) and `step` (default 1).
pub struct SequenceIdTransform {
    key: String,
    generator: Arc<SequenceGenerator>,
}

impl SequenceIdTransform {
    pub fn new(key: impl Into<String>, generator: Arc<SequenceGenerator>) -> Self {
        Self {
            key: key.into(),
            generator,
        }
    }

    pub fn from_spec(
        spec: &StageSpec,
        shared: &SharedResource<SequenceGenerator>,
    ) -> Result<Self, StageError> {
        let key = spec.metadata.str_or("key", DEFAULT_SEQUENCE_KEY);

        let generator = if spec.metadata.bool("shared") {
            shared
                .get()
                .ok_or_else(|| StageError::SharedResourceMissing {
                    name: shared.name().to_string(),
                })?
        } else {
            Arc::new(SequenceGenerator::new(
                spec.metadata.u64_or("start", 1)?,
                spec.metadata.u64_or("step", 1)?,
            ))
        };

        Ok(Self::new(key, generator))
    }
}

impl Transform for SequenceIdTransform {
    fn apply(&self, record: &mut Record) -> Result<(), StageError> {
        record
            .metadata
            .insert(self.key.clone(), json!(self.generator.next_id()));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "sequence_id"
    }
}
