// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::StageError;
use crate::record::Record;

/// Synchronous per-record mutation stage.
///
/// Invoked once per record for each configured occurrence, in configuration
/// order. A transform may rewrite the payload and add or update metadata that
/// later transforms and consumers observe. It must not block indefinitely: a
/// stalled transform stalls its whole worker.
///
/// An `Err` is logged by the worker together with the record, and the record
/// continues to the next stage in whatever state the transform left it.
pub trait Transform: Send + Sync {
    fn apply(&self, record: &mut Record) -> Result<(), StageError>;

    fn name(&self) -> &'static str;
}
