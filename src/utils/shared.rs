// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::{Arc, OnceLock};

use crate::observability::messages::registry::SharedResourceAlreadyInitialized;
use crate::observability::messages::StructuredLog;

/// A named slot initialized at most once and shared by every stage that captures it.
///
/// # Example
/// ```rust
/// use the_conveyor::utils::SharedResource;
///
/// let counter: SharedResource<u64> = SharedResource::new("counter");
/// assert!(counter.get().is_none());
///
/// assert_eq!(*counter.initialize(7), 7);
/// // The second value is ignored.
/// assert_eq!(*counter.initialize(9), 7);
/// assert_eq!(counter.get().map(|v| *v), Some(7));
/// ```
#[derive(Debug)]
pub struct SharedResource<T> {
    name: &'static str,
    slot: OnceLock<Arc<T>>,
}

impl<T> SharedResource<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            slot: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Store `value` unless the slot is already filled, and return whichever value won.
    pub fn initialize(&self, value: T) -> Arc<T> {
        let candidate = Arc::new(value);
        match self.slot.set(candidate.clone()) {
            Ok(()) => candidate,
            Err(_) => {
                SharedResourceAlreadyInitialized { name: self.name }.log();
                self.slot.get().cloned().unwrap_or(candidate)
            }
        }
    }

    pub fn get(&self) -> Option<Arc<T>> {
        self.slot.get().cloned()
    }

    pub fn is_initialized(&self) -> bool {
        self.slot.get().is_some()
    }
}
