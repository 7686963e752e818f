// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! [`StructuredLog`] to emit it at its documented level with structured fields.
//!
//! # Organization
//!
//! * `registry` - plugin registration, resolution and shared resources
//! * `task` - task lifecycle and worker pool events
//! * `stage` - per-record stage failures and construction fallbacks
//!
//! # Usage Pattern
//!
//! ```rust
//! use the_conveyor::observability::messages::{task::TaskStarted, StructuredLog};
//!
//! let msg = TaskStarted {
//!     task: "orders",
//!     thread_count: 4,
//!     transform_count: 2,
//!     consumer_count: 1,
//! };
//!
//! msg.log();
//! ```

use tracing::Span;

pub mod registry;
pub mod stage;
pub mod task;

/// A log event with a fixed level and a fixed set of structured fields.
pub trait StructuredLog {
    /// Emit the event at its documented level.
    fn log(&self);

    /// A span carrying the same fields, for scoping work under this event.
    fn span(&self, name: &str) -> Span;
}
