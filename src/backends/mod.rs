// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Stage adapter implementations.
//!
//! # Available Backends
//!
//! ## Local Backend
//! In-process producers, transforms and consumers registered through
//! [`local::register_builtins`]. Stateful adapters draw process-wide state
//! from [`local::LocalResources`], captured at registration time.
//!
//! ## Stub Backend (Test-Only)
//! Deterministic stages for engine tests (only available in test builds):
//! - **VecProducer / PendingProducer**: finite and cancellation-bound sources
//! - **CollectingConsumer**: records every delivery
//! - **PanickingTransform / FailingTransform / FailingConsumer**: fault barrier tests
//!
//! # Example
//! ```rust
//! use the_conveyor::backends::local::{register_builtins, LocalResources};
//! use the_conveyor::registry::Registry;
//!
//! let mut registry = Registry::new();
//! register_builtins(&mut registry, &LocalResources::new());
//!
//! assert!(registry.producers.contains("static"));
//! assert!(registry.transforms.contains("sequence_id"));
//! assert!(registry.consumers.contains("jsonl"));
//! ```

pub mod local;
#[cfg(test)]
pub mod stub;
