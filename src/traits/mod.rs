// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Capability interfaces implemented by every pluggable stage.
//!
//! Stage instances are built once per task and shared by all of its workers,
//! so each trait requires `Send + Sync` and each implementation owns its
//! internal thread-safety.
//!
//! Cancellation is cooperative. Every constructor receives the task's
//! cancellation token through [`StageContext`](crate::registry::StageContext);
//! stages must observe it and return promptly. The task never interrupts a
//! stage that ignores it.

pub mod consumer;
pub mod producer;
pub mod transform;

pub use consumer::Consumer;
pub use producer::Producer;
pub use transform::Transform;
