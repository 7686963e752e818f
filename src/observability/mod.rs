// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging.
//!
//! This module provides centralized message types for all diagnostic and
//! operational logging in the task engine. Message types are plain structs with
//! a `Display` implementation, so log text lives in one place instead of being
//! scattered through the code as string literals.
//!
//! # Usage
//!
//! ```rust
//! use the_conveyor::observability::messages::{registry::PluginNotFound, StructuredLog};
//! use the_conveyor::registry::StageKind;
//!
//! PluginNotFound {
//!     kind: StageKind::Producer,
//!     type_name: "kafka",
//! }
//! .log();
//! ```

pub mod messages;
