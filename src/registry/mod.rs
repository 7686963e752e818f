// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Plugin registries mapping stage type names to constructors.
//!
//! A [`Registry`] is built once at process start, filled by each adapter
//! module's registration function, and then passed by reference into task
//! construction. Nothing is global, so tests can build isolated registries.
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use the_conveyor::errors::StageError;
//! use the_conveyor::record::Record;
//! use the_conveyor::registry::Registry;
//! use the_conveyor::traits::Transform;
//!
//! struct Noop;
//!
//! impl Transform for Noop {
//!     fn apply(&self, _record: &mut Record) -> Result<(), StageError> {
//!         Ok(())
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "noop"
//!     }
//! }
//!
//! let mut registry = Registry::new();
//! assert!(registry.transforms.register("noop", |_spec, _ctx| Ok(Arc::new(Noop) as Arc<dyn Transform>)));
//! assert!(!registry.transforms.register("noop", |_spec, _ctx| Ok(Arc::new(Noop) as Arc<dyn Transform>)));
//! assert!(registry.transforms.resolve("noop").is_some());
//! ```

mod plugin_registry;

pub use plugin_registry::{Constructor, PluginRegistry};

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio_util::sync::CancellationToken;
use tracing::Span;

use crate::traits::{Consumer, Producer, Transform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Producer,
    Transform,
    Consumer,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StageKind::Producer => "producer",
            StageKind::Transform => "transform",
            StageKind::Consumer => "consumer",
        };
        f.write_str(name)
    }
}

/// Everything a constructor receives besides its spec.
///
/// `cancel` is the owning task's cancellation token. Stages must observe it and
/// return promptly once it fires; the task will not interrupt them. `span` is
/// the logger for the stage, already carrying the task and stage fields.
#[derive(Clone, Debug)]
pub struct StageContext {
    pub cancel: CancellationToken,
    pub span: Span,
}

impl StageContext {
    pub fn new(cancel: CancellationToken, span: Span) -> Self {
        Self { cancel, span }
    }
}

/// The three independent registries, one per capability kind.
pub struct Registry {
    pub producers: PluginRegistry<dyn Producer>,
    pub transforms: PluginRegistry<dyn Transform>,
    pub consumers: PluginRegistry<dyn Consumer>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            producers: PluginRegistry::new(StageKind::Producer),
            transforms: PluginRegistry::new(StageKind::Transform),
            consumers: PluginRegistry::new(StageKind::Consumer),
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("producers", &self.producers.type_names())
            .field("transforms", &self.transforms.type_names())
            .field("consumers", &self.consumers.type_names())
            .finish()
    }
}
