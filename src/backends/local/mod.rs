// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-process adapters and their registration.
//!
//! | kind      | type name      | notes                                         |
//! |-----------|----------------|-----------------------------------------------|
//! | producer  | `static`       | values from metadata, optionally on a loop    |
//! | producer  | `file`         | one raw record per line                       |
//! | producer  | `stdin`        | one raw record per line                       |
//! | transform | `json`         | raw to single                                 |
//! | transform | `json_array`   | raw to batch                                  |
//! | transform | `sequence_id`  | own or process-wide id sequence               |
//! | transform | `copy_field`   | payload field into metadata                   |
//! | transform | `set_metadata` | constant metadata entries                     |
//! | consumer  | `discard`      | drops records                                 |
//! | consumer  | `log`          | info log per record                           |
//! | consumer  | `jsonl`        | appends JSON lines to a file                  |

pub mod consumers;
pub mod producers;
pub mod transforms;

use std::sync::Arc;

use crate::registry::Registry;
use crate::traits::{Consumer, Producer, Transform};
use crate::utils::SharedResource;

pub use consumers::{DiscardConsumer, JsonLinesConsumer, LogConsumer};
pub use producers::{FileProducer, StaticProducer, StdinProducer};
pub use transforms::{
    CopyFieldTransform, JsonArrayTransform, JsonTransform, SequenceGenerator,
    SequenceIdTransform, SetMetadataTransform,
};

/// Process-wide state the built-in adapters draw on.
///
/// Cloning shares the same slots.
#[derive(Debug, Clone)]
pub struct LocalResources {
    sequence: Arc<SharedResource<SequenceGenerator>>,
}

impl LocalResources {
    pub fn new() -> Self {
        Self {
            sequence: Arc::new(SharedResource::new("sequence")),
        }
    }

    /// Initialize the generator used by `sequence_id` stages with `shared: true`.
    ///
    /// Only the first call takes effect; the generator in use is returned.
    pub fn init_sequence(&self, start: u64, step: u64) -> Arc<SequenceGenerator> {
        self.sequence.initialize(SequenceGenerator::new(start, step))
    }

    pub fn sequence(&self) -> Option<Arc<SequenceGenerator>> {
        self.sequence.get()
    }
}

impl Default for LocalResources {
    fn default() -> Self {
        Self::new()
    }
}

/// Register every built-in adapter into `registry`.
pub fn register_builtins(registry: &mut Registry, resources: &LocalResources) {
    registry.producers.register("static", |spec, ctx| {
        Ok(Arc::new(StaticProducer::from_spec(spec, &ctx)?) as Arc<dyn Producer>)
    });
    registry.producers.register("file", |spec, ctx| {
        Ok(Arc::new(FileProducer::from_spec(spec, &ctx)?) as Arc<dyn Producer>)
    });
    registry.producers.register("stdin", |spec, ctx| {
        Ok(Arc::new(StdinProducer::from_spec(spec, &ctx)?) as Arc<dyn Producer>)
    });

    registry
        .transforms
        .register("json", |_spec, _ctx| Ok(Arc::new(JsonTransform) as Arc<dyn Transform>));
    registry.transforms.register("json_array", |_spec, _ctx| {
        Ok(Arc::new(JsonArrayTransform) as Arc<dyn Transform>)
    });
    {
        let sequence = resources.sequence.clone();
        registry.transforms.register("sequence_id", move |spec, _ctx| {
            Ok(Arc::new(SequenceIdTransform::from_spec(spec, &sequence)?) as Arc<dyn Transform>)
        });
    }
    registry.transforms.register("copy_field", |spec, _ctx| {
        Ok(Arc::new(CopyFieldTransform::from_spec(spec)?) as Arc<dyn Transform>)
    });
    registry.transforms.register("set_metadata", |spec, _ctx| {
        Ok(Arc::new(SetMetadataTransform::from_spec(spec)?) as Arc<dyn Transform>)
    });

    registry.consumers.register("discard", |_spec, ctx| {
        Ok(Arc::new(DiscardConsumer::new(&ctx)) as Arc<dyn Consumer>)
    });
    registry
        .consumers
        .register("log", |_spec, ctx| Ok(Arc::new(LogConsumer::new(&ctx)) as Arc<dyn Consumer>));
    registry.consumers.register("jsonl", |spec, ctx| {
        Ok(Arc::new(JsonLinesConsumer::from_spec(spec, &ctx)?) as Arc<dyn Consumer>)
    });
}
