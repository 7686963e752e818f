// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use tracing::Span;

use crate::engine::TerminationSignal;
use crate::errors::StageError;
use crate::observability::messages::stage::RecordDiscarded;
use crate::observability::messages::StructuredLog;
use crate::record::Record;
use crate::registry::StageContext;
use crate::traits::Consumer;

/// Drops every record. Useful as a throughput baseline.
pub struct DiscardConsumer {
    span: Span,
    terminated: TerminationSignal,
}

impl DiscardConsumer {
    pub fn new(ctx: &StageContext) -> Self {
        Self {
            span: ctx.span.clone(),
            terminated: TerminationSignal::follow(&ctx.cancel),
        }
    }
}

#[async_trait]
impl Consumer for DiscardConsumer {
    async fn consume(&self, record: &Record) -> Result<(), StageError> {
        self.span.in_scope(|| RecordDiscarded { record }.log());
        Ok(())
    }

    fn terminated(&self) -> TerminationSignal {
        self.terminated.clone()
    }

    fn name(&self) -> &'static str {
        "discard"
    }
}
