// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for plugin registration and resolution.

use crate::observability::messages::StructuredLog;
use crate::registry::StageKind;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A constructor was registered under a type name that is already taken.
///
/// # Log Level
/// `warn!` - The first registration stays in effect
///
/// # Example
/// ```
/// use the_conveyor::observability::messages::registry::DuplicateRegistration;
/// use the_conveyor::registry::StageKind;
///
/// let msg = DuplicateRegistration {
///     kind: StageKind::Consumer,
///     type_name: "log",
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct DuplicateRegistration<'a> {
    pub kind: StageKind,
    pub type_name: &'a str,
}

impl Display for DuplicateRegistration<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} constructor '{}' already registered, keeping the first",
            self.kind, self.type_name
        )
    }
}

impl StructuredLog for DuplicateRegistration<'_> {
    fn log(&self) {
        tracing::warn!(
            stage_kind = %self.kind,
            stage_type = self.type_name,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "duplicate_registration",
            span_name = name,
            stage_kind = %self.kind,
            stage_type = self.type_name,
        )
    }
}

/// Lookup of a type name with no registered constructor.
///
/// # Log Level
/// `warn!` - Fatal for producers and consumers, the stage is skipped for transforms
pub struct PluginNotFound<'a> {
    pub kind: StageKind,
    pub type_name: &'a str,
}

impl Display for PluginNotFound<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{} constructor '{}' not found", self.kind, self.type_name)
    }
}

impl StructuredLog for PluginNotFound<'_> {
    fn log(&self) {
        tracing::warn!(
            stage_kind = %self.kind,
            stage_type = self.type_name,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "plugin_not_found",
            span_name = name,
            stage_kind = %self.kind,
            stage_type = self.type_name,
        )
    }
}

/// A shared resource was initialized a second time; the second value is dropped.
///
/// # Log Level
/// `warn!`
pub struct SharedResourceAlreadyInitialized<'a> {
    pub name: &'a str,
}

impl Display for SharedResourceAlreadyInitialized<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "shared resource '{}' already initialized", self.name)
    }
}

impl StructuredLog for SharedResourceAlreadyInitialized<'_> {
    fn log(&self) {
        tracing::warn!(resource = self.name, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("shared_resource", span_name = name, resource = self.name)
    }
}
