// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::StageSpec;
use crate::errors::StageError;
use crate::observability::messages::registry::{DuplicateRegistration, PluginNotFound};
use crate::observability::messages::StructuredLog;
use crate::registry::{StageContext, StageKind};

/// Builds one stage instance from its spec and the owning task's context.
pub type Constructor<T> =
    Arc<dyn Fn(&StageSpec, StageContext) -> Result<Arc<T>, StageError> + Send + Sync>;

/// Type-name to constructor mapping for one capability kind.
///
/// The first registration for a name wins; later registrations under the same
/// name are ignored with a warning.
pub struct PluginRegistry<T: ?Sized> {
    kind: StageKind,
    constructors: HashMap<String, Constructor<T>>,
}

impl<T: ?Sized> PluginRegistry<T> {
    pub fn new(kind: StageKind) -> Self {
        Self {
            kind,
            constructors: HashMap::new(),
        }
    }

    pub fn kind(&self) -> StageKind {
        self.kind
    }

    /// Register `constructor` under `type_name`. Returns false if the name was already taken.
    pub fn register<F>(&mut self, type_name: impl Into<String>, constructor: F) -> bool
    where
        F: Fn(&StageSpec, StageContext) -> Result<Arc<T>, StageError> + Send + Sync + 'static,
    {
        let type_name = type_name.into();
        if self.constructors.contains_key(&type_name) {
            DuplicateRegistration {
                kind: self.kind,
                type_name: &type_name,
            }
            .log();
            return false;
        }

        self.constructors.insert(type_name, Arc::new(constructor));
        true
    }

    /// Look up the constructor for `type_name`, warning when none is registered.
    pub fn resolve(&self, type_name: &str) -> Option<Constructor<T>> {
        let constructor = self.constructors.get(type_name).cloned();
        if constructor.is_none() {
            PluginNotFound {
                kind: self.kind,
                type_name,
            }
            .log();
        }
        constructor
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.constructors.contains_key(type_name)
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl<T: ?Sized> std::fmt::Debug for PluginRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("kind", &self.kind)
            .field("type_names", &self.type_names())
            .finish()
    }
}
