// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! What the plugin needs to know about the host schema builder it runs inside.

use std::collections::{BTreeSet, HashMap, HashSet};

/// The host's connection-filter plugin, which owns the `<Type>Filter` input types and compiles
/// filter values into SQL.
pub const CONNECTION_FILTER: &str = "connection-filter";

/// Plugins the host has loaded.
#[derive(Debug, Clone, Default)]
pub struct HostCapabilities {
    plugins: BTreeSet<String>,
}

impl HostCapabilities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, plugin: &str) -> Self {
        self.plugins.insert(plugin.to_string());
        self
    }

    pub fn has(&self, plugin: &str) -> bool {
        self.plugins.contains(plugin)
    }
}

/// Fields the host has already defined, per object type and per filter type. Synthesized fields
/// must not reuse these names.
#[derive(Debug, Clone, Default)]
pub struct HostSchema {
    object_fields: HashMap<String, HashSet<String>>,
    filter_fields: HashMap<String, HashSet<String>>,
}

impl HostSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object_fields<'a>(
        mut self,
        type_name: &str,
        fields: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        self.object_fields
            .entry(type_name.to_string())
            .or_default()
            .extend(fields.into_iter().map(|f| f.to_string()));
        self
    }

    pub fn with_filter_fields<'a>(
        mut self,
        filter_type: &str,
        fields: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        self.filter_fields
            .entry(filter_type.to_string())
            .or_default()
            .extend(fields.into_iter().map(|f| f.to_string()));
        self
    }

    pub fn has_object_field(&self, type_name: &str, field: &str) -> bool {
        self.object_fields
            .get(type_name)
            .is_some_and(|fields| fields.contains(field))
    }

    pub fn has_filter_field(&self, filter_type: &str, field: &str) -> bool {
        self.filter_fields
            .get(filter_type)
            .is_some_and(|fields| fields.contains(field))
    }
}
