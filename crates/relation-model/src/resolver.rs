// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{fmt::Debug, sync::Arc};

use indexmap::IndexMap;
use poly_sql::{AliasGenerator, Predicate, TableAlias};
use serde_json::Value;

use crate::{FieldMap, FieldMapError, FilterResolveError};

/// What a resolver gets to see of the filter field it is asked to compile.
///
/// For `{ locationAsNoteable: { id: { equalTo: 5 } } }` applied to notes under `notes_1`:
/// - source_alias: `notes_1`
/// - field_name: `locationAsNoteable`
/// - value: `{ id: { equalTo: 5 } }`
#[derive(Debug, Clone, Copy)]
pub struct ResolveFieldProps<'a> {
    pub source_alias: &'a TableAlias,
    pub field_name: &'a str,
    pub value: &'a Value,
    pub aliases: &'a AliasGenerator,
}

/// The host's generic filter compiler. Given a filter object for a filter type, it combines the
/// fragments of its fields (dispatching to registered resolvers for fields it does not know
/// itself). `Ok(None)` means the filter constrains nothing.
pub trait FilterCompiler {
    fn compile(
        &self,
        filter_type: &str,
        value: &Value,
        alias: &TableAlias,
        aliases: &AliasGenerator,
    ) -> Result<Option<Predicate>, FilterResolveError>;
}

/// Compiles the value of one synthesized filter field into a predicate over `source_alias`.
pub trait FilterFieldResolver: Debug + Send + Sync {
    fn resolve(
        &self,
        props: ResolveFieldProps<'_>,
        compiler: &dyn FilterCompiler,
    ) -> Result<Option<Predicate>, FilterResolveError>;
}

/// Resolvers keyed by filter type name and field name.
#[derive(Debug, Clone, Default)]
pub struct FilterResolverRegistry {
    resolvers: IndexMap<String, FieldMap<Arc<dyn FilterFieldResolver>>>,
}

impl FilterResolverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        filter_type: &str,
        field_name: &str,
        resolver: Arc<dyn FilterFieldResolver>,
    ) -> Result<(), FieldMapError> {
        self.resolvers
            .entry(filter_type.to_string())
            .or_default()
            .insert(field_name, resolver)
    }

    pub fn get(&self, filter_type: &str, field_name: &str) -> Option<&Arc<dyn FilterFieldResolver>> {
        self.resolvers
            .get(filter_type)
            .and_then(|fields| fields.get(field_name))
    }

    pub fn filter_types(&self) -> impl Iterator<Item = &str> {
        self.resolvers.keys().map(|k| k.as_str())
    }

    pub fn fields(&self, filter_type: &str) -> impl Iterator<Item = &str> {
        self.resolvers
            .get(filter_type)
            .into_iter()
            .flat_map(|fields| fields.names())
    }

    pub fn len(&self) -> usize {
        self.resolvers.values().map(|fields| fields.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Compile a field of `filter_type` through its registered resolver.
    pub fn resolve(
        &self,
        filter_type: &str,
        props: ResolveFieldProps<'_>,
        compiler: &dyn FilterCompiler,
    ) -> Result<Option<Predicate>, FilterResolveError> {
        let resolver =
            self.get(filter_type, props.field_name)
                .ok_or_else(|| FilterResolveError::UnknownField {
                    filter_type: filter_type.to_string(),
                    field: props.field_name.to_string(),
                })?;

        resolver.resolve(props, compiler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Constant(bool);

    impl FilterFieldResolver for Constant {
        fn resolve(
            &self,
            _props: ResolveFieldProps<'_>,
            _compiler: &dyn FilterCompiler,
        ) -> Result<Option<Predicate>, FilterResolveError> {
            Ok(Some(self.0.into()))
        }
    }

    struct NoCompiler;

    impl FilterCompiler for NoCompiler {
        fn compile(
            &self,
            _filter_type: &str,
            _value: &Value,
            _alias: &TableAlias,
            _aliases: &AliasGenerator,
        ) -> Result<Option<Predicate>, FilterResolveError> {
            Ok(None)
        }
    }

    #[test]
    fn dispatches_by_type_and_field() {
        let mut registry = FilterResolverRegistry::new();
        registry
            .register("NoteFilter", "locationAsNoteable", Arc::new(Constant(true)))
            .unwrap();
        registry
            .register("LocationFilter", "notes", Arc::new(Constant(false)))
            .unwrap();

        assert_eq!(
            registry.register("NoteFilter", "locationAsNoteable", Arc::new(Constant(false))),
            Err(FieldMapError::Duplicate("locationAsNoteable".to_string()))
        );
        assert_eq!(registry.len(), 2);

        let alias = TableAlias::new("notes_1");
        let aliases = AliasGenerator::new();
        let value = Value::Null;
        let props = |field_name| ResolveFieldProps {
            source_alias: &alias,
            field_name,
            value: &value,
            aliases: &aliases,
        };

        assert_eq!(
            registry.resolve("NoteFilter", props("locationAsNoteable"), &NoCompiler),
            Ok(Some(Predicate::True))
        );
        assert_eq!(
            registry.resolve("NoteFilter", props("notes"), &NoCompiler),
            Err(FilterResolveError::UnknownField {
                filter_type: "NoteFilter".to_string(),
                field: "notes".to_string()
            })
        );
    }
}
