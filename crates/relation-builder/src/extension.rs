// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use indexmap::IndexMap;
use relation_model::{
    FieldMap, FieldMapError, FilterFieldResolver, FilterFieldSpec, FilterInputType,
    FilterResolverRegistry, RelationFieldSpec,
};

use crate::{HostSchema, PolyBuildingError};

/// Everything the plugin adds to the host schema: relation fields on object types, filter fields
/// on existing filter types, new filter input types, and the resolvers behind the filter fields.
#[derive(Debug, Clone, Default)]
pub struct PolySchemaExtension {
    relation_fields: IndexMap<String, FieldMap<RelationFieldSpec>>,
    filter_fields: IndexMap<String, FieldMap<FilterFieldSpec>>,
    filter_input_types: IndexMap<String, FilterInputType>,
    resolvers: FilterResolverRegistry,
}

impl PolySchemaExtension {
    pub fn add_relation_field(
        &mut self,
        type_name: &str,
        field: RelationFieldSpec,
        host_schema: &HostSchema,
    ) -> Result<(), PolyBuildingError> {
        if host_schema.has_object_field(type_name, &field.name) {
            return Err(collision(type_name, &field.name));
        }

        self.relation_fields
            .entry(type_name.to_string())
            .or_default()
            .insert(field.name.clone(), field)
            .map_err(|e| map_collision(type_name, e))
    }

    /// Add a field to an existing filter type and register its resolver.
    pub fn add_filter_field(
        &mut self,
        field: FilterFieldSpec,
        host_schema: &HostSchema,
    ) -> Result<(), PolyBuildingError> {
        let filter_type = field.filter_type.clone();

        if host_schema.has_filter_field(&filter_type, &field.name) {
            return Err(collision(&filter_type, &field.name));
        }

        self.resolvers
            .register(&filter_type, &field.name, field.resolver.clone())
            .map_err(|e| map_collision(&filter_type, e))?;

        self.filter_fields
            .entry(filter_type.clone())
            .or_default()
            .insert(field.name.clone(), field)
            .map_err(|e| map_collision(&filter_type, e))
    }

    /// Add a new filter input type whose fields are compiled by the given resolvers.
    pub fn add_filter_input_type(
        &mut self,
        input_type: FilterInputType,
        resolvers: Vec<(String, Arc<dyn FilterFieldResolver>)>,
    ) -> Result<(), PolyBuildingError> {
        if self.filter_input_types.contains_key(&input_type.name) {
            return Err(PolyBuildingError::FilterTypeCollision(input_type.name));
        }

        for (field, resolver) in resolvers {
            self.resolvers
                .register(&input_type.name, &field, resolver)
                .map_err(|e| map_collision(&input_type.name, e))?;
        }

        self.filter_input_types
            .insert(input_type.name.clone(), input_type);
        Ok(())
    }

    pub fn relation_fields(&self, type_name: &str) -> Option<&FieldMap<RelationFieldSpec>> {
        self.relation_fields.get(type_name)
    }

    /// Object types gaining relation fields, with their fields
    pub fn relation_types(&self) -> impl Iterator<Item = (&str, &FieldMap<RelationFieldSpec>)> {
        self.relation_fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn filter_fields(&self, filter_type: &str) -> Option<&FieldMap<FilterFieldSpec>> {
        self.filter_fields.get(filter_type)
    }

    pub fn filter_types(&self) -> impl Iterator<Item = (&str, &FieldMap<FilterFieldSpec>)> {
        self.filter_fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn filter_input_type(&self, name: &str) -> Option<&FilterInputType> {
        self.filter_input_types.get(name)
    }

    pub fn filter_input_types(&self) -> impl Iterator<Item = &FilterInputType> {
        self.filter_input_types.values()
    }

    pub fn resolvers(&self) -> &FilterResolverRegistry {
        &self.resolvers
    }

    pub fn is_empty(&self) -> bool {
        self.relation_fields.is_empty()
            && self.filter_fields.is_empty()
            && self.filter_input_types.is_empty()
    }
}

fn collision(type_name: &str, field: &str) -> PolyBuildingError {
    PolyBuildingError::FieldNameCollision {
        type_name: type_name.to_string(),
        field: field.to_string(),
    }
}

fn map_collision(type_name: &str, error: FieldMapError) -> PolyBuildingError {
    match error {
        FieldMapError::Duplicate(field) => collision(type_name, &field),
    }
}
