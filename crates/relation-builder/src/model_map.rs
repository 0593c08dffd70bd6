// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::HashMap;

use indexmap::IndexMap;
use poly_catalog::{Catalog, Table, TableId};
use tracing::debug;

use crate::{
    PolyBuildingError, config::PolyRelationOptions, constraint_extractor::canonical,
    inflection::Inflector,
};

pub(crate) const SYSTEM_SCHEMAS: [&str; 2] = ["pg_catalog", "information_schema"];

/// Where a model's field lives in the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappedAttribute {
    Column(String),
    /// A computed field backed by the `<table>_<field>` function
    Procedure(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedTable {
    pub table: TableId,
    pub model_name: String,
    /// Keyed by singular camel-cased field name
    pub attributes: IndexMap<String, MappedAttribute>,
}

/// The mapping between model names (the values stored in `_type` columns) and tables.
#[derive(Debug, Clone, Default)]
pub struct ModelMap {
    by_model: IndexMap<String, MappedTable>,
    by_table: HashMap<TableId, String>,
    by_canonical: HashMap<String, String>,
}

impl ModelMap {
    pub fn build(
        catalog: &Catalog,
        options: &PolyRelationOptions,
        inflector: &dyn Inflector,
    ) -> Result<Self, PolyBuildingError> {
        let mut map = ModelMap::default();

        for table in catalog
            .tables()
            .filter(|t| t.kind.is_selectable() && options.includes_schema(&t.schema))
        {
            let model_name = inflector.table_type(table);

            if let Some(existing) = map.by_model.get(&model_name) {
                let first = catalog
                    .table(&existing.table)
                    .map(qualified_name)
                    .unwrap_or_else(|| existing.table.to_string());

                return Err(PolyBuildingError::DuplicateModelName {
                    model_name,
                    first,
                    second: qualified_name(table),
                });
            }

            let mapped = MappedTable {
                table: table.id.clone(),
                model_name: model_name.clone(),
                attributes: attributes(catalog, table, inflector),
            };

            let canonical_name = canonical(&model_name);
            if let Some(existing) = map.by_canonical.get(&canonical_name) {
                return Err(PolyBuildingError::AmbiguousModelName {
                    canonical: canonical_name,
                    first: existing.clone(),
                    second: model_name,
                });
            }

            map.by_table.insert(table.id.clone(), model_name.clone());
            map.by_canonical.insert(canonical_name, model_name.clone());
            map.by_model.insert(model_name, mapped);
        }

        debug!(models = map.by_model.len(), "Mapped model names to tables");

        Ok(map)
    }

    pub fn map_model_name_to_table(&self, model_name: &str) -> Option<&MappedTable> {
        self.by_model.get(model_name)
    }

    pub fn map_table_to_model_name(&self, table: &TableId) -> Option<&str> {
        self.by_table.get(table).map(|name| name.as_str())
    }

    /// Look up a model by the canonical form of its name (see [canonical]).
    pub fn resolve_canonical(&self, canonical_name: &str) -> Option<&MappedTable> {
        self.by_canonical
            .get(canonical_name)
            .and_then(|model_name| self.by_model.get(model_name))
    }

    pub fn resolve_attribute(&self, model_name: &str, field: &str) -> Option<&MappedAttribute> {
        self.map_model_name_to_table(model_name)
            .and_then(|mapped| mapped.attributes.get(field))
    }

    pub fn model_names(&self) -> impl Iterator<Item = &str> {
        self.by_model.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.by_model.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_model.is_empty()
    }
}

fn qualified_name(table: &Table) -> String {
    format!("{}.{}", table.schema, table.name)
}

// Procedures first, so that a column wins over a function of the same field name
fn attributes(
    catalog: &Catalog,
    table: &Table,
    inflector: &dyn Inflector,
) -> IndexMap<String, MappedAttribute> {
    let prefix = format!("{}_", table.name);
    let field_key = |name: &str| inflector.singularize(&inflector.camel_case(name));

    let procedures = catalog.procedures().iter().filter_map(|procedure| {
        procedure
            .name
            .strip_prefix(&prefix)
            .map(|field| (field_key(field), MappedAttribute::Procedure(procedure.name.clone())))
    });

    let columns = table
        .columns
        .iter()
        .map(|column| (field_key(&column.name), MappedAttribute::Column(column.name.clone())));

    procedures.chain(columns).collect()
}
