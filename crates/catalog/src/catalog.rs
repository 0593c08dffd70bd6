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
use poly_sql::PhysicalTableName;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{CatalogError, RawCatalog, TagValue, Tags, parse_smart_comment};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableId(pub String);

impl std::fmt::Display for TableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Table,
    View,
    MaterializedView,
    Other,
}

impl TableKind {
    fn from_relkind(relkind: &str) -> Self {
        match relkind {
            "r" => TableKind::Table,
            "v" => TableKind::View,
            "m" => TableKind::MaterializedView,
            _ => TableKind::Other,
        }
    }

    /// Kinds that expose rows a relation can be built over
    pub fn is_selectable(&self) -> bool {
        !matches!(self, TableKind::Other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    PrimaryKey,
    Unique,
    ForeignKey,
    Check,
    Other,
}

impl ConstraintKind {
    fn from_contype(contype: &str) -> Self {
        match contype {
            "p" => ConstraintKind::PrimaryKey,
            "u" => ConstraintKind::Unique,
            "f" => ConstraintKind::ForeignKey,
            "c" => ConstraintKind::Check,
            _ => ConstraintKind::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub num: i16,
    pub type_name: String,
    pub not_null: bool,
    pub tags: Tags,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub name: String,
    pub kind: ConstraintKind,
    /// Key columns in key order
    pub columns: Vec<String>,
}

impl Constraint {
    /// Whether the key covers exactly `columns`, ignoring order.
    pub fn covers_exactly(&self, columns: &[&str]) -> bool {
        self.columns.len() == columns.len()
            && columns.iter().all(|c| self.columns.iter().any(|k| k == c))
            && self.columns.iter().all(|k| columns.contains(&k.as_str()))
    }
}

/// Actions an `@omit` tag can switch off for a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OmitAction {
    Create,
    Read,
    Update,
    Delete,
    Many,
    Filter,
    Order,
    Execute,
}

impl OmitAction {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "create" | "C" => OmitAction::Create,
            "read" | "R" => OmitAction::Read,
            "update" | "U" => OmitAction::Update,
            "delete" | "D" => OmitAction::Delete,
            "many" | "M" => OmitAction::Many,
            "filter" | "F" => OmitAction::Filter,
            "order" | "O" => OmitAction::Order,
            "execute" | "X" => OmitAction::Execute,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub id: TableId,
    pub name: String,
    pub schema: String,
    pub kind: TableKind,
    pub columns: Vec<Column>,
    pub constraints: Vec<Constraint>,
    pub tags: Tags,
    pub description: Option<String>,
}

impl Table {
    pub fn physical_name(&self) -> PhysicalTableName {
        PhysicalTableName::new(&self.name, Some(&self.schema))
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn primary_key(&self) -> Option<&Constraint> {
        self.constraints
            .iter()
            .find(|c| c.kind == ConstraintKind::PrimaryKey)
    }

    pub fn primary_key_columns(&self) -> Vec<&Column> {
        self.primary_key()
            .map(|pk| pk.columns.iter().filter_map(|c| self.column(c)).collect())
            .unwrap_or_default()
    }

    /// The primary-key column, if the primary key consists of exactly one column.
    pub fn single_primary_key(&self) -> Option<&Column> {
        match self.primary_key_columns().as_slice() {
            [column] => Some(*column),
            _ => None,
        }
    }

    /// Unique and primary-key constraints. A primary key is unique too, so both qualify when
    /// deciding whether a set of columns identifies at most one row.
    pub fn unique_constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints
            .iter()
            .filter(|c| matches!(c.kind, ConstraintKind::PrimaryKey | ConstraintKind::Unique))
    }

    /// Interprets the `@omit` tag. A bare `@omit` omits everything; otherwise the value is a
    /// comma-separated list of action names (`read,many`) or their one-letter forms.
    pub fn is_omitted(&self, action: OmitAction) -> bool {
        match self.tags.get("omit") {
            None => false,
            Some(TagValue::Bool(omit)) => *omit,
            Some(value) => value
                .values()
                .into_iter()
                .flat_map(|v| v.split(','))
                .filter_map(|v| OmitAction::from_name(v.trim()))
                .any(|a| a == action),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Procedure {
    pub name: String,
    pub schema: String,
}

/// Tables indexed by id, in catalog order, plus the procedures of every namespace.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: IndexMap<TableId, Table>,
    procedures: Vec<Procedure>,
}

impl Catalog {
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Self::from_raw(RawCatalog::from_json(json)?)
    }

    pub fn from_raw(raw: RawCatalog) -> Result<Self, CatalogError> {
        let namespaces: HashMap<&str, &str> = raw
            .namespaces
            .iter()
            .map(|n| (n.id.as_str(), n.name.as_str()))
            .collect();

        let mut tables = IndexMap::new();

        for class in raw.classes.iter() {
            let schema = namespaces.get(class.namespace_id.as_str()).ok_or_else(|| {
                CatalogError::UnknownNamespace {
                    class: class.name.clone(),
                    namespace_id: class.namespace_id.clone(),
                }
            })?;

            let (tags, description) = tags_and_description(class.comment.as_deref(), &class.tags);

            let id = TableId(class.id.clone());
            let table = Table {
                id: id.clone(),
                name: class.name.clone(),
                schema: schema.to_string(),
                kind: TableKind::from_relkind(&class.class_kind),
                columns: vec![],
                constraints: vec![],
                tags,
                description,
            };

            if tables.insert(id, table).is_some() {
                return Err(CatalogError::DuplicateClassId(class.id.clone()));
            }
        }

        // System columns carry non-positive attribute numbers
        for attribute in raw.attributes.iter().filter(|a| a.num > 0) {
            let table = tables
                .get_mut(&TableId(attribute.class_id.clone()))
                .ok_or_else(|| CatalogError::UnknownClass {
                    context: format!("Attribute `{}`", attribute.name),
                    class_id: attribute.class_id.clone(),
                })?;

            let (tags, description) =
                tags_and_description(attribute.comment.as_deref(), &attribute.tags);

            table.columns.push(Column {
                name: attribute.name.clone(),
                num: attribute.num,
                type_name: attribute.type_name.clone(),
                not_null: attribute.is_not_null,
                tags,
                description,
            });
        }

        for table in tables.values_mut() {
            table.columns.sort_by_key(|c| c.num);
        }

        for constraint in raw.constraints.iter() {
            let table = tables
                .get_mut(&TableId(constraint.class_id.clone()))
                .ok_or_else(|| CatalogError::UnknownClass {
                    context: format!("Constraint `{}`", constraint.name),
                    class_id: constraint.class_id.clone(),
                })?;

            let columns = constraint
                .key_attribute_nums
                .iter()
                .map(|num| {
                    table
                        .columns
                        .iter()
                        .find(|c| c.num == *num)
                        .map(|c| c.name.clone())
                        .ok_or_else(|| CatalogError::UnknownAttribute {
                            constraint: constraint.name.clone(),
                            num: *num,
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;

            table.constraints.push(Constraint {
                name: constraint.name.clone(),
                kind: ConstraintKind::from_contype(&constraint.kind),
                columns,
            });
        }

        let procedures = raw
            .procedures
            .iter()
            .map(|p| {
                namespaces
                    .get(p.namespace_id.as_str())
                    .map(|schema| Procedure {
                        name: p.name.clone(),
                        schema: schema.to_string(),
                    })
                    .ok_or_else(|| CatalogError::UnknownNamespace {
                        class: p.name.clone(),
                        namespace_id: p.namespace_id.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            tables = tables.len(),
            columns = tables.values().map(|t| t.columns.len()).sum::<usize>(),
            procedures = procedures.len(),
            "Normalized catalog"
        );

        Ok(Catalog { tables, procedures })
    }

    pub fn table(&self, id: &TableId) -> Option<&Table> {
        self.tables.get(id)
    }

    /// Tables in catalog order
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn procedures(&self) -> &[Procedure] {
        &self.procedures
    }
}

/// Tags from the comment, overridden by any tags supplied explicitly.
fn tags_and_description(comment: Option<&str>, explicit: &Tags) -> (Tags, Option<String>) {
    match comment {
        Some(comment) => {
            let (tags, description) = parse_smart_comment(comment);
            (tags.merged_with(explicit), description)
        }
        None => (explicit.clone(), None),
    }
}
