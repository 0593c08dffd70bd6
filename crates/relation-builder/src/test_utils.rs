// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Fixtures shared by the unit and integration tests: a small catalog with polymorphic
//! associations, a stand-in for the host's filter compiler, and an in-memory evaluator for the
//! synthesized predicates.

use std::{cmp::Ordering, collections::HashMap};

use heck::ToSnakeCase;
use poly_catalog::{Catalog, TableId};
use poly_sql::{AliasGenerator, Column, Predicate, TableAlias};
use relation_model::{FilterCompiler, FilterResolveError, FilterResolverRegistry, ResolveFieldProps};
use serde_json::{Map, Value, json};

use crate::{
    BuildInputs, HostCapabilities, HostSchema, PolyBuildingError, PolyRelationPlugin,
    PolySchemaExtension, config::PolyRelationOptions, inflection::DefaultInflector,
};

/// Table ids in the fixture catalog are the table names.
pub fn id(table: &str) -> TableId {
    TableId(table.to_string())
}

/// The fixture catalog as introspection JSON:
///
/// - `locations`, `workflows`: plain targets
/// - `notes.noteable_*`: may point at `Location` and `Workflow`, many notes per target
/// - `profiles.owner_*`: may point at `Location`, unique per target
/// - `taggings.taggable_*`: backward name `taggings`, targets `Location` (twice, differently
///   spelled), `Pair` (composite primary key) and `Missing` (no such table)
/// - `private.secrets`: outside the default schema list
pub fn raw_catalog() -> Value {
    let class = |name: &str, namespace: &str| {
        json!({"id": name, "name": name, "namespaceId": namespace, "classKind": "r"})
    };
    let attribute = |class: &str, num: i16, name: &str, type_name: &str| {
        json!({"classId": class, "num": num, "name": name, "typeName": type_name})
    };
    let constraint = |class: &str, name: &str, kind: &str, keys: &[i16]| {
        json!({"id": name, "name": name, "classId": class, "kind": kind, "keyAttributeNums": keys})
    };

    let mut notes_type = attribute("notes", 4, "noteable_type", "text");
    notes_type["comment"] =
        json!("@isPolymorphic\n@polymorphicTo Location\n@polymorphicTo Workflow\n@polymorphicTo Location\nWhat the note is attached to");

    let mut owner_type = attribute("profiles", 3, "owner_type", "text");
    owner_type["tags"] = json!({"isPolymorphic": true, "polymorphicTo": "Location"});

    let mut taggable_type = attribute("taggings", 3, "taggable_type", "text");
    taggable_type["comment"] = json!(
        "@isPolymorphic taggings\n@polymorphicTo public.Location\n@polymorphicTo location\n@polymorphicTo Pair\n@polymorphicTo Missing"
    );

    json!({
        "namespaces": [
            {"id": "public", "name": "public"},
            {"id": "private", "name": "private"},
            {"id": "pg_catalog", "name": "pg_catalog"}
        ],
        "classes": [
            class("locations", "public"),
            class("workflows", "public"),
            class("notes", "public"),
            class("profiles", "public"),
            class("taggings", "public"),
            class("pairs", "public"),
            class("secrets", "private"),
            class("pg_type", "pg_catalog")
        ],
        "attributes": [
            attribute("locations", 1, "id", "int4"),
            attribute("locations", 2, "name", "text"),
            attribute("workflows", 1, "id", "int4"),
            attribute("workflows", 2, "title", "text"),
            attribute("notes", 1, "id", "int4"),
            attribute("notes", 2, "body", "text"),
            attribute("notes", 3, "noteable_id", "int4"),
            notes_type,
            attribute("notes", 5, "kind_type", "text"),
            attribute("notes", 6, "created_at", "timestamptz"),
            attribute("profiles", 1, "id", "int4"),
            attribute("profiles", 2, "owner_id", "int4"),
            owner_type,
            attribute("taggings", 1, "id", "int4"),
            attribute("taggings", 2, "taggable_id", "int4"),
            taggable_type,
            attribute("pairs", 1, "a", "int4"),
            attribute("pairs", 2, "b", "int4"),
            attribute("secrets", 1, "id", "int4"),
            attribute("pg_type", 1, "oid", "oid")
        ],
        "constraints": [
            constraint("locations", "locations_pkey", "p", &[1]),
            constraint("workflows", "workflows_pkey", "p", &[1]),
            constraint("notes", "notes_pkey", "p", &[1]),
            constraint("profiles", "profiles_pkey", "p", &[1]),
            constraint("profiles", "profiles_owner_key", "u", &[2, 3]),
            constraint("taggings", "taggings_pkey", "p", &[1]),
            constraint("pairs", "pairs_pkey", "p", &[1, 2]),
            constraint("secrets", "secrets_pkey", "p", &[1])
        ],
        "procedures": [
            {"id": "p1", "name": "locations_visit_counts", "namespaceId": "public"},
            {"id": "p2", "name": "locations_name", "namespaceId": "public"}
        ]
    })
}

pub fn catalog() -> Catalog {
    Catalog::from_json(&raw_catalog().to_string()).unwrap()
}

/// Run the full plugin over the fixture catalog.
pub fn build(
    options: &PolyRelationOptions,
    capabilities: &HostCapabilities,
) -> Result<PolySchemaExtension, PolyBuildingError> {
    build_with_host(options, capabilities, &HostSchema::default())
}

pub fn build_with_host(
    options: &PolyRelationOptions,
    capabilities: &HostCapabilities,
    host_schema: &HostSchema,
) -> Result<PolySchemaExtension, PolyBuildingError> {
    let catalog = catalog();
    let inputs = BuildInputs {
        catalog: &catalog,
        options,
        inflector: &DefaultInflector,
        capabilities,
        host_schema,
    };

    PolyRelationPlugin::default().build(&inputs)
}

/// Both filter directions on, with the connection-filter capability present.
pub fn filter_options() -> PolyRelationOptions {
    PolyRelationOptions::default()
        .with_filter_forward(true)
        .with_filter_backward(true)
}

/// A minimal filter compiler: fields registered in the registry go to their resolver, anything
/// else is a column compared through `equalTo`, `notEqualTo`, `lessThan` or `greaterThan`.
pub struct TestFilterCompiler<'a> {
    pub registry: &'a FilterResolverRegistry,
}

impl FilterCompiler for TestFilterCompiler<'_> {
    fn compile(
        &self,
        filter_type: &str,
        value: &Value,
        alias: &TableAlias,
        aliases: &AliasGenerator,
    ) -> Result<Option<Predicate>, FilterResolveError> {
        let Some(fields) = value.as_object() else {
            return Ok(None);
        };

        let mut predicates = vec![];
        for (field, field_value) in fields {
            let predicate = if self.registry.get(filter_type, field).is_some() {
                let props = ResolveFieldProps {
                    source_alias: alias,
                    field_name: field,
                    value: field_value,
                    aliases,
                };
                self.registry.resolve(filter_type, props, self)?
            } else {
                operator_predicate(field, field_value, alias)?
            };
            predicates.extend(predicate);
        }

        Ok((!predicates.is_empty()).then(|| Predicate::all(predicates)))
    }
}

fn operator_predicate(
    field: &str,
    value: &Value,
    alias: &TableAlias,
) -> Result<Option<Predicate>, FilterResolveError> {
    let Some(operators) = value.as_object() else {
        return Ok(None);
    };

    let column = || Column::physical(field.to_snake_case(), alias);
    let predicates = operators
        .iter()
        .map(|(operator, operand)| {
            let operand = param(operand);
            match operator.as_str() {
                "equalTo" => Ok(Predicate::eq(column(), operand)),
                "notEqualTo" => Ok(Predicate::neq(column(), operand)),
                "lessThan" => Ok(Predicate::Lt(column(), operand)),
                "greaterThan" => Ok(Predicate::Gt(column(), operand)),
                _ => Err(FilterResolveError::UnknownField {
                    filter_type: field.to_string(),
                    field: operator.clone(),
                }),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok((!predicates.is_empty()).then(|| Predicate::all(predicates)))
}

fn param(value: &Value) -> Column {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(n) => Column::param(n),
            None => Column::param(n.as_f64().unwrap()),
        },
        Value::String(s) => Column::param(s.clone()),
        Value::Bool(b) => Column::param(*b),
        _ => Column::Null,
    }
}

pub type Row = Map<String, Value>;

/// Table rows keyed by table name, against which predicates are evaluated the way PostgreSQL
/// would (minus three-valued logic: comparisons involving NULL are false).
#[derive(Debug, Default)]
pub struct TestDatabase {
    tables: HashMap<String, Vec<Row>>,
}

impl TestDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(mut self, table: &str, rows: Value) -> Self {
        let rows = rows
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row.as_object().unwrap().clone())
            .collect();
        self.tables.insert(table.to_string(), rows);
        self
    }

    pub fn rows(&self, table: &str) -> &[Row] {
        self.tables.get(table).map(|rows| rows.as_slice()).unwrap_or(&[])
    }

    /// The rows of `table`, bound to `alias`, for which `predicate` holds
    pub fn select(&self, table: &str, alias: &TableAlias, predicate: &Predicate) -> Vec<&Row> {
        self.select_with(table, alias, predicate, &[])
    }

    /// Like [TestDatabase::select], with `outer` rows bound to their aliases (the parent row of a
    /// relation, for example)
    pub fn select_with<'a>(
        &'a self,
        table: &str,
        alias: &TableAlias,
        predicate: &Predicate,
        outer: &[(&TableAlias, &'a Row)],
    ) -> Vec<&'a Row> {
        self.rows(table)
            .iter()
            .filter(|row| {
                let mut env: Vec<_> = outer
                    .iter()
                    .map(|(alias, row)| (alias.as_str().to_string(), *row))
                    .collect();
                env.push((alias.as_str().to_string(), *row));
                self.eval(predicate, &mut env)
            })
            .collect()
    }

    /// Ids of the rows of `table` for which `predicate` holds
    pub fn select_ids(&self, table: &str, alias: &TableAlias, predicate: &Predicate) -> Vec<i64> {
        self.select(table, alias, predicate)
            .into_iter()
            .filter_map(|row| row.get("id").and_then(Value::as_i64))
            .collect()
    }

    fn eval<'a>(&'a self, predicate: &Predicate, env: &mut Vec<(String, &'a Row)>) -> bool {
        match predicate {
            Predicate::True => true,
            Predicate::False => false,
            Predicate::Eq(l, r) => self.compare(l, r, env) == Some(Ordering::Equal),
            Predicate::Neq(l, r) => {
                matches!(self.compare(l, r, env), Some(o) if o != Ordering::Equal)
            }
            Predicate::Lt(l, r) => self.compare(l, r, env) == Some(Ordering::Less),
            Predicate::Lte(l, r) => {
                matches!(self.compare(l, r, env), Some(Ordering::Less | Ordering::Equal))
            }
            Predicate::Gt(l, r) => self.compare(l, r, env) == Some(Ordering::Greater),
            Predicate::Gte(l, r) => {
                matches!(self.compare(l, r, env), Some(Ordering::Greater | Ordering::Equal))
            }
            Predicate::Exists(select) => {
                let alias = select.from.alias.as_str().to_string();
                self.rows(&select.from.name.name).iter().any(|row| {
                    env.push((alias.clone(), row));
                    let result = self.eval(&select.predicate, env);
                    env.pop();
                    result
                })
            }
            Predicate::And(l, r) => self.eval(l, env) && self.eval(r, env),
            Predicate::Or(l, r) => self.eval(l, env) || self.eval(r, env),
            Predicate::Not(p) => !self.eval(p, env),
        }
    }

    fn compare(&self, l: &Column, r: &Column, env: &[(String, &Row)]) -> Option<Ordering> {
        let (l, r) = (value(l, env), value(r, env));
        match (&l, &r) {
            (Value::Number(l), Value::Number(r)) => l.as_f64()?.partial_cmp(&r.as_f64()?),
            (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
            (Value::Bool(l), Value::Bool(r)) => Some(l.cmp(r)),
            _ => None,
        }
    }
}

fn value(column: &Column, env: &[(String, &Row)]) -> Value {
    match column {
        Column::Physical {
            column_name,
            table_alias,
        } => env
            .iter()
            .rev()
            .find(|(alias, _)| alias == table_alias.as_str())
            .and_then(|(_, row)| row.get(column_name).cloned())
            .unwrap_or(Value::Null),
        Column::Param(param) => {
            let param = param.param();
            let any = param.as_ref().as_any();
            if let Some(s) = any.downcast_ref::<String>() {
                json!(s)
            } else if let Some(n) = any.downcast_ref::<i64>() {
                json!(n)
            } else if let Some(n) = any.downcast_ref::<i32>() {
                json!(n)
            } else if let Some(n) = any.downcast_ref::<f64>() {
                json!(n)
            } else if let Some(b) = any.downcast_ref::<bool>() {
                json!(b)
            } else {
                Value::Null
            }
        }
        Column::Star(_) | Column::Null => Value::Null,
    }
}

/// Rows for the fixture catalog: locations, a workflow and the notes attached to them.
pub fn notes_database() -> TestDatabase {
    TestDatabase::new()
        .with_rows(
            "locations",
            json!([
                {"id": 5, "name": "Harbor"},
                {"id": 6, "name": "Depot"},
                {"id": 7, "name": "Quarry"}
            ]),
        )
        .with_rows("workflows", json!([{"id": 5, "title": "Intake"}]))
        .with_rows(
            "notes",
            json!([
                {"id": 1, "body": "done", "noteable_id": 5, "noteable_type": "Location", "created_at": 10},
                {"id": 2, "body": "done", "noteable_id": 5, "noteable_type": "Location", "created_at": 10},
                {"id": 3, "body": "open", "noteable_id": 6, "noteable_type": "Location", "created_at": 20},
                {"id": 4, "body": "done", "noteable_id": 6, "noteable_type": "Location", "created_at": 5},
                {"id": 5, "body": "open", "noteable_id": 5, "noteable_type": "Workflow", "created_at": 1},
                {"id": 6, "body": "open", "noteable_id": 9, "noteable_type": "Location", "created_at": 3}
            ]),
        )
}
