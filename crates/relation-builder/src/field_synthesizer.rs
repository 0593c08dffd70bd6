// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Relation fields on object types: forward fields from the row holding the `_id`/`_type` pair
//! to each possible target, and backward fields from each target to the rows pointing at it.

use poly_catalog::{OmitAction, Table};
use relation_model::{
    Cardinality, FieldShape, FieldType, PolyJoin, PolymorphicConstraint, QueryOrder,
    RelationDirection, RelationFieldSpec,
};
use tracing::debug;

use crate::{BuildInputs, cardinality::cardinality};

/// A field together with the object type it is declared on.
pub type TypedField = (String, RelationFieldSpec);

/// One field per resolvable target, on the source table's type. Forward fields are always
/// nullable: nothing in the database guarantees the target row exists.
pub fn forward_relation_fields(
    inputs: &BuildInputs<'_>,
    constraints: &[PolymorphicConstraint],
) -> Vec<TypedField> {
    let BuildInputs {
        catalog, inflector, ..
    } = inputs;

    let mut fields = vec![];

    for constraint in constraints {
        let Some(source) = readable_table(inputs, constraint, &constraint.from) else {
            continue;
        };
        let source_type = inflector.table_type(source);

        for target in constraint.to.iter() {
            let Some(target_table) = catalog.table(&target.table) else {
                continue;
            };
            if target_table.is_omitted(OmitAction::Read) {
                debug!(target = %target_table.name, "Skipping forward relation to an omitted table");
                continue;
            }

            let target_type = inflector.table_type(target_table);

            fields.push((
                source_type.clone(),
                RelationFieldSpec {
                    name: inflector.forward_relation_by_polymorphic(target_table, &constraint.name),
                    description: format!("Reads through a `{target_type}`."),
                    direction: RelationDirection::Forward,
                    source: source.id.clone(),
                    target: target.table.clone(),
                    cardinality: Cardinality::Unique,
                    association: constraint.name.clone(),
                    typ: FieldType::reference(target_type).optional(),
                    shape: FieldShape::Single,
                    join: PolyJoin::new(
                        RelationDirection::Forward,
                        constraint,
                        source.physical_name(),
                        target,
                        target_table.physical_name(),
                    ),
                },
            ));
        }
    }

    fields
}

/// One field per (constraint, target) pair, on the target table's type: a nullable object when
/// the `_id`/`_type` pair is unique on the source table, a connection otherwise.
pub fn backward_relation_fields(
    inputs: &BuildInputs<'_>,
    constraints: &[PolymorphicConstraint],
) -> Vec<TypedField> {
    let BuildInputs {
        catalog, inflector, ..
    } = inputs;

    let mut fields = vec![];

    for constraint in constraints {
        let Some(source) = readable_table(inputs, constraint, &constraint.from) else {
            continue;
        };
        let source_type = inflector.table_type(source);
        let cardinality = cardinality(source, constraint);
        let name = inflector.backward_relation_by_polymorphic(
            source,
            constraint,
            cardinality.is_unique(),
        );

        for target in constraint.to.iter() {
            let Some(target_table) = catalog.table(&target.table) else {
                continue;
            };
            if target_table.is_omitted(OmitAction::Read) {
                debug!(target = %target_table.name, "Skipping backward relation on an omitted table");
                continue;
            }
            if target_table.single_primary_key().is_none() {
                debug!(target = %target_table.name, "Skipping backward relation from a table without a single-column primary key");
                continue;
            }
            let target_type = inflector.table_type(target_table);

            let (typ, shape, description) = match cardinality {
                Cardinality::Unique => (
                    FieldType::reference(&source_type).optional(),
                    FieldShape::Single,
                    format!("Reads a single `{source_type}` that is related to this `{target_type}`."),
                ),
                Cardinality::Many => {
                    let primary_key: Vec<_> = source
                        .primary_key_columns()
                        .into_iter()
                        .map(|c| c.name.as_str())
                        .collect();

                    (
                        FieldType::reference(inflector.connection_type(source)),
                        FieldShape::Connection {
                            order: QueryOrder::default().ensure_unique(&primary_key),
                        },
                        format!("Reads and enables pagination through a set of `{source_type}`."),
                    )
                }
            };

            fields.push((
                target_type,
                RelationFieldSpec {
                    name: name.clone(),
                    description,
                    direction: RelationDirection::Backward,
                    source: source.id.clone(),
                    target: target.table.clone(),
                    cardinality,
                    association: constraint.name.clone(),
                    typ,
                    shape,
                    join: PolyJoin::new(
                        RelationDirection::Backward,
                        constraint,
                        source.physical_name(),
                        target,
                        target_table.physical_name(),
                    ),
                },
            ));
        }
    }

    fields
}

/// The source table of a constraint, unless it is missing from the catalog or omitted for reads.
fn readable_table<'a>(
    inputs: &BuildInputs<'a>,
    constraint: &PolymorphicConstraint,
    table: &poly_catalog::TableId,
) -> Option<&'a Table> {
    let table = inputs.catalog.table(table)?;

    if table.is_omitted(OmitAction::Read) {
        debug!(table = %table.name, association = %constraint.name, "Skipping relations of an omitted table");
        return None;
    }
    Some(table)
}

#[cfg(test)]
mod tests {
    use poly_sql::{ExpressionBuilder, Selection, TableAlias, assert_binding};

    use super::*;
    use crate::{
        HostCapabilities, HostSchema, config::PolyRelationOptions,
        constraint_extractor::extract_constraints, inflection::DefaultInflector,
        model_map::ModelMap, test_utils,
    };

    fn with_fields<T>(
        synthesize: fn(&BuildInputs<'_>, &[PolymorphicConstraint]) -> Vec<TypedField>,
        check: impl FnOnce(Vec<TypedField>) -> T,
    ) -> T {
        let catalog = test_utils::catalog();
        let options = PolyRelationOptions::default();
        let capabilities = HostCapabilities::new();
        let host_schema = HostSchema::new();
        let inputs = BuildInputs {
            catalog: &catalog,
            options: &options,
            inflector: &DefaultInflector,
            capabilities: &capabilities,
            host_schema: &host_schema,
        };
        let model_map = ModelMap::build(&catalog, &options, &DefaultInflector).unwrap();
        let constraints = extract_constraints(&catalog, &options, &model_map);

        check(synthesize(&inputs, &constraints))
    }

    fn names(fields: &[TypedField]) -> Vec<(&str, &str)> {
        fields
            .iter()
            .map(|(type_name, field)| (type_name.as_str(), field.name.as_str()))
            .collect()
    }

    #[test]
    fn forward_fields() {
        with_fields(forward_relation_fields, |fields| {
            assert_eq!(
                names(&fields),
                vec![
                    ("Note", "locationAsNoteable"),
                    ("Note", "workflowAsNoteable"),
                    ("Profile", "locationAsOwner"),
                    ("Tagging", "locationAsTaggable"),
                ]
            );

            let (_, location) = &fields[0];
            assert_eq!(location.typ.to_string(), "Location");
            assert_eq!(location.description, "Reads through a `Location`.");
            assert_eq!(location.declared_on(), &test_utils::id("notes"));
            assert_eq!(location.reads_from(), &test_utils::id("locations"));
        });
    }

    #[test]
    fn forward_join() {
        with_fields(forward_relation_fields, |fields| {
            let (_, location) = &fields[0];
            let notes = TableAlias::new("notes_1");
            let locations = TableAlias::new("locations_2");

            assert_binding!(
                location
                    .join
                    .select(&notes, &locations, Selection::One, None)
                    .to_sql(),
                r#"SELECT 1 FROM "public"."locations" AS "locations_2" WHERE ("locations_2"."id" = "notes_1"."noteable_id" AND "notes_1"."noteable_type" = $1)"#,
                "Location".to_string()
            );
        });
    }

    #[test]
    fn forward_round_trip() {
        with_fields(forward_relation_fields, |fields| {
            let database = test_utils::notes_database();
            let (_, location) = &fields[0];
            let (_, workflow) = &fields[1];
            let note_alias = TableAlias::new("notes_1");
            let target_alias = TableAlias::new("target_2");

            // Every note's forward field yields the target row with its id, if the type matches
            let resolve = |field: &RelationFieldSpec, note_id: i64| -> Vec<i64> {
                let select = field.join.select(&note_alias, &target_alias, Selection::One, None);
                let note = poly_sql::Predicate::eq(
                    poly_sql::Column::physical("id", &note_alias),
                    poly_sql::Column::param(note_id),
                );
                let predicate = poly_sql::Predicate::and(note, poly_sql::Predicate::exists(select));
                database.select_ids("notes", &note_alias, &predicate)
            };

            assert_eq!(resolve(location, 1), vec![1]);
            assert_eq!(resolve(workflow, 1), Vec::<i64>::new());
            assert_eq!(resolve(workflow, 5), vec![5]);
            assert_eq!(resolve(location, 5), Vec::<i64>::new());
            // No location 9
            assert_eq!(resolve(location, 6), Vec::<i64>::new());
        });
    }

    #[test]
    fn backward_fields() {
        with_fields(backward_relation_fields, |fields| {
            assert_eq!(
                names(&fields),
                vec![
                    ("Location", "notes"),
                    ("Workflow", "notes"),
                    ("Location", "profile"),
                    ("Location", "taggings"),
                ]
            );

            let (_, notes) = &fields[0];
            assert_eq!(notes.cardinality, Cardinality::Many);
            assert_eq!(notes.typ.to_string(), "NotesConnection!");
            assert_eq!(
                notes.description,
                "Reads and enables pagination through a set of `Note`."
            );

            let (_, profile) = &fields[2];
            assert_eq!(profile.cardinality, Cardinality::Unique);
            assert_eq!(profile.shape, FieldShape::Single);
            assert_eq!(profile.typ.to_string(), "Profile");
        });
    }

    #[test]
    fn backward_connection_order() {
        with_fields(backward_relation_fields, |fields| {
            let (_, notes) = &fields[0];
            let FieldShape::Connection { order } = &notes.shape else {
                panic!("Expected a connection, got {:?}", notes.shape);
            };

            assert_eq!(order.cursor_prefix, Some(vec!["primary_key_asc".to_string()]));
            let location = TableAlias::new("locations_1");
            let note = TableAlias::new("notes_2");

            assert_binding!(
                notes
                    .join
                    .select(
                        &location,
                        &note,
                        Selection::Columns(vec![poly_sql::Column::Star(note.clone())]),
                        order.order_by(&note)
                    )
                    .to_sql(),
                r#"SELECT "notes_2".* FROM "public"."notes" AS "notes_2" WHERE ("notes_2"."noteable_id" = "locations_1"."id" AND "notes_2"."noteable_type" = $1) ORDER BY "notes_2"."id" ASC"#,
                "Location".to_string()
            );
        });
    }

    #[test]
    fn requested_order_becomes_stable() {
        with_fields(backward_relation_fields, |fields| {
            let (_, notes) = &fields[0];
            let database = test_utils::notes_database();

            // Notes 1 and 2 share `created_at`; the appended primary key breaks the tie
            let requested = QueryOrder::new(
                vec![relation_model::OrderColumn {
                    column: "created_at".to_string(),
                    ordering: poly_sql::Ordering::Asc,
                }],
                false,
            )
            .ensure_unique(&["id"]);

            let location = TableAlias::new("locations_1");
            let note = TableAlias::new("notes_2");
            let harbor = &database.rows("locations")[0];
            let mut page = database.select_with(
                "notes",
                &note,
                &notes.join.predicate(&location, &note),
                &[(&location, harbor)],
            );

            let key = |row: &&test_utils::Row| {
                requested
                    .columns
                    .iter()
                    .map(|c| row[&c.column].as_i64().unwrap())
                    .collect::<Vec<_>>()
            };
            page.sort_by_key(key);

            let keys: Vec<_> = page.iter().map(key).collect();
            assert!(keys.windows(2).all(|w| w[0] < w[1]));
            assert_eq!(
                page.iter().map(|r| r["id"].as_i64().unwrap()).collect::<Vec<_>>(),
                vec![1, 2]
            );
        });
    }
}
