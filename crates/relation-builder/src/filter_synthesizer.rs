// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Filter fields following polymorphic relations, and the resolvers compiling them to SQL.
//!
//! Every fragment is built around the key match of the association,
//! `<holder>.<name>_id = <referenced>.<pk> AND <holder>.<name>_type = <model name>`, wrapped in an
//! `EXISTS` sub-select over the related table.

use std::sync::Arc;

use poly_catalog::{OmitAction, Table};
use poly_sql::Predicate;
use relation_model::{
    FilterCompiler, FilterFieldResolver, FilterFieldSpec, FilterInputField, FilterInputType,
    FilterResolveError, PolyJoin, PolymorphicConstraint, PolymorphicTarget, RelationDirection,
    ResolveFieldProps,
};
use serde_json::Value;
use tracing::debug;

use crate::{
    BuildInputs, PolyBuildingError, PolySchemaExtension, cardinality::is_foreign_key_unique,
};

pub const EVERY: &str = "every";
pub const SOME: &str = "some";
pub const NONE: &str = "none";

/// Filters through a to-one relation: `EXISTS (SELECT 1 FROM <child> WHERE <match> AND <nested>)`.
#[derive(Debug)]
pub struct RelationFilterResolver {
    pub join: PolyJoin,
    /// The filter type of the related table
    pub nested_filter_type: String,
}

impl FilterFieldResolver for RelationFilterResolver {
    fn resolve(
        &self,
        props: ResolveFieldProps<'_>,
        compiler: &dyn FilterCompiler,
    ) -> Result<Option<Predicate>, FilterResolveError> {
        if props.value.is_null() {
            return Ok(None);
        }

        let child_alias = props.aliases.next_alias(&self.join.child_table().name);
        let nested = compiler.compile(
            &self.nested_filter_type,
            props.value,
            &child_alias,
            props.aliases,
        )?;

        Ok(nested.map(|nested| {
            Predicate::exists(
                self.join
                    .exists_select(props.source_alias, &child_alias, nested),
            )
        }))
    }
}

/// Filters through a backward relation to many rows by handing the `{every, some, none}` value to
/// the many type's own resolvers.
#[derive(Debug)]
pub struct ManyRelationFilterResolver {
    pub many_filter_type: String,
}

impl FilterFieldResolver for ManyRelationFilterResolver {
    fn resolve(
        &self,
        props: ResolveFieldProps<'_>,
        compiler: &dyn FilterCompiler,
    ) -> Result<Option<Predicate>, FilterResolveError> {
        if props.value.is_null() {
            return Ok(None);
        }

        compiler.compile(
            &self.many_filter_type,
            props.value,
            props.source_alias,
            props.aliases,
        )
    }
}

/// The `every`, `some` and `none` fields of a many type:
/// - every: `NOT EXISTS (<match> AND NOT <nested>)`, true when there are no related rows
/// - some: `EXISTS (<match> AND <nested>)`
/// - none: `NOT EXISTS (<match> AND <nested>)`
#[derive(Debug)]
pub struct QuantifierResolver {
    pub join: PolyJoin,
    pub nested_filter_type: String,
}

impl FilterFieldResolver for QuantifierResolver {
    fn resolve(
        &self,
        props: ResolveFieldProps<'_>,
        compiler: &dyn FilterCompiler,
    ) -> Result<Option<Predicate>, FilterResolveError> {
        if props.value.is_null() {
            return Ok(None);
        }

        let child_alias = props.aliases.next_alias(&self.join.child_table().name);
        let Some(nested) = compiler.compile(
            &self.nested_filter_type,
            props.value,
            &child_alias,
            props.aliases,
        )?
        else {
            return Ok(None);
        };

        let exists = |extra| {
            Predicate::exists(
                self.join
                    .exists_select(props.source_alias, &child_alias, extra),
            )
        };

        match props.field_name {
            EVERY => Ok(Some(!exists(!nested))),
            SOME => Ok(Some(exists(nested))),
            NONE => Ok(Some(!exists(nested))),
            other => Err(FilterResolveError::UnknownQuantifier(other.to_string())),
        }
    }
}

/// `true` keeps rows with at least one related row, `false` rows with none.
#[derive(Debug)]
pub struct RelationExistsResolver {
    pub join: PolyJoin,
}

impl FilterFieldResolver for RelationExistsResolver {
    fn resolve(
        &self,
        props: ResolveFieldProps<'_>,
        _compiler: &dyn FilterCompiler,
    ) -> Result<Option<Predicate>, FilterResolveError> {
        let exists = match props.value {
            Value::Null => return Ok(None),
            Value::Bool(exists) => *exists,
            other => {
                return Err(FilterResolveError::InvalidValue {
                    field: props.field_name.to_string(),
                    expected: "a boolean",
                    found: other.to_string(),
                });
            }
        };

        let child_alias = props.aliases.next_alias(&self.join.child_table().name);
        let predicate = Predicate::exists(self.join.exists_select(
            props.source_alias,
            &child_alias,
            Predicate::True,
        ));

        Ok(Some(if exists { predicate } else { !predicate }))
    }
}

/// Add `<target>As<Association>` fields to the source tables' filter types.
pub fn add_forward_filter_fields(
    inputs: &BuildInputs<'_>,
    constraints: &[PolymorphicConstraint],
    extension: &mut PolySchemaExtension,
) -> Result<(), PolyBuildingError> {
    let BuildInputs {
        inflector,
        host_schema,
        ..
    } = inputs;

    for constraint in constraints {
        let Some(source) = filterable_table(inputs, &constraint.from) else {
            continue;
        };
        let source_filter_type = inflector.filter_type(&inflector.table_type(source));

        for target in constraint.to.iter() {
            let Some(target_table) = filterable_table(inputs, &target.table) else {
                continue;
            };
            let field_name =
                inflector.forward_relation_by_polymorphic(target_table, &constraint.name);
            let nested_filter_type = inflector.filter_type(&inflector.table_type(target_table));

            let resolver = RelationFilterResolver {
                join: PolyJoin::new(
                    RelationDirection::Forward,
                    constraint,
                    source.physical_name(),
                    target,
                    target_table.physical_name(),
                ),
                nested_filter_type: nested_filter_type.clone(),
            };

            extension.add_filter_field(
                FilterFieldSpec {
                    filter_type: source_filter_type.clone(),
                    description: format!(
                        "Filter by the object's `{field_name}` polymorphic relation."
                    ),
                    name: field_name,
                    input_type: nested_filter_type,
                    resolver: Arc::new(resolver),
                },
                host_schema,
            )?;
        }
    }

    Ok(())
}

/// Add backward relation filter fields to the target tables' filter types: a plain nested filter
/// when at most one source row points at a target, an `every`/`some`/`none` many type otherwise.
pub fn add_backward_filter_fields(
    inputs: &BuildInputs<'_>,
    constraints: &[PolymorphicConstraint],
    extension: &mut PolySchemaExtension,
) -> Result<(), PolyBuildingError> {
    let BuildInputs {
        inflector,
        host_schema,
        options,
        ..
    } = inputs;

    for constraint in constraints {
        let Some(source) = filterable_table(inputs, &constraint.from) else {
            continue;
        };
        let source_type = inflector.table_type(source);
        let source_filter_type = inflector.filter_type(&source_type);
        let is_unique = is_foreign_key_unique(source, constraint);
        let field_name = inflector.backward_relation_by_polymorphic(source, constraint, is_unique);

        for target in constraint.to.iter() {
            let Some(target_table) = filterable_table(inputs, &target.table) else {
                continue;
            };
            if target_table.single_primary_key().is_none() {
                continue;
            }
            let target_filter_type = inflector.filter_type(&inflector.table_type(target_table));
            let join = backward_join(constraint, source, target, target_table);

            if is_unique {
                extension.add_filter_field(
                    FilterFieldSpec {
                        filter_type: target_filter_type,
                        name: field_name.clone(),
                        description: format!(
                            "Filter by the object's `{field_name}` polymorphic relation."
                        ),
                        input_type: source_filter_type.clone(),
                        resolver: Arc::new(RelationFilterResolver {
                            join,
                            nested_filter_type: source_filter_type.clone(),
                        }),
                    },
                    host_schema,
                )?;
                continue;
            }

            if source.is_omitted(OmitAction::Many) {
                debug!(source = %source.name, "Skipping many filter of a table omitted for many");
                continue;
            }

            let many_filter_type =
                inflector.filter_many_poly_type(target_table, source, &field_name);
            add_many_filter_type(
                extension,
                &many_filter_type,
                &source_type,
                &source_filter_type,
                &join,
            )?;

            extension.add_filter_field(
                FilterFieldSpec {
                    filter_type: target_filter_type.clone(),
                    name: field_name.clone(),
                    description: format!("Filter by the object's `{field_name}` relation."),
                    input_type: many_filter_type.clone(),
                    resolver: Arc::new(ManyRelationFilterResolver { many_filter_type }),
                },
                host_schema,
            )?;

            if options.filter_relation_exists {
                extension.add_filter_field(
                    FilterFieldSpec {
                        filter_type: target_filter_type,
                        name: inflector.relation_exists_field(&field_name),
                        description: format!("Some related `{source_type}` exists."),
                        input_type: "Boolean".to_string(),
                        resolver: Arc::new(RelationExistsResolver { join }),
                    },
                    host_schema,
                )?;
            }
        }
    }

    Ok(())
}

fn add_many_filter_type(
    extension: &mut PolySchemaExtension,
    many_filter_type: &str,
    source_type: &str,
    source_filter_type: &str,
    join: &PolyJoin,
) -> Result<(), PolyBuildingError> {
    let quantifiers = [
        (EVERY, "Every", "and"),
        (SOME, "Some", "any"),
        (NONE, "No", "none"),
    ];

    let fields = quantifiers
        .iter()
        .map(|(name, quantifier, logic)| FilterInputField {
            name: name.to_string(),
            input_type: source_filter_type.to_string(),
            description: format!(
                "{quantifier} related `{source_type}` matches the filter criteria. All fields are combined with a logical '{logic}.'"
            ),
        })
        .collect();

    let resolvers = quantifiers
        .iter()
        .map(|(name, _, _)| {
            let resolver: Arc<dyn FilterFieldResolver> = Arc::new(QuantifierResolver {
                join: join.clone(),
                nested_filter_type: source_filter_type.to_string(),
            });
            (name.to_string(), resolver)
        })
        .collect();

    extension.add_filter_input_type(
        FilterInputType {
            name: many_filter_type.to_string(),
            description: format!(
                "A filter to be used against many `{source_type}` object through polymorphic types. All fields are combined with a logical 'and.'"
            ),
            fields,
        },
        resolvers,
    )
}

fn backward_join(
    constraint: &PolymorphicConstraint,
    source: &Table,
    target: &PolymorphicTarget,
    target_table: &Table,
) -> PolyJoin {
    PolyJoin::new(
        RelationDirection::Backward,
        constraint,
        source.physical_name(),
        target,
        target_table.physical_name(),
    )
}

/// A table that has a filter type: present, readable and not omitted for filtering.
fn filterable_table<'a>(
    inputs: &BuildInputs<'a>,
    table: &poly_catalog::TableId,
) -> Option<&'a Table> {
    inputs.catalog.table(table).filter(|table| {
        let omitted =
            table.is_omitted(OmitAction::Read) || table.is_omitted(OmitAction::Filter);
        if omitted {
            debug!(table = %table.name, "Skipping filters of an omitted table");
        }
        !omitted
    })
}

#[cfg(test)]
mod tests {
    use poly_sql::{AliasGenerator, ExpressionBuilder, TableAlias, assert_binding};
    use serde_json::json;

    use super::*;
    use crate::{CONNECTION_FILTER, HostCapabilities, test_utils};

    fn extension() -> PolySchemaExtension {
        test_utils::build(
            &test_utils::filter_options(),
            &HostCapabilities::new().with(CONNECTION_FILTER),
        )
        .unwrap()
    }

    fn field_names<'a>(extension: &'a PolySchemaExtension, filter_type: &str) -> Vec<&'a str> {
        extension
            .filter_fields(filter_type)
            .map(|fields| fields.names().collect())
            .unwrap_or_default()
    }

    /// Compile `value` against `filter_type`, with the outer row aliased `<table>_1`.
    fn compile(
        extension: &PolySchemaExtension,
        filter_type: &str,
        table: &str,
        value: serde_json::Value,
    ) -> (TableAlias, Option<Predicate>) {
        let compiler = test_utils::TestFilterCompiler {
            registry: extension.resolvers(),
        };
        let aliases = AliasGenerator::new();
        let alias = aliases.next_alias(table);
        let predicate = compiler
            .compile(filter_type, &value, &alias, &aliases)
            .unwrap();
        (alias, predicate)
    }

    fn location_ids(extension: &PolySchemaExtension, value: serde_json::Value) -> Vec<i64> {
        let (alias, predicate) = compile(extension, "LocationFilter", "locations", value);
        test_utils::notes_database().select_ids("locations", &alias, &predicate.unwrap())
    }

    #[test]
    fn filter_fields() {
        let extension = extension();

        assert_eq!(
            field_names(&extension, "NoteFilter"),
            vec!["locationAsNoteable", "workflowAsNoteable"]
        );
        assert_eq!(
            field_names(&extension, "LocationFilter"),
            vec!["notes", "notesExists", "profile", "taggings", "taggingsExists"]
        );
        assert_eq!(
            field_names(&extension, "WorkflowFilter"),
            vec!["notes", "notesExists"]
        );

        let location = extension
            .filter_fields("NoteFilter")
            .and_then(|fields| fields.get("locationAsNoteable"))
            .unwrap();
        assert_eq!(location.input_type, "LocationFilter");
        assert_eq!(
            location.description,
            "Filter by the object's `locationAsNoteable` polymorphic relation."
        );

        let notes = extension
            .filter_fields("LocationFilter")
            .and_then(|fields| fields.get("notes"))
            .unwrap();
        assert_eq!(notes.input_type, "LocationToManyNotePolyFilter");
        assert_eq!(notes.description, "Filter by the object's `notes` relation.");

        let profile = extension
            .filter_fields("LocationFilter")
            .and_then(|fields| fields.get("profile"))
            .unwrap();
        assert_eq!(profile.input_type, "ProfileFilter");
    }

    #[test]
    fn many_filter_type() {
        let extension = extension();
        let many = extension
            .filter_input_type("LocationToManyNotePolyFilter")
            .unwrap();

        assert_eq!(
            many.description,
            "A filter to be used against many `Note` object through polymorphic types. All fields are combined with a logical 'and.'"
        );
        assert_eq!(
            many.fields
                .iter()
                .map(|field| (field.name.as_str(), field.input_type.as_str()))
                .collect::<Vec<_>>(),
            vec![
                ("every", "NoteFilter"),
                ("some", "NoteFilter"),
                ("none", "NoteFilter")
            ]
        );
        assert_eq!(
            many.fields[1].description,
            "Some related `Note` matches the filter criteria. All fields are combined with a logical 'any.'"
        );
        assert!(
            extension
                .filter_input_type("WorkflowToManyNotePolyFilter")
                .is_some()
        );
    }

    #[test]
    fn forward_filter_sql() {
        let extension = extension();
        let (_, predicate) = compile(
            &extension,
            "NoteFilter",
            "notes",
            json!({"locationAsNoteable": {"id": {"equalTo": 5}}}),
        );

        assert_binding!(
            predicate.unwrap().to_sql(),
            r#"EXISTS (SELECT 1 FROM "public"."locations" AS "locations_2" WHERE (("locations_2"."id" = "notes_1"."noteable_id" AND "notes_1"."noteable_type" = $1) AND "locations_2"."id" = $2))"#,
            "Location".to_string(),
            5i64
        );
    }

    #[test]
    fn forward_filter_rows() {
        let extension = extension();
        let note_ids = |value| {
            let (alias, predicate) = compile(&extension, "NoteFilter", "notes", value);
            test_utils::notes_database().select_ids("notes", &alias, &predicate.unwrap())
        };

        // Note 5 points at workflow 5, not location 5
        assert_eq!(
            note_ids(json!({"locationAsNoteable": {"id": {"equalTo": 5}}})),
            vec![1, 2]
        );
        assert_eq!(
            note_ids(json!({"locationAsNoteable": {"name": {"equalTo": "Depot"}}})),
            vec![3, 4]
        );
        assert_eq!(
            note_ids(json!({"workflowAsNoteable": {"title": {"equalTo": "Intake"}}})),
            vec![5]
        );
    }

    #[test]
    fn every_sql() {
        let extension = extension();
        let (_, predicate) = compile(
            &extension,
            "LocationFilter",
            "locations",
            json!({"notes": {"every": {"body": {"equalTo": "done"}}}}),
        );

        assert_binding!(
            predicate.unwrap().to_sql(),
            r#"NOT EXISTS (SELECT 1 FROM "public"."notes" AS "notes_2" WHERE (("notes_2"."noteable_id" = "locations_1"."id" AND "notes_2"."noteable_type" = $1) AND "notes_2"."body" <> $2))"#,
            "Location".to_string(),
            "done".to_string()
        );
    }

    #[test]
    fn quantifiers() {
        let extension = extension();
        let done = json!({"body": {"equalTo": "done"}});

        // Quarry has no notes: `every` holds vacuously
        assert_eq!(
            location_ids(&extension, json!({"notes": {"every": done}})),
            vec![5, 7]
        );
        assert_eq!(
            location_ids(&extension, json!({"notes": {"some": done}})),
            vec![5, 6]
        );
        assert_eq!(
            location_ids(&extension, json!({"notes": {"none": done}})),
            vec![7]
        );
        // Combined fields of a many filter all apply
        assert_eq!(
            location_ids(
                &extension,
                json!({"notes": {"some": done, "none": {"body": {"equalTo": "open"}}}})
            ),
            vec![5]
        );
    }

    #[test]
    fn relation_exists() {
        let extension = extension();

        assert_eq!(
            location_ids(&extension, json!({"notesExists": true})),
            vec![5, 6]
        );
        assert_eq!(
            location_ids(&extension, json!({"notesExists": false})),
            vec![7]
        );

        let compiler = test_utils::TestFilterCompiler {
            registry: extension.resolvers(),
        };
        let aliases = AliasGenerator::new();
        let alias = aliases.next_alias("locations");
        assert_eq!(
            compiler.compile(
                "LocationFilter",
                &json!({"notesExists": "yes"}),
                &alias,
                &aliases
            ),
            Err(FilterResolveError::InvalidValue {
                field: "notesExists".to_string(),
                expected: "a boolean",
                found: r#""yes""#.to_string(),
            })
        );
    }

    #[test]
    fn null_and_empty_filters_add_nothing() {
        let extension = extension();

        for value in [
            json!({"locationAsNoteable": null}),
            json!({"locationAsNoteable": {}}),
        ] {
            assert!(compile(&extension, "NoteFilter", "notes", value).1.is_none());
        }

        for value in [
            json!({"notes": null}),
            json!({"notes": {}}),
            json!({"notes": {"every": null}}),
            json!({"notes": {"some": {}}}),
            json!({"notesExists": null}),
        ] {
            assert!(
                compile(&extension, "LocationFilter", "locations", value)
                    .1
                    .is_none()
            );
        }
    }

    #[test]
    fn unknown_quantifier() {
        let extension = extension();
        let resolver = extension
            .resolvers()
            .get("LocationToManyNotePolyFilter", EVERY)
            .unwrap();
        let compiler = test_utils::TestFilterCompiler {
            registry: extension.resolvers(),
        };
        let aliases = AliasGenerator::new();
        let alias = aliases.next_alias("locations");
        let value = json!({"id": {"equalTo": 1}});

        let props = ResolveFieldProps {
            source_alias: &alias,
            field_name: "most",
            value: &value,
            aliases: &aliases,
        };
        assert_eq!(
            resolver.resolve(props, &compiler),
            Err(FilterResolveError::UnknownQuantifier("most".to_string()))
        );
    }

    #[test]
    fn no_exists_fields_when_disabled() {
        let extension = test_utils::build(
            &test_utils::filter_options().with_filter_relation_exists(false),
            &HostCapabilities::new().with(CONNECTION_FILTER),
        )
        .unwrap();

        assert_eq!(
            field_names(&extension, "LocationFilter"),
            vec!["notes", "profile", "taggings"]
        );
    }
}
