// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::LazyLock;

use poly_catalog::{Catalog, TagValue};
use regex::Regex;
use relation_model::{PolymorphicConstraint, PolymorphicTarget};
use tracing::debug;

use crate::{config::PolyRelationOptions, model_map::ModelMap};

pub const IS_POLYMORPHIC_TAG: &str = "isPolymorphic";
pub const POLYMORPHIC_TO_TAG: &str = "polymorphicTo";

const TYPE_SUFFIX: &str = "_type";

static TRAILING_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+$").unwrap());

/// The comparable form of a declared model name: lower-cased, with any qualifying prefix
/// removed (`public.Location` -> `location`).
pub fn canonical(name: &str) -> String {
    let lower = name.to_lowercase();
    TRAILING_WORD
        .find(&lower)
        .map(|m| m.as_str().to_string())
        .unwrap_or(lower)
}

/// Find the `<name>_type` columns tagged `@isPolymorphic` and resolve their `@polymorphicTo`
/// targets. Targets that do not resolve to a table with a single-column primary key are dropped.
pub fn extract_constraints(
    catalog: &Catalog,
    options: &PolyRelationOptions,
    model_map: &ModelMap,
) -> Vec<PolymorphicConstraint> {
    let mut constraints = vec![];

    for table in catalog
        .tables()
        .filter(|t| t.kind.is_selectable() && options.includes_schema(&t.schema))
    {
        for column in table.columns.iter() {
            let Some(name) = column.name.strip_suffix(TYPE_SUFFIX) else {
                continue;
            };
            let Some(marker) = column.tags.get(IS_POLYMORPHIC_TAG) else {
                continue;
            };
            if name.is_empty() || !marker.is_truthy() {
                continue;
            }

            let mut declared: Vec<String> = vec![];
            for target in column
                .tags
                .get(POLYMORPHIC_TO_TAG)
                .map(TagValue::values)
                .unwrap_or_default()
            {
                let target = canonical(target);
                if !declared.contains(&target) {
                    declared.push(target);
                }
            }

            let to = declared
                .iter()
                .filter_map(|declared| {
                    let resolved = model_map.resolve_canonical(declared).and_then(|mapped| {
                        let target_table = catalog.table(&mapped.table)?;
                        let primary_key = target_table.single_primary_key()?;

                        Some(PolymorphicTarget {
                            table: mapped.table.clone(),
                            primary_key: primary_key.name.clone(),
                            model_name: mapped.model_name.clone(),
                        })
                    });

                    if resolved.is_none() {
                        debug!(
                            table = %table.name,
                            column = %column.name,
                            target = %declared,
                            "Skipping polymorphic target without a table or single-column primary key"
                        );
                    }
                    resolved
                })
                .collect();

            constraints.push(PolymorphicConstraint {
                name: name.to_string(),
                from: table.id.clone(),
                to,
                backward_association_name: marker
                    .as_str()
                    .filter(|s| !s.is_empty())
                    .map(|s| s.to_string()),
            });
        }
    }

    debug!(count = constraints.len(), "Extracted polymorphic constraints");

    constraints
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{inflection::DefaultInflector, test_utils};

    fn constraints() -> Vec<PolymorphicConstraint> {
        let catalog = test_utils::catalog();
        let options = PolyRelationOptions::default();
        let model_map = ModelMap::build(&catalog, &options, &DefaultInflector).unwrap();

        extract_constraints(&catalog, &options, &model_map)
    }

    #[test]
    fn canonical_names() {
        assert_eq!(canonical("Location"), "location");
        assert_eq!(canonical("public.WorkflowStep"), "workflowstep");
        assert_eq!(canonical("\"app\".\"Note\""), "\"app\".\"note\"");
        assert_eq!(canonical("..."), "...");
    }

    #[test]
    fn one_constraint_per_marked_column() {
        let names: Vec<_> = constraints().into_iter().map(|c| c.name).collect();

        // `notes.kind_type` carries no marker
        assert_eq!(names, vec!["noteable", "owner", "taggable"]);
    }

    #[test]
    fn resolves_targets_in_declaration_order() {
        let constraints = constraints();
        let noteable = &constraints[0];

        assert_eq!(noteable.from, test_utils::id("notes"));
        assert_eq!(
            noteable.to,
            vec![
                PolymorphicTarget {
                    table: test_utils::id("locations"),
                    primary_key: "id".to_string(),
                    model_name: "Location".to_string(),
                },
                PolymorphicTarget {
                    table: test_utils::id("workflows"),
                    primary_key: "id".to_string(),
                    model_name: "Workflow".to_string(),
                },
            ]
        );
        assert_eq!(noteable.backward_association_name, None);
    }

    #[test]
    fn drops_unresolvable_targets() {
        let constraints = constraints();
        let taggable = &constraints[2];

        // `public.Location` and `location` are the same target; `Pair` has a composite primary key
        // and `Missing` names no table
        assert_eq!(taggable.to.len(), 1);
        assert_eq!(taggable.to[0].model_name, "Location");
        assert_eq!(taggable.backward_association_name.as_deref(), Some("taggings"));
    }
}
