// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use poly_catalog::Table;
use relation_model::{Cardinality, PolymorphicConstraint};

/// Whether at most one row of `source` can point at any given target through `constraint`: the
/// table must have a unique (or primary-key) constraint over exactly `<name>_id` and
/// `<name>_type`. A constraint over more columns does not count.
pub fn is_foreign_key_unique(source: &Table, constraint: &PolymorphicConstraint) -> bool {
    let id_column = constraint.id_column();
    let type_column = constraint.type_column();
    let pair = [id_column.as_str(), type_column.as_str()];

    source.unique_constraints().any(|c| c.covers_exactly(&pair))
}

pub fn cardinality(source: &Table, constraint: &PolymorphicConstraint) -> Cardinality {
    if is_foreign_key_unique(source, constraint) {
        Cardinality::Unique
    } else {
        Cardinality::Many
    }
}

#[cfg(test)]
mod tests {
    use poly_catalog::{Constraint, ConstraintKind};

    use super::*;
    use crate::test_utils;

    fn constraint(name: &str) -> PolymorphicConstraint {
        PolymorphicConstraint {
            name: name.to_string(),
            from: test_utils::id("notes"),
            to: vec![],
            backward_association_name: None,
        }
    }

    #[test]
    fn unique_pair() {
        let catalog = test_utils::catalog();

        let profiles = catalog.table(&test_utils::id("profiles")).unwrap();
        assert_eq!(cardinality(profiles, &constraint("owner")), Cardinality::Unique);

        let notes = catalog.table(&test_utils::id("notes")).unwrap();
        assert_eq!(cardinality(notes, &constraint("noteable")), Cardinality::Many);
    }

    #[test]
    fn superset_is_not_unique() {
        let catalog = test_utils::catalog();
        let mut notes = catalog.table(&test_utils::id("notes")).unwrap().clone();
        notes.constraints.push(Constraint {
            name: "notes_noteable_body".to_string(),
            kind: ConstraintKind::Unique,
            columns: vec![
                "noteable_id".to_string(),
                "noteable_type".to_string(),
                "body".to_string(),
            ],
        });
        assert!(!is_foreign_key_unique(&notes, &constraint("noteable")));

        notes.constraints.push(Constraint {
            name: "notes_noteable".to_string(),
            kind: ConstraintKind::Unique,
            columns: vec!["noteable_type".to_string(), "noteable_id".to_string()],
        });
        assert!(is_foreign_key_unique(&notes, &constraint("noteable")));
    }
}
