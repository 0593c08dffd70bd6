// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use poly_sql::{Column, OrderBy, PhysicalTableName, Predicate, Select, Selection, TableAlias, TableReference};

use crate::{PolymorphicConstraint, PolymorphicTarget, RelationDirection};

/// The join condition behind a polymorphic relation:
/// `<holder>.<name>_id = <referenced>.<pk> AND <holder>.<name>_type = <model name>`.
///
/// The holder is the table with the `_id`/`_type` pair, the referenced table is one of the
/// association's targets. The direction decides which of the two is the parent (the row the
/// field or filter is evaluated on) and which is the child (the rows being looked up).
#[derive(Debug, Clone, PartialEq)]
pub struct PolyJoin {
    pub direction: RelationDirection,
    pub holder: PhysicalTableName,
    pub id_column: String,
    pub type_column: String,
    pub referenced: PhysicalTableName,
    pub referenced_pk: String,
    pub model_name: String,
}

impl PolyJoin {
    pub fn new(
        direction: RelationDirection,
        constraint: &PolymorphicConstraint,
        holder: PhysicalTableName,
        target: &PolymorphicTarget,
        referenced: PhysicalTableName,
    ) -> Self {
        Self {
            direction,
            holder,
            id_column: constraint.id_column(),
            type_column: constraint.type_column(),
            referenced,
            referenced_pk: target.primary_key.clone(),
            model_name: target.model_name.clone(),
        }
    }

    /// The key match between a holder row and a referenced row. Forward joins put the referenced
    /// key first (`locations.id = notes.noteable_id`), backward joins the holder's
    /// (`notes.noteable_id = locations.id`).
    pub fn key_match(&self, holder_alias: &TableAlias, referenced_alias: &TableAlias) -> Predicate {
        key_match(
            self.direction,
            KeyColumns {
                id_column: &self.id_column,
                type_column: &self.type_column,
                referenced_pk: &self.referenced_pk,
                model_name: &self.model_name,
            },
            holder_alias,
            referenced_alias,
        )
    }

    /// The join condition between the row a field is evaluated on and a looked-up row
    pub fn predicate(&self, parent_alias: &TableAlias, child_alias: &TableAlias) -> Predicate {
        match self.direction {
            RelationDirection::Forward => self.key_match(parent_alias, child_alias),
            RelationDirection::Backward => self.key_match(child_alias, parent_alias),
        }
    }

    /// The table looked-up rows come from
    pub fn child_table(&self) -> &PhysicalTableName {
        match self.direction {
            RelationDirection::Forward => &self.referenced,
            RelationDirection::Backward => &self.holder,
        }
    }

    /// The sub-query reading the related rows of one parent row.
    pub fn select(
        &self,
        parent_alias: &TableAlias,
        child_alias: &TableAlias,
        selection: Selection,
        order_by: Option<OrderBy>,
    ) -> Select {
        Select {
            selection,
            from: TableReference {
                name: self.child_table().clone(),
                alias: child_alias.clone(),
            },
            predicate: self.predicate(parent_alias, child_alias),
            order_by,
        }
    }

    /// `SELECT 1 FROM <child> WHERE <join> AND <extra>`, for use in `EXISTS`.
    pub fn exists_select(
        &self,
        parent_alias: &TableAlias,
        child_alias: &TableAlias,
        extra: Predicate,
    ) -> Select {
        Select::one(
            TableReference {
                name: self.child_table().clone(),
                alias: child_alias.clone(),
            },
            Predicate::and(self.predicate(parent_alias, child_alias), extra),
        )
    }
}

/// The key match of `constraint` between a row of its holding table and a row of `target`, with
/// the id comparison's sides ordered by `direction`.
pub fn poly_sql_key_match(
    direction: RelationDirection,
    holder_alias: &TableAlias,
    referenced_alias: &TableAlias,
    target: &PolymorphicTarget,
    constraint: &PolymorphicConstraint,
) -> Predicate {
    key_match(
        direction,
        KeyColumns {
            id_column: &constraint.id_column(),
            type_column: &constraint.type_column(),
            referenced_pk: &target.primary_key,
            model_name: &target.model_name,
        },
        holder_alias,
        referenced_alias,
    )
}

struct KeyColumns<'a> {
    id_column: &'a str,
    type_column: &'a str,
    referenced_pk: &'a str,
    model_name: &'a str,
}

fn key_match(
    direction: RelationDirection,
    columns: KeyColumns<'_>,
    holder_alias: &TableAlias,
    referenced_alias: &TableAlias,
) -> Predicate {
    let holder_id = Column::physical(columns.id_column, holder_alias);
    let referenced_pk = Column::physical(columns.referenced_pk, referenced_alias);

    let id_match = match direction {
        RelationDirection::Forward => Predicate::eq(referenced_pk, holder_id),
        RelationDirection::Backward => Predicate::eq(holder_id, referenced_pk),
    };

    Predicate::and(
        id_match,
        Predicate::eq(
            Column::physical(columns.type_column, holder_alias),
            Column::param(columns.model_name.to_string()),
        ),
    )
}

#[cfg(test)]
mod tests {
    use poly_catalog::TableId;
    use poly_sql::{ExpressionBuilder, assert_binding};

    use super::*;

    fn constraint() -> PolymorphicConstraint {
        PolymorphicConstraint {
            name: "noteable".to_string(),
            from: TableId("1".to_string()),
            to: vec![],
            backward_association_name: None,
        }
    }

    fn target() -> PolymorphicTarget {
        PolymorphicTarget {
            table: TableId("2".to_string()),
            primary_key: "id".to_string(),
            model_name: "Location".to_string(),
        }
    }

    fn join(direction: RelationDirection) -> PolyJoin {
        let (constraint, target) = (constraint(), target());

        PolyJoin::new(
            direction,
            &constraint,
            PhysicalTableName::new("notes", Some("public")),
            &target,
            PhysicalTableName::new("locations", Some("public")),
        )
    }

    #[test]
    fn forward_join() {
        let notes = TableAlias::new("notes_1");
        let locations = TableAlias::new("locations_2");

        assert_binding!(
            join(RelationDirection::Forward)
                .select(&notes, &locations, Selection::Columns(vec![Column::Star(locations.clone())]), None)
                .to_sql(),
            r#"SELECT "locations_2".* FROM "public"."locations" AS "locations_2" WHERE ("locations_2"."id" = "notes_1"."noteable_id" AND "notes_1"."noteable_type" = $1)"#,
            "Location".to_string()
        );
    }

    #[test]
    fn backward_join() {
        let locations = TableAlias::new("locations_1");
        let notes = TableAlias::new("notes_2");

        assert_binding!(
            join(RelationDirection::Backward)
                .exists_select(&locations, &notes, Predicate::True)
                .to_sql(),
            r#"SELECT 1 FROM "public"."notes" AS "notes_2" WHERE ("notes_2"."noteable_id" = "locations_1"."id" AND "notes_2"."noteable_type" = $1)"#,
            "Location".to_string()
        );
    }

    #[test]
    fn key_match_sides() {
        let notes = TableAlias::new("notes_1");
        let locations = TableAlias::new("locations_2");

        for (direction, expected) in [
            (
                RelationDirection::Forward,
                r#"("locations_2"."id" = "notes_1"."noteable_id" AND "notes_1"."noteable_type" = $1)"#,
            ),
            (
                RelationDirection::Backward,
                r#"("notes_1"."noteable_id" = "locations_2"."id" AND "notes_1"."noteable_type" = $1)"#,
            ),
        ] {
            let predicate =
                poly_sql_key_match(direction, &notes, &locations, &target(), &constraint());

            assert_eq!(predicate, join(direction).key_match(&notes, &locations));
            assert_binding!(predicate.to_sql(), expected, "Location".to_string());
        }
    }
}
