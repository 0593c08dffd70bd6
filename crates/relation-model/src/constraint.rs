// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use poly_catalog::TableId;
use serde::Serialize;

/// A table a polymorphic association may point to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolymorphicTarget {
    pub table: TableId,
    /// The target's single primary-key column
    pub primary_key: String,
    /// The value stored in the `_type` column for rows pointing to this target
    pub model_name: String,
}

/// An association stored as an `<name>_id`/`<name>_type` column pair.
///
/// For the `notes.noteable_type` column tagged with `@polymorphicTo Location`, we will have:
/// - name: `noteable`
/// - from: the `notes` table
/// - to: `[(locations, id, "Location")]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolymorphicConstraint {
    pub name: String,
    pub from: TableId,
    pub to: Vec<PolymorphicTarget>,
    /// Base name of the backward field when set through `@isPolymorphic <name>`
    pub backward_association_name: Option<String>,
}

impl PolymorphicConstraint {
    pub fn id_column(&self) -> String {
        format!("{}_id", self.name)
    }

    pub fn type_column(&self) -> String {
        format!("{}_type", self.name)
    }

    pub fn target(&self, table: &TableId) -> Option<&PolymorphicTarget> {
        self.to.iter().find(|target| &target.table == table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_pair() {
        let constraint = PolymorphicConstraint {
            name: "taggable".to_string(),
            from: TableId("1".to_string()),
            to: vec![PolymorphicTarget {
                table: TableId("2".to_string()),
                primary_key: "id".to_string(),
                model_name: "Post".to_string(),
            }],
            backward_association_name: None,
        };

        assert_eq!(constraint.id_column(), "taggable_id");
        assert_eq!(constraint.type_column(), "taggable_type");
        assert!(constraint.target(&TableId("2".to_string())).is_some());
        assert!(constraint.target(&TableId("1".to_string())).is_none());
    }
}
