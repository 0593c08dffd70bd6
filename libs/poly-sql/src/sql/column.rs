// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use super::{ExpressionBuilder, SQLBuilder, SQLParamContainer, table::TableAlias};

/// A column-like concept covering any usage where a table column could be used. In the join
/// condition `"notes_2"."noteable_type" = $1`, both sides are columns from this perspective.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// A column of an aliased table
    Physical {
        column_name: String,
        table_alias: TableAlias,
    },
    /// A literal value. Always mapped to a placeholder to avoid SQL injection.
    Param(SQLParamContainer),
    /// All columns of an aliased table (`"notes_1".*`)
    Star(TableAlias),
    Null,
}

impl Column {
    pub fn physical(column_name: impl Into<String>, table_alias: &TableAlias) -> Self {
        Self::Physical {
            column_name: column_name.into(),
            table_alias: table_alias.clone(),
        }
    }

    pub fn param<T: super::SQLParam + 'static>(value: T) -> Self {
        Self::Param(SQLParamContainer::new(value))
    }

    /// Equality known without consulting the database. Only two parameters can be compared this
    /// way; anything involving a physical column depends on row data.
    pub fn param_eq(&self, other: &Self) -> Option<bool> {
        match (self, other) {
            (Column::Param(v1), Column::Param(v2)) => Some(v1 == v2),
            _ => None,
        }
    }
}

impl ExpressionBuilder for Column {
    fn build(&self, builder: &mut SQLBuilder) {
        match self {
            Column::Physical {
                column_name,
                table_alias,
            } => builder.push_column_with_table_alias(column_name.as_str(), table_alias.as_str()),
            Column::Param(value) => builder.push_param(value.param()),
            Column::Star(table_alias) => {
                table_alias.build(builder);
                builder.push_str(".*");
            }
            Column::Null => builder.push_str("NULL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn physical_column_uses_alias() {
        let alias = TableAlias::new("notes_1");
        let column = Column::physical("noteable_id", &alias);

        assert_binding!(column.to_sql(), r#""notes_1"."noteable_id""#);
    }

    #[test]
    fn param_column() {
        let column = Column::param("Location".to_string());

        assert_binding!(column.to_sql(), "$1", "Location".to_string());
    }

    #[test]
    fn param_equality_is_only_known_for_params() {
        let alias = TableAlias::new("notes_1");

        assert_eq!(
            Column::param(5).param_eq(&Column::param(5)),
            Some(true)
        );
        assert_eq!(
            Column::param(5).param_eq(&Column::param(6)),
            Some(false)
        );
        assert_eq!(
            Column::physical("id", &alias).param_eq(&Column::param(5)),
            None
        );
    }
}
