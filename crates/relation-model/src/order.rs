// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use poly_sql::{Column, OrderBy, OrderByElement, Ordering, TableAlias};

/// Cursor prefix marking an order made unique by appending the primary key.
pub const PRIMARY_KEY_ASC: &str = "primary_key_asc";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderColumn {
    pub column: String,
    pub ordering: Ordering,
}

/// The order a connection reads its rows in, independent of the alias the rows end up under.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryOrder {
    pub columns: Vec<OrderColumn>,
    /// Whether `columns` already identify each row
    pub is_unique: bool,
    pub cursor_prefix: Option<Vec<String>>,
}

impl QueryOrder {
    pub fn new(columns: Vec<OrderColumn>, is_unique: bool) -> Self {
        Self {
            columns,
            is_unique,
            cursor_prefix: None,
        }
    }

    /// Make the order deterministic for cursor pagination by appending every primary-key column in
    /// ascending order. Already unique orders are left alone, so applying this twice is the same as
    /// applying it once.
    pub fn ensure_unique(mut self, primary_key: &[&str]) -> Self {
        if self.is_unique || primary_key.is_empty() {
            return self;
        }

        self.cursor_prefix = Some(vec![PRIMARY_KEY_ASC.to_string()]);
        self.columns
            .extend(primary_key.iter().map(|column| OrderColumn {
                column: column.to_string(),
                ordering: Ordering::Asc,
            }));
        self.is_unique = true;
        self
    }

    pub fn order_by(&self, alias: &TableAlias) -> Option<OrderBy> {
        (!self.columns.is_empty()).then(|| {
            OrderBy(
                self.columns
                    .iter()
                    .map(|c| OrderByElement::new(Column::physical(&c.column, alias), c.ordering))
                    .collect(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use poly_sql::ExpressionBuilder;

    use super::*;

    #[test]
    fn appends_primary_key_once() {
        let requested = QueryOrder::new(
            vec![OrderColumn {
                column: "created_at".to_string(),
                ordering: Ordering::Desc,
            }],
            false,
        );

        let order = requested.ensure_unique(&["id"]);
        assert_eq!(order.cursor_prefix, Some(vec!["primary_key_asc".to_string()]));
        assert!(order.is_unique);
        assert_eq!(order.clone().ensure_unique(&["id"]), order);

        let alias = TableAlias::new("notes_1");
        assert_eq!(
            order.order_by(&alias).map(|o| o.to_sql().0),
            Some(r#"ORDER BY "notes_1"."created_at" DESC, "notes_1"."id" ASC"#.to_string())
        );
    }

    #[test]
    fn unique_order_is_kept() {
        let requested = QueryOrder::new(
            vec![OrderColumn {
                column: "id".to_string(),
                ordering: Ordering::Desc,
            }],
            true,
        );

        assert_eq!(requested.clone().ensure_unique(&["id"]), requested);
    }

    #[test]
    fn composite_primary_key() {
        let order = QueryOrder::default().ensure_unique(&["tenant_id", "id"]);

        let columns: Vec<_> = order.columns.iter().map(|c| c.column.as_str()).collect();
        assert_eq!(columns, vec!["tenant_id", "id"]);
        assert!(order.columns.iter().all(|c| c.ordering == Ordering::Asc));
    }
}
