// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use super::{
    ExpressionBuilder, SQLBuilder, column::Column, order::OrderBy, predicate::Predicate,
    table::TableReference,
};

/// What a [Select] returns.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// `SELECT 1`, for existence checks
    One,
    Columns(Vec<Column>),
}

/// A single-table select, used both for `EXISTS` sub-selects and for the scoped sub-queries
/// that resolve relation fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub selection: Selection,
    pub from: TableReference,
    pub predicate: Predicate,
    pub order_by: Option<OrderBy>,
}

impl Select {
    /// `SELECT 1 FROM <from> WHERE <predicate>`
    pub fn one(from: TableReference, predicate: Predicate) -> Self {
        Self {
            selection: Selection::One,
            from,
            predicate,
            order_by: None,
        }
    }
}

impl ExpressionBuilder for Select {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_str("SELECT ");
        match &self.selection {
            Selection::One => builder.push('1'),
            Selection::Columns(columns) => builder.push_elems(columns, ", "),
        }

        builder.push_str(" FROM ");
        self.from.build(builder);

        // Avoid correct, but inelegant "WHERE TRUE" clause
        if self.predicate != Predicate::True {
            builder.push_str(" WHERE ");
            self.predicate.build(builder);
        }

        if let Some(order_by) = &self.order_by {
            builder.push_space();
            order_by.build(builder);
        }
    }
}
