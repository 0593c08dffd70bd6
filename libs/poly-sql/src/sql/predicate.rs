// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use super::{ExpressionBuilder, SQLBuilder, column::Column, select::Select};

/// A predicate is a boolean expression that can be used in a WHERE clause.
#[derive(Debug, PartialEq, Clone)]
pub enum Predicate {
    True,
    False,
    Eq(Column, Column),
    Neq(Column, Column),
    Lt(Column, Column),
    Lte(Column, Column),
    Gt(Column, Column),
    Gte(Column, Column),
    // `EXISTS (<sub-select>)`
    Exists(Box<Select>),
    // Prefer Predicate::and(), which simplifies the clause
    And(Box<Predicate>, Box<Predicate>),
    // Prefer Predicate::or(), which simplifies the clause
    Or(Box<Predicate>, Box<Predicate>),
    // Prefer `!predicate`, which simplifies the clause
    Not(Box<Predicate>),
}

impl Predicate {
    /// Compare two columns and reduce to a simpler predicate if possible.
    pub fn eq(lhs: Column, rhs: Column) -> Predicate {
        if lhs == rhs {
            Predicate::True
        } else {
            match lhs.param_eq(&rhs) {
                Some(false) => Predicate::False,
                _ => Predicate::Eq(lhs, rhs),
            }
        }
    }

    pub fn neq(lhs: Column, rhs: Column) -> Predicate {
        !Self::eq(lhs, rhs)
    }

    pub fn and(lhs: Predicate, rhs: Predicate) -> Predicate {
        match (lhs, rhs) {
            (Predicate::False, _) | (_, Predicate::False) => Predicate::False,
            (Predicate::True, rhs) => rhs,
            (lhs, Predicate::True) => lhs,
            (lhs, rhs) => Predicate::And(Box::new(lhs), Box::new(rhs)),
        }
    }

    pub fn or(lhs: Predicate, rhs: Predicate) -> Predicate {
        match (lhs, rhs) {
            (Predicate::True, _) | (_, Predicate::True) => Predicate::True,
            (Predicate::False, rhs) => rhs,
            (lhs, Predicate::False) => lhs,
            (lhs, rhs) => Predicate::Or(Box::new(lhs), Box::new(rhs)),
        }
    }

    pub fn exists(select: Select) -> Predicate {
        Predicate::Exists(Box::new(select))
    }

    /// Conjunction of all the given predicates (`True` for an empty iterator).
    pub fn all(predicates: impl IntoIterator<Item = Predicate>) -> Predicate {
        predicates.into_iter().fold(Predicate::True, Predicate::and)
    }
}

impl From<bool> for Predicate {
    fn from(b: bool) -> Predicate {
        if b { Predicate::True } else { Predicate::False }
    }
}

impl std::ops::Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Self::Output {
        match self {
            // Reduced to a simpler form when possible, else fall back to Predicate::Not
            Predicate::True => Predicate::False,
            Predicate::False => Predicate::True,
            Predicate::Eq(lhs, rhs) => Predicate::Neq(lhs, rhs),
            Predicate::Neq(lhs, rhs) => Predicate::Eq(lhs, rhs),
            Predicate::Lt(lhs, rhs) => Predicate::Gte(lhs, rhs),
            Predicate::Lte(lhs, rhs) => Predicate::Gt(lhs, rhs),
            Predicate::Gt(lhs, rhs) => Predicate::Lte(lhs, rhs),
            Predicate::Gte(lhs, rhs) => Predicate::Lt(lhs, rhs),
            Predicate::Not(predicate) => *predicate,
            predicate => Predicate::Not(Box::new(predicate)),
        }
    }
}

impl ExpressionBuilder for Predicate {
    fn build(&self, builder: &mut SQLBuilder) {
        match self {
            Predicate::True => builder.push_str("TRUE"),
            Predicate::False => builder.push_str("FALSE"),
            Predicate::Eq(column1, column2) => relational_combine(column1, column2, "=", builder),
            Predicate::Neq(column1, column2) => {
                relational_combine(column1, column2, "<>", builder)
            }
            Predicate::Lt(column1, column2) => relational_combine(column1, column2, "<", builder),
            Predicate::Lte(column1, column2) => {
                relational_combine(column1, column2, "<=", builder)
            }
            Predicate::Gt(column1, column2) => relational_combine(column1, column2, ">", builder),
            Predicate::Gte(column1, column2) => {
                relational_combine(column1, column2, ">=", builder)
            }
            Predicate::Exists(select) => {
                builder.push_str("EXISTS (");
                select.build(builder);
                builder.push(')');
            }
            Predicate::And(predicate1, predicate2) => {
                logical_combine(predicate1, predicate2, "AND", builder)
            }
            Predicate::Or(predicate1, predicate2) => {
                logical_combine(predicate1, predicate2, "OR", builder)
            }
            Predicate::Not(predicate) => match predicate.as_ref() {
                Predicate::Exists(select) => {
                    builder.push_str("NOT EXISTS (");
                    select.build(builder);
                    builder.push(')');
                }
                predicate => {
                    builder.push_str("NOT (");
                    predicate.build(builder);
                    builder.push(')');
                }
            },
        }
    }
}

fn relational_combine(
    left: &Column,
    right: &Column,
    op: &'static str,
    builder: &mut SQLBuilder,
) {
    left.build(builder);
    builder.push_space();
    builder.push_str(op);
    builder.push_space();
    right.build(builder);
}

fn logical_combine(
    left: &Predicate,
    right: &Predicate,
    op: &'static str,
    builder: &mut SQLBuilder,
) {
    builder.push('(');
    left.build(builder);
    builder.push_space();
    builder.push_str(op);
    builder.push_space();
    right.build(builder);
    builder.push(')');
}
