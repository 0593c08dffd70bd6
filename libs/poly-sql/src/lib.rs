// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Safe SQL fragment building for the polymorphic relation plugins.
//!
//! Fragments are assembled from typed pieces ([Column], [Predicate], [Select], ...) and rendered
//! through an [SQLBuilder], which quotes identifiers and turns every literal into a positional
//! parameter. Nothing in this crate talks to a database; the host executes the rendered SQL.

#[macro_use]
mod sql;

pub use sql::{
    column::Column,
    expression_builder::ExpressionBuilder,
    order::{OrderBy, OrderByElement, Ordering},
    predicate::Predicate,
    select::{Select, Selection},
    sql_builder::SQLBuilder,
    sql_param::{SQLParam, SQLParamContainer},
    table::{AliasGenerator, PhysicalTableName, TableAlias, TableReference},
};
