// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Normalized, read-only view of the PostgreSQL catalog a schema build runs over.
//!
//! The host hands over raw introspection rows ([RawCatalog]), usually as JSON. [Catalog::from_raw]
//! resolves the id references between those rows and indexes the result, so that later stages can
//! ask for a table by id, its primary key, or a column's tags without re-scanning.

mod catalog;
mod error;
mod raw;
mod tags;

pub use catalog::{
    Catalog, Column, Constraint, ConstraintKind, OmitAction, Procedure, Table, TableId, TableKind,
};
pub use error::CatalogError;
pub use raw::{RawAttribute, RawCatalog, RawClass, RawConstraint, RawNamespace, RawProcedure};
pub use tags::{TagValue, Tags, parse_smart_comment};
