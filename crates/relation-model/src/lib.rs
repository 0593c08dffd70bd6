// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Descriptors produced while synthesizing polymorphic relations: the constraints themselves,
//! the relation and filter fields derived from them, and the resolver registry through which the
//! host's filter compiler reaches the synthesized SQL.

mod constraint;
mod error;
mod field_map;
mod filter;
mod join;
mod order;
mod relation;
mod resolver;

pub use constraint::{PolymorphicConstraint, PolymorphicTarget};
pub use error::{FieldMapError, FilterResolveError};
pub use field_map::FieldMap;
pub use filter::{FilterFieldSpec, FilterInputField, FilterInputType};
pub use join::{PolyJoin, poly_sql_key_match};
pub use order::{OrderColumn, PRIMARY_KEY_ASC, QueryOrder};
pub use relation::{Cardinality, FieldShape, FieldType, RelationDirection, RelationFieldSpec};
pub use resolver::{FilterCompiler, FilterFieldResolver, FilterResolverRegistry, ResolveFieldProps};
