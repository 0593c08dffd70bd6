// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FieldMapError {
    #[error("Field `{0}` is already defined")]
    Duplicate(String),
}

/// Failures while turning a filter value into SQL. These surface at query time, after the schema
/// has been built.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FilterResolveError {
    #[error("No filter field `{field}` on `{filter_type}`")]
    UnknownField { filter_type: String, field: String },

    #[error("Invalid value for `{field}`: expected {expected}, found `{found}`")]
    InvalidValue {
        field: String,
        expected: &'static str,
        found: String,
    },

    #[error("Unknown quantifier `{0}`; expected one of `every`, `some`, `none`")]
    UnknownQuantifier(String),
}
