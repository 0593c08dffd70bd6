// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use crate::FilterFieldResolver;

/// A field added to an existing filter input type, such as `locationAsNoteable` on `NoteFilter`.
#[derive(Debug, Clone)]
pub struct FilterFieldSpec {
    /// The filter input type carrying the field (`NoteFilter`)
    pub filter_type: String,
    pub name: String,
    pub description: String,
    /// The type of the field's value (`LocationFilter`, `LocationToManyNotePolyFilter`, ...)
    pub input_type: String,
    pub resolver: Arc<dyn FilterFieldResolver>,
}

/// An input type introduced for filtering, currently only the `every`/`some`/`none` types of
/// backward relations to many rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterInputType {
    pub name: String,
    pub description: String,
    pub fields: Vec<FilterInputField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterInputField {
    pub name: String,
    pub input_type: String,
    pub description: String,
}
