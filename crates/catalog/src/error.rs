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
pub enum CatalogError {
    #[error("Class `{class}` references unknown namespace `{namespace_id}`")]
    UnknownNamespace { class: String, namespace_id: String },

    #[error("{context} references unknown class `{class_id}`")]
    UnknownClass { context: String, class_id: String },

    #[error("Constraint `{constraint}` references unknown attribute number {num}")]
    UnknownAttribute { constraint: String, num: i16 },

    #[error("Duplicate class id `{0}`")]
    DuplicateClassId(String),

    #[error("Invalid catalog JSON: {0}")]
    Json(String),
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Json(e.to_string())
    }
}
