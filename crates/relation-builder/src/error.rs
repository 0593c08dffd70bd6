// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use poly_catalog::CatalogError;
use thiserror::Error;

use crate::config::EnvError;

#[derive(Error, Debug)]
pub enum PolyBuildingError {
    #[error("`{required_by}` requires `{capability}`, which is not available")]
    MissingCapability {
        capability: String,
        required_by: String,
    },

    #[error("Model name `{model_name}` maps to both `{first}` and `{second}`")]
    DuplicateModelName {
        model_name: String,
        first: String,
        second: String,
    },

    #[error("Model names `{first}` and `{second}` share the canonical name `{canonical}`")]
    AmbiguousModelName {
        canonical: String,
        first: String,
        second: String,
    },

    #[error("Field `{field}` is already defined on `{type_name}`")]
    FieldNameCollision { type_name: String, field: String },

    #[error("Filter type `{0}` is already defined for a different association")]
    FilterTypeCollision(String),

    #[error("{0}")]
    Catalog(#[from] CatalogError),

    #[error("{0}")]
    Env(#[from] EnvError),
}

impl PolyBuildingError {
    pub(crate) fn missing(capability: &str, required_by: &str) -> Self {
        PolyBuildingError::MissingCapability {
            capability: capability.to_string(),
            required_by: required_by.to_string(),
        }
    }
}
