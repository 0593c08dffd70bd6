// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Relation and filter fields for polymorphic associations: a `<name>_id`/`<name>_type` column
//! pair whose type column names which table the id refers to.
//!
//! [`PolyRelationPlugin`] runs over a [`poly_catalog::Catalog`] and produces a
//! [`PolySchemaExtension`] with
//! - forward fields on the holding table (`note.locationAsNoteable`),
//! - backward fields on each target table (`location.notes`),
//! - optionally, filter fields following both directions, backed by resolvers that compile filter
//!   values into SQL predicates.

pub mod cardinality;
pub mod config;
pub mod constraint_extractor;
pub mod field_synthesizer;
pub mod filter_synthesizer;
pub mod inflection;
pub mod model_map;

mod error;
mod extension;
mod host;
mod plugin;
mod sdl;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;

pub use error::PolyBuildingError;
pub use extension::PolySchemaExtension;
pub use host::{CONNECTION_FILTER, HostCapabilities, HostSchema};
pub use plugin::{
    BackwardRelationStage, BuildContext, BuildInputs, BuildStage, ConstraintStage,
    ForwardRelationStage, ModelMapStage, PolyRelationPlugin, RelationFilterStage,
};
