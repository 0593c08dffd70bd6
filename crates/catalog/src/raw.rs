// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde::{Deserialize, Serialize};

use crate::{CatalogError, Tags};

/// Introspection rows as produced by the host. Ids are opaque strings (PostgreSQL oids in
/// practice); kinds use the single-letter codes of `pg_class.relkind` and
/// `pg_constraint.contype`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawCatalog {
    pub namespaces: Vec<RawNamespace>,
    pub classes: Vec<RawClass>,
    pub attributes: Vec<RawAttribute>,
    pub constraints: Vec<RawConstraint>,
    pub procedures: Vec<RawProcedure>,
}

impl RawCatalog {
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNamespace {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawClass {
    pub id: String,
    pub name: String,
    pub namespace_id: String,
    pub class_kind: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub tags: Tags,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAttribute {
    pub class_id: String,
    pub num: i16,
    pub name: String,
    #[serde(default)]
    pub type_name: String,
    #[serde(default)]
    pub is_not_null: bool,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub tags: Tags,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConstraint {
    pub id: String,
    pub name: String,
    pub class_id: String,
    pub kind: String,
    pub key_attribute_nums: Vec<i16>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProcedure {
    pub id: String,
    pub name: String,
    pub namespace_id: String,
}
