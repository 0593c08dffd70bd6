// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::fmt;

use poly_catalog::TableId;

use crate::{PolyJoin, QueryOrder};

/// How many rows a relation field can yield.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// At most one: forward fields, and backward fields whose `_id`/`_type` pair is unique on
    /// the source table
    Unique,
    Many,
}

impl Cardinality {
    pub fn is_unique(&self) -> bool {
        matches!(self, Cardinality::Unique)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationDirection {
    /// From the row holding `<name>_id`/`<name>_type` to the row it points at
    Forward,
    /// From a possible target row to the rows pointing at it
    Backward,
}

/// A GraphQL type reference. A bare [FieldType::Reference] is non-null.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Optional(Box<FieldType>),
    Reference { type_name: String },
    List(Box<FieldType>),
}

impl FieldType {
    pub fn reference(type_name: impl Into<String>) -> Self {
        FieldType::Reference {
            type_name: type_name.into(),
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            FieldType::Optional(underlying) | FieldType::List(underlying) => underlying.type_name(),
            FieldType::Reference { type_name } => type_name,
        }
    }

    pub fn optional(&self) -> Self {
        match self {
            FieldType::Optional(_) => self.clone(),
            _ => FieldType::Optional(Box::new(self.clone())),
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, FieldType::Optional(_))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Optional(underlying) => match underlying.as_ref() {
                FieldType::Reference { type_name } => write!(f, "{type_name}"),
                FieldType::List(element) => write!(f, "[{element}]"),
                FieldType::Optional(inner) => write!(f, "{}", inner.optional()),
            },
            FieldType::Reference { type_name } => write!(f, "{type_name}!"),
            FieldType::List(element) => write!(f, "[{element}]!"),
        }
    }
}

/// The value a relation field produces.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldShape {
    /// At most one related row
    Single,
    /// A paginated connection over the related rows, read in `order`
    Connection { order: QueryOrder },
}

/// A synthesized association field.
///
/// For `Location.notes` (assuming `notes.noteable_*` may point to `Location`), we will have:
/// - direction: Backward
/// - source: notes, target: locations
/// - shape: Connection (ordered by `notes.id` unless a unique order is requested)
/// - join: `notes.noteable_id = locations.id AND notes.noteable_type = 'Location'`
#[derive(Debug, Clone, PartialEq)]
pub struct RelationFieldSpec {
    pub name: String,
    pub description: String,
    pub direction: RelationDirection,
    /// The table holding the `_id`/`_type` pair
    pub source: TableId,
    /// The table the pair points at
    pub target: TableId,
    pub cardinality: Cardinality,
    /// Name of the owning association (`noteable`)
    pub association: String,
    pub typ: FieldType,
    pub shape: FieldShape,
    pub join: PolyJoin,
}

impl RelationFieldSpec {
    /// The table whose GraphQL type carries this field
    pub fn declared_on(&self) -> &TableId {
        match self.direction {
            RelationDirection::Forward => &self.source,
            RelationDirection::Backward => &self.target,
        }
    }

    /// The table this field reads rows from
    pub fn reads_from(&self) -> &TableId {
        match self.direction {
            RelationDirection::Forward => &self.target,
            RelationDirection::Backward => &self.source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sdl_type_references() {
        let location = FieldType::reference("Location");

        assert_eq!(location.to_string(), "Location!");
        assert_eq!(location.optional().to_string(), "Location");
        assert_eq!(location.optional().optional(), location.optional());
        assert_eq!(
            FieldType::List(Box::new(location.clone())).to_string(),
            "[Location!]!"
        );
        assert_eq!(
            FieldType::List(Box::new(location.optional()))
                .optional()
                .to_string(),
            "[Location]"
        );
        assert_eq!(location.optional().type_name(), "Location");
    }
}
