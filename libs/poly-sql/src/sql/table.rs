// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::cell::Cell;

use serde::{Deserialize, Serialize};

use super::{ExpressionBuilder, SQLBuilder};

/// A schema-qualified table name such as `"public"."notes"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhysicalTableName {
    pub name: String,
    pub schema: Option<String>,
}

impl PhysicalTableName {
    pub fn new(name: impl Into<String>, schema: Option<&str>) -> Self {
        Self {
            name: name.into(),
            schema: schema.map(|s| s.to_string()),
        }
    }
}

impl ExpressionBuilder for PhysicalTableName {
    fn build(&self, builder: &mut SQLBuilder) {
        if let Some(schema) = &self.schema {
            builder.push_identifier(schema);
            builder.push('.');
        }
        builder.push_identifier(&self.name);
    }
}

/// The alias a table is known by inside a fragment (`... FROM "public"."notes" AS "notes_1"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableAlias(String);

impl TableAlias {
    pub fn new(alias: impl Into<String>) -> Self {
        Self(alias.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ExpressionBuilder for TableAlias {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_identifier(&self.0);
    }
}

/// A table together with the alias it is bound to.
#[derive(Debug, Clone, PartialEq)]
pub struct TableReference {
    pub name: PhysicalTableName,
    pub alias: TableAlias,
}

impl ExpressionBuilder for TableReference {
    fn build(&self, builder: &mut SQLBuilder) {
        self.name.build(builder);
        builder.push_str(" AS ");
        self.alias.build(builder);
    }
}

/// Hands out unique table aliases for the duration of one fragment compilation. Aliases are
/// derived from a counter (not from addresses or random values), so compiling the same filter
/// twice yields byte-identical SQL.
#[derive(Debug, Default)]
pub struct AliasGenerator {
    next: Cell<usize>,
}

impl AliasGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_alias(&self, table_name: &str) -> TableAlias {
        let id = self.next.get() + 1;
        self.next.set(id);
        TableAlias(format!("{table_name}_{id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualified_table_reference() {
        let reference = TableReference {
            name: PhysicalTableName::new("notes", Some("public")),
            alias: TableAlias::new("notes_1"),
        };

        assert_eq!(reference.to_sql().0, r#""public"."notes" AS "notes_1""#);
    }

    #[test]
    fn aliases_are_deterministic() {
        let aliases = AliasGenerator::new();
        assert_eq!(aliases.next_alias("locations").as_str(), "locations_1");
        assert_eq!(aliases.next_alias("notes").as_str(), "notes_2");

        let again = AliasGenerator::new();
        assert_eq!(again.next_alias("locations").as_str(), "locations_1");
    }
}
