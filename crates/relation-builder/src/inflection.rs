// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use heck::{ToLowerCamelCase, ToUpperCamelCase};
use poly_catalog::Table;
use relation_model::PolymorphicConstraint;

/// Naming conventions of the host schema. Hosts with their own conventions override the
/// relevant methods; everything derived from them (type names, field names) follows along.
pub trait Inflector: Send + Sync {
    fn singularize(&self, word: &str) -> String;

    fn pluralize(&self, word: &str) -> String;

    fn camel_case(&self, s: &str) -> String {
        s.to_lower_camel_case()
    }

    fn upper_camel_case(&self, s: &str) -> String {
        s.to_upper_camel_case()
    }

    /// The GraphQL object type of a table (`notes` -> `Note`), honouring a `@name` tag.
    fn table_type(&self, table: &Table) -> String {
        let name = table
            .tags
            .get("name")
            .and_then(|name| name.as_str())
            .unwrap_or(&table.name);
        self.upper_camel_case(&self.singularize(name))
    }

    fn filter_type(&self, type_name: &str) -> String {
        format!("{type_name}Filter")
    }

    /// `notes` -> `NotesConnection`
    fn connection_type(&self, table: &Table) -> String {
        format!(
            "{}Connection",
            self.upper_camel_case(&self.pluralize(&self.table_type(table)))
        )
    }

    /// `locations` and `noteable` -> `locationAsNoteable`
    fn forward_relation_by_polymorphic(&self, target: &Table, association: &str) -> String {
        self.camel_case(&format!(
            "{}-as-{}",
            self.singularize(&target.name),
            association
        ))
    }

    /// `notes` -> `note` when at most one note may point at a target, `notes` otherwise. An
    /// association name given through `@isPolymorphic <name>` replaces the table name.
    fn backward_relation_by_polymorphic(
        &self,
        source: &Table,
        constraint: &PolymorphicConstraint,
        is_unique: bool,
    ) -> String {
        let base = constraint
            .backward_association_name
            .as_deref()
            .unwrap_or(&source.name);

        if is_unique {
            self.camel_case(&self.singularize(base))
        } else {
            self.camel_case(&self.pluralize(base))
        }
    }

    /// The input type filtering the many `source` rows pointing at a `target` row through the
    /// backward field `field_name` (`LocationToManyNotePolyFilter`). A field not named after the
    /// source table adds its name, so that each association of a source gets its own type
    /// (`LocationToManyNoteAttachmentsPolyFilter`).
    fn filter_many_poly_type(&self, target: &Table, source: &Table, field_name: &str) -> String {
        let association = if field_name == self.camel_case(&self.pluralize(&source.name)) {
            String::new()
        } else {
            self.upper_camel_case(field_name)
        };

        format!(
            "{}ToMany{}{}PolyFilter",
            self.table_type(target),
            self.table_type(source),
            association
        )
    }

    fn relation_exists_field(&self, field_name: &str) -> String {
        format!("{field_name}Exists")
    }
}

/// Conventions of the host's default inflection, backed by `heck` and `pluralizer`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultInflector;

impl Inflector for DefaultInflector {
    fn singularize(&self, word: &str) -> String {
        pluralizer::pluralize(word, 1, false)
    }

    fn pluralize(&self, word: &str) -> String {
        let plural = pluralizer::pluralize(word, 2, false);
        if plural == word && !word.ends_with('s') {
            // Force pluralization if the pluralizer returns the same string
            format!("{word}s")
        } else {
            plural
        }
    }
}
