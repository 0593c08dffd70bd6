// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! GraphQL SDL rendering of a [`PolySchemaExtension`].

use std::fmt::{self, Display, Formatter};

use crate::PolySchemaExtension;

const INDENT: &str = "  ";

/// Renders `extend type` blocks for relation fields, `input` blocks for new filter types and
/// `extend input` blocks for fields added to the host's filter types, separated by blank lines.
impl Display for PolySchemaExtension {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut blocks = vec![];

        for (type_name, fields) in self.relation_types() {
            let fields = fields
                .values()
                .map(|field| (field.name.as_str(), field.typ.to_string(), field.description.as_str()))
                .collect::<Vec<_>>();
            blocks.push(block(None, &format!("extend type {type_name}"), &fields));
        }

        for input_type in self.filter_input_types() {
            let fields = input_type
                .fields
                .iter()
                .map(|field| (field.name.as_str(), field.input_type.clone(), field.description.as_str()))
                .collect::<Vec<_>>();
            blocks.push(block(
                Some(input_type.description.as_str()),
                &format!("input {}", input_type.name),
                &fields,
            ));
        }

        for (filter_type, fields) in self.filter_types() {
            let fields = fields
                .values()
                .map(|field| (field.name.as_str(), field.input_type.clone(), field.description.as_str()))
                .collect::<Vec<_>>();
            blocks.push(block(None, &format!("extend input {filter_type}"), &fields));
        }

        write!(f, "{}", blocks.join("\n"))
    }
}

fn block(description: Option<&str>, header: &str, fields: &[(&str, String, &str)]) -> String {
    let mut out = String::new();

    if let Some(description) = description {
        out.push_str(&format!("\"\"\"{description}\"\"\"\n"));
    }
    out.push_str(&format!("{header} {{\n"));
    for (name, typ, description) in fields {
        out.push_str(&format!("{INDENT}\"\"\"{description}\"\"\"\n"));
        out.push_str(&format!("{INDENT}{name}: {typ}\n"));
    }
    out.push_str("}\n");

    out
}
