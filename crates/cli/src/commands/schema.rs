// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgMatches, Command};
use relation_builder::{
    BuildInputs, CONNECTION_FILTER, HostCapabilities, HostSchema, PolyRelationPlugin,
    inflection::DefaultInflector,
};
use tracing::info;

use super::{
    command::{CommandDefinition, catalog_arg, flag_arg, get, get_required, output_arg, schema_arg},
    util::{flag, read_catalog, relation_options, write_output},
};

pub struct SchemaCommandDefinition {}

impl CommandDefinition for SchemaCommandDefinition {
    fn command(&self) -> Command {
        Command::new("schema")
            .about("Print the polymorphic relation fields as GraphQL SDL")
            .arg(catalog_arg())
            .arg(schema_arg())
            .arg(flag_arg(
                "filter-forward",
                "Add filter fields following forward relations (`POLY_FILTER_FORWARD`)",
            ))
            .arg(flag_arg(
                "filter-backward",
                "Add filter fields following backward relations (`POLY_FILTER_BACKWARD`)",
            ))
            .arg(flag_arg(
                "with-filter-plugin",
                "Assume the host has the connection-filter plugin loaded",
            ))
            .arg(output_arg())
    }

    fn execute(&self, matches: &ArgMatches) -> Result<()> {
        let catalog_path: PathBuf = get_required(matches, "catalog")?;
        let output: Option<PathBuf> = get(matches, "output");

        let catalog = read_catalog(&catalog_path)?;
        let options = relation_options(matches)?;

        let mut capabilities = HostCapabilities::new();
        if flag(matches, "with-filter-plugin") {
            capabilities = capabilities.with(CONNECTION_FILTER);
        }

        let extension = PolyRelationPlugin::default().build(&BuildInputs {
            catalog: &catalog,
            options: &options,
            inflector: &DefaultInflector,
            capabilities: &capabilities,
            host_schema: &HostSchema::new(),
        })?;

        info!(
            relation_types = extension.relation_types().count(),
            filter_types = extension.filter_types().count(),
            "Built schema extension"
        );

        write_output(output.as_deref(), &extension.to_string())
    }
}
