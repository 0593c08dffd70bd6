// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::{ArgMatches, Command};
use colored::Colorize;
use relation_builder::{
    BuildContext, BuildInputs, ConstraintStage, HostCapabilities, HostSchema, ModelMapStage,
    PolyRelationPlugin, inflection::DefaultInflector,
};

use super::{
    command::{CommandDefinition, catalog_arg, flag_arg, get_required, schema_arg},
    util::{flag, read_catalog, relation_options},
};

pub struct AssociationsCommandDefinition {}

impl CommandDefinition for AssociationsCommandDefinition {
    fn command(&self) -> Command {
        Command::new("associations")
            .about("List the polymorphic associations found in a catalog")
            .arg(catalog_arg())
            .arg(schema_arg())
            .arg(flag_arg("json", "Print the associations as JSON"))
    }

    fn execute(&self, matches: &ArgMatches) -> Result<()> {
        let catalog_path: PathBuf = get_required(matches, "catalog")?;

        let catalog = read_catalog(&catalog_path)?;
        let options = relation_options(matches)?;

        let context = PolyRelationPlugin::with_stages(vec![
            Box::new(ModelMapStage),
            Box::new(ConstraintStage),
        ])
        .run(
            &BuildInputs {
                catalog: &catalog,
                options: &options,
                inflector: &DefaultInflector,
                capabilities: &HostCapabilities::new(),
                host_schema: &HostSchema::new(),
            },
            BuildContext::default(),
        )?;

        let constraints = context
            .constraints()
            .ok_or_else(|| anyhow!("No associations were extracted"))?;

        if flag(matches, "json") {
            println!("{}", serde_json::to_string_pretty(constraints)?);
            return Ok(());
        }

        if constraints.is_empty() {
            println!("{}", "No polymorphic associations found".yellow());
            return Ok(());
        }

        for constraint in constraints {
            let table = catalog
                .table(&constraint.from)
                .map(|table| format!("{}.{}", table.schema, table.name))
                .unwrap_or_else(|| constraint.from.to_string());

            let targets = constraint
                .to
                .iter()
                .map(|target| target.model_name.as_str())
                .collect::<Vec<_>>()
                .join(", ");

            println!(
                "{}.{} -> {}",
                table.bold(),
                constraint.name.cyan(),
                targets.green()
            );
            if let Some(backward) = &constraint.backward_association_name {
                println!("  backward name: {backward}");
            }
        }

        Ok(())
    }
}
