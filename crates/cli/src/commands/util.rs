// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{fs, io::Write, path::Path};

use anyhow::{Context, Result};
use clap::ArgMatches;
use poly_catalog::Catalog;
use relation_builder::config::{PolyRelationOptions, SystemEnvironment};

pub(super) fn read_catalog(path: &Path) -> Result<Catalog> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog `{}`", path.display()))?;

    Ok(Catalog::from_json(&json)?)
}

/// Options from the environment, overridden by any flags given on the command line.
pub(super) fn relation_options(matches: &ArgMatches) -> Result<PolyRelationOptions> {
    let mut options = PolyRelationOptions::from_env(&SystemEnvironment)?;

    if let Some(schemas) = matches.get_many::<String>("schema") {
        options = options.with_schemas(schemas.cloned());
    }
    if flag(matches, "filter-forward") {
        options = options.with_filter_forward(true);
    }
    if flag(matches, "filter-backward") {
        options = options.with_filter_backward(true);
    }

    Ok(options)
}

/// Whether a flag is set, `false` for flags the command does not define.
pub(super) fn flag(matches: &ArgMatches, id: &str) -> bool {
    matches
        .try_get_one::<bool>(id)
        .ok()
        .flatten()
        .copied()
        .unwrap_or(false)
}

pub(super) fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => fs::write(path, content)
            .with_context(|| format!("Failed to write `{}`", path.display()))?,
        None => std::io::stdout().write_all(content.as_bytes())?,
    }

    Ok(())
}
