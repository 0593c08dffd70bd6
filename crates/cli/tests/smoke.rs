// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command, Output},
};

fn poly_schema<'a>(args: impl IntoIterator<Item = &'a str>) -> Output {
    let bin = env!("CARGO_BIN_EXE_poly-schema");

    let mut cmd = Command::new(bin);
    for key in [
        "POLY_SCHEMAS",
        "POLY_FILTER_FORWARD",
        "POLY_FILTER_BACKWARD",
        "POLY_FILTER_RELATION_EXISTS",
    ] {
        cmd.env_remove(key);
    }
    cmd.args(args).output().expect("Failed to run poly-schema")
}

fn catalog_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/catalog.json")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn prints_relation_fields() {
    let catalog = catalog_path();
    let output = poly_schema(["schema", catalog.to_str().unwrap()]);

    assert!(output.status.success());
    let sdl = stdout(&output);
    assert!(sdl.contains("extend type Note {\n"));
    assert!(sdl.contains("  locationAsNoteable: Location\n"));
    assert!(sdl.contains("  notes: NotesConnection!\n"));
    assert!(!sdl.contains("extend input"));
}

#[test]
fn filters_need_the_filter_plugin() {
    let catalog = catalog_path();

    let output = poly_schema(["schema", catalog.to_str().unwrap(), "--filter-backward"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("connection-filter"));

    let output = poly_schema([
        "schema",
        catalog.to_str().unwrap(),
        "--filter-backward",
        "--with-filter-plugin",
    ]);
    assert!(output.status.success());
    let sdl = stdout(&output);
    assert!(sdl.contains("input LocationToManyNotePolyFilter {\n"));
    assert!(sdl.contains("  notesExists: Boolean\n"));
}

#[test]
fn writes_output_file() {
    let cargo_tmp_dir = env!("CARGO_TARGET_TMPDIR");
    let tmp_dir = tempfile::tempdir_in(cargo_tmp_dir).expect("Failed to create tempdir");
    let output_file = tmp_dir.path().join("schema.graphql");
    let catalog = catalog_path();

    let output = poly_schema([
        "schema",
        catalog.to_str().unwrap(),
        "-o",
        output_file.to_str().unwrap(),
    ]);

    assert!(output.status.success());
    assert!(stdout(&output).is_empty());
    let sdl = fs::read_to_string(&output_file).unwrap();
    assert!(sdl.starts_with("extend type Note {\n"));
}

#[test]
fn lists_associations() {
    let catalog = catalog_path();
    let output = poly_schema(["associations", catalog.to_str().unwrap()]);

    assert!(output.status.success());
    let listing = stdout(&output);
    assert!(listing.contains("public.notes"));
    assert!(listing.contains("noteable"));
    assert!(listing.contains("Location"));
}

#[test]
fn unknown_schema_hides_everything() {
    let catalog = catalog_path();
    let output = poly_schema(["associations", catalog.to_str().unwrap(), "--schema", "app"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("No polymorphic associations found"));
}

#[test]
fn associations_as_json() {
    let catalog = catalog_path();
    let output = poly_schema(["associations", catalog.to_str().unwrap(), "--json"]);

    assert!(output.status.success());
    let associations: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        associations,
        serde_json::json!([{
            "name": "noteable",
            "from": "notes",
            "to": [{"table": "locations", "primaryKey": "id", "modelName": "Location"}],
            "backwardAssociationName": null
        }])
    );
}
