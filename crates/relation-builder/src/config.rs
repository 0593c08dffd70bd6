// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Build options, read from the environment or set up programmatically.

use std::collections::HashMap;

use crate::model_map::SYSTEM_SCHEMAS;

pub const POLY_SCHEMAS: &str = "POLY_SCHEMAS";
pub const POLY_FILTER_FORWARD: &str = "POLY_FILTER_FORWARD";
pub const POLY_FILTER_BACKWARD: &str = "POLY_FILTER_BACKWARD";
pub const POLY_FILTER_RELATION_EXISTS: &str = "POLY_FILTER_RELATION_EXISTS";

pub trait Environment: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn enabled(&self, key: &str, default_value: bool) -> Result<bool, EnvError> {
        match self.get(key) {
            Some(value) => match value.to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" | "enabled" | "enable" => Ok(true),
                "false" | "0" | "no" | "off" | "disabled" | "disable" => Ok(false),
                _ => Err(EnvError::InvalidBoolean {
                    key: key.to_string(),
                    value,
                }),
            },
            None => Ok(default_value),
        }
    }

    fn get_list(&self, key: &str, default_value: Vec<String>) -> Vec<String> {
        self.get(key)
            .map(|value| {
                value
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or(default_value)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    #[error(
        "Invalid value for {key}: {value}. Expected true, 1, yes, on, enabled, enable OR false, 0, no, off, disabled, disable"
    )]
    InvalidBoolean { key: String, value: String },
}

pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Clone, Default)]
pub struct MapEnvironment {
    values: HashMap<String, String>,
}

impl Environment for MapEnvironment {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

impl<const N: usize> From<[(&str, &str); N]> for MapEnvironment {
    fn from(values: [(&str, &str); N]) -> Self {
        Self {
            values: values
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl MapEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

/// What the plugin builds and over which schemas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolyRelationOptions {
    /// Schemas whose tables take part in the build
    pub schemas: Vec<String>,
    /// Add filter fields following forward relations (`NoteFilter.locationAsNoteable`)
    pub filter_forward: bool,
    /// Add filter fields following backward relations (`LocationFilter.notes`)
    pub filter_backward: bool,
    /// Add a `<field>Exists` companion to backward filter fields over many rows
    pub filter_relation_exists: bool,
}

impl Default for PolyRelationOptions {
    fn default() -> Self {
        Self {
            schemas: vec!["public".to_string()],
            filter_forward: false,
            filter_backward: false,
            filter_relation_exists: true,
        }
    }
}

impl PolyRelationOptions {
    pub fn from_env(env: &dyn Environment) -> Result<Self, EnvError> {
        let defaults = Self::default();

        Ok(Self {
            schemas: env.get_list(POLY_SCHEMAS, defaults.schemas),
            filter_forward: env.enabled(POLY_FILTER_FORWARD, defaults.filter_forward)?,
            filter_backward: env.enabled(POLY_FILTER_BACKWARD, defaults.filter_backward)?,
            filter_relation_exists: env
                .enabled(POLY_FILTER_RELATION_EXISTS, defaults.filter_relation_exists)?,
        })
    }

    pub fn with_schemas(mut self, schemas: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.schemas = schemas.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_filter_forward(mut self, enabled: bool) -> Self {
        self.filter_forward = enabled;
        self
    }

    pub fn with_filter_backward(mut self, enabled: bool) -> Self {
        self.filter_backward = enabled;
        self
    }

    pub fn with_filter_relation_exists(mut self, enabled: bool) -> Self {
        self.filter_relation_exists = enabled;
        self
    }

    /// Whether tables of `schema` take part in the build. System schemas never do, even when
    /// listed.
    pub fn includes_schema(&self, schema: &str) -> bool {
        !SYSTEM_SCHEMAS.contains(&schema) && self.schemas.iter().any(|s| s == schema)
    }

    pub fn filters_enabled(&self) -> bool {
        self.filter_forward || self.filter_backward
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = PolyRelationOptions::from_env(&MapEnvironment::new()).unwrap();

        assert_eq!(options, PolyRelationOptions::default());
        assert!(options.includes_schema("public"));
        assert!(!options.filters_enabled());
    }

    #[test]
    fn from_env() {
        let env = MapEnvironment::from([
            (POLY_SCHEMAS, "app, audit,pg_catalog"),
            (POLY_FILTER_FORWARD, "yes"),
            (POLY_FILTER_RELATION_EXISTS, "off"),
        ]);
        let options = PolyRelationOptions::from_env(&env).unwrap();

        assert_eq!(options.schemas, vec!["app", "audit", "pg_catalog"]);
        assert!(options.filter_forward);
        assert!(!options.filter_backward);
        assert!(!options.filter_relation_exists);
        assert!(options.includes_schema("audit"));
        assert!(!options.includes_schema("public"));
        assert!(!options.includes_schema("pg_catalog"));
    }

    #[test]
    fn invalid_boolean() {
        let env = MapEnvironment::from([(POLY_FILTER_BACKWARD, "sometimes")]);

        assert!(matches!(
            PolyRelationOptions::from_env(&env),
            Err(EnvError::InvalidBoolean { key, value }) if key == POLY_FILTER_BACKWARD && value == "sometimes"
        ));
    }
}
