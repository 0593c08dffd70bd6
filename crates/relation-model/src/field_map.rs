// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use indexmap::IndexMap;

use crate::FieldMapError;

/// Fields keyed by name, in insertion order. Unlike a plain map, a second field with the same
/// name is rejected instead of replacing the first.
#[derive(Debug, Clone)]
pub struct FieldMap<T>(IndexMap<String, T>);

impl<T> Default for FieldMap<T> {
    fn default() -> Self {
        Self(IndexMap::new())
    }
}

impl<T> FieldMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: T) -> Result<(), FieldMapError> {
        let name = name.into();
        if self.0.contains_key(&name) {
            return Err(FieldMapError::Duplicate(name));
        }
        self.0.insert(name, value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.0.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicates() {
        let mut fields = FieldMap::new();
        fields.insert("locationAsNoteable", 1).unwrap();
        fields.insert("workflowAsNoteable", 2).unwrap();

        assert_eq!(
            fields.insert("locationAsNoteable", 3),
            Err(FieldMapError::Duplicate("locationAsNoteable".to_string()))
        );
        assert_eq!(fields.get("locationAsNoteable"), Some(&1));
        assert_eq!(
            fields.names().collect::<Vec<_>>(),
            vec!["locationAsNoteable", "workflowAsNoteable"]
        );
    }
}
