// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The value of a single smart tag. `@isPolymorphic` alone is `Bool(true)`, `@isPolymorphic
/// taggings` is `String`, and a tag repeated on several lines becomes a `List`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Bool(bool),
    String(String),
    List(Vec<String>),
}

impl TagValue {
    /// Whether the tag counts as "set". `false` and the empty string do not.
    pub fn is_truthy(&self) -> bool {
        match self {
            TagValue::Bool(b) => *b,
            TagValue::String(s) => !s.is_empty(),
            TagValue::List(values) => !values.is_empty(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TagValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// All string values of the tag; a single string counts as a one-element list.
    pub fn values(&self) -> Vec<&str> {
        match self {
            TagValue::Bool(_) => vec![],
            TagValue::String(s) => vec![s.as_str()],
            TagValue::List(values) => values.iter().map(|v| v.as_str()).collect(),
        }
    }
}

/// Smart tags attached to a class or attribute, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(IndexMap<String, TagValue>);

impl Tags {
    pub fn get(&self, key: &str) -> Option<&TagValue> {
        self.0.get(key)
    }

    pub fn is_set(&self, key: &str) -> bool {
        self.get(key).is_some_and(TagValue::is_truthy)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: TagValue) {
        self.0.insert(key.into(), value);
    }

    /// Record another occurrence of `key`, turning repeated occurrences into a list.
    fn push(&mut self, key: &str, value: TagValue) {
        let merged = match (self.0.shift_remove(key), value) {
            (None, value) => value,
            (Some(TagValue::List(mut values)), TagValue::String(s)) => {
                values.push(s);
                TagValue::List(values)
            }
            (Some(TagValue::String(existing)), TagValue::String(s)) => {
                TagValue::List(vec![existing, s])
            }
            // A bare `@tag` repeated, or mixed with valued occurrences: last one wins
            (Some(_), value) => value,
        };
        self.0.insert(key.to_string(), merged);
    }

    /// Overlay `other` on top of `self`; keys present in `other` win.
    pub fn merged_with(mut self, other: &Tags) -> Tags {
        for (key, value) in other.0.iter() {
            self.0.insert(key.clone(), value.clone());
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<const N: usize> From<[(&str, TagValue); N]> for Tags {
    fn from(values: [(&str, TagValue); N]) -> Self {
        Tags(
            values
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }
}

/// Split a PostgreSQL comment into its smart tags and the remaining description.
///
/// Leading lines of the form `@tag` or `@tag value` are tags; parsing stops at the first line
/// that is not a tag, and everything from there on is the description.
///
/// ```text
/// @isPolymorphic
/// @polymorphicTo Location
/// @polymorphicTo Workflow
/// The owner of this note.
/// ```
pub fn parse_smart_comment(comment: &str) -> (Tags, Option<String>) {
    let mut tags = Tags::default();
    let mut lines = comment.lines().peekable();

    while let Some(line) = lines.peek() {
        let Some(tag_line) = line.strip_prefix('@') else {
            break;
        };
        let (key, value) = match tag_line.split_once(char::is_whitespace) {
            Some((key, value)) => (key, TagValue::String(value.trim().to_string())),
            None => (tag_line.trim_end(), TagValue::Bool(true)),
        };
        if !key.is_empty() {
            tags.push(key, value);
        }
        lines.next();
    }

    let description = lines.collect::<Vec<_>>().join("\n");
    let description = description.trim();

    (
        tags,
        (!description.is_empty()).then(|| description.to_string()),
    )
}
