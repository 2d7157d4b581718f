//! Post records as held by every store backend.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque post identifier in its canonical string form.
///
/// Each backend decides what a valid identifier looks like (a decimal counter,
/// a serial primary key, a document object id) and parses the string itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for PostId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<i64> for PostId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

/// The mutable content of a post. Empty strings are valid for every field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostFields {
    pub title: String,
    pub date: String,
    pub link: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: PostId,
    #[serde(flatten)]
    pub fields: PostFields,
}

impl PostRecord {
    pub fn new(id: PostId, fields: PostFields) -> Self {
        Self { id, fields }
    }

    pub fn title(&self) -> &str {
        &self.fields.title
    }
}

/// Input to `PostStore::add`. A supplied `id` is advisory; backends with
/// authoritative identifier generation ignore it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPost {
    pub id: Option<PostId>,
    pub fields: PostFields,
}

impl NewPost {
    pub fn new(fields: PostFields) -> Self {
        Self { id: None, fields }
    }

    pub fn with_id(id: PostId, fields: PostFields) -> Self {
        Self {
            id: Some(id),
            fields,
        }
    }
}
