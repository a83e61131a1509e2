//! The Thing entity.

use serde::{Deserialize, Serialize};

/// A Thing as stored by the backend and edited by the form.
///
/// `id == 0` marks a Thing that has not been persisted yet; the store assigns
/// a positive id on insert. Both `id` and `description` may be omitted on the
/// wire.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thing {
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Thing {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            description: description.into(),
        }
    }

    pub fn with_id(mut self, id: i32) -> Self {
        self.id = id;
        self
    }

    pub fn is_persisted(&self) -> bool {
        is_persisted(self)
    }

    /// True when `other` is a different Thing carrying the same name,
    /// compared case-insensitively.
    pub fn collides_with(&self, other: &Thing) -> bool {
        self.id != other.id && names_match(&self.name, &other.name)
    }
}

pub fn is_persisted(thing: &Thing) -> bool {
    thing.id > 0
}

pub fn names_match(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}
