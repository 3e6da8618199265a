use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Model;
use crate::schema::{attribute, AttributeKind as Kind, Deletion, Resource, Schema};

const SCHEMA: Schema = Schema {
    singular: "group",
    collection: "groups",
    attributes: &[
        attribute("id", Kind::Integer),
        attribute("url", Kind::String),
        attribute("name", Kind::String),
        attribute("deleted", Kind::Boolean),
        attribute("created_at", Kind::Time),
        attribute("updated_at", Kind::Time),
    ],
    accepted: &["name"],
    deletion: Deletion::Remove,
};

/// A set of agents tickets can be assigned to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: Option<u64>,
    pub url: Option<String>,
    pub name: Option<String>,
    pub deleted: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Group {
    pub fn new(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }
}

impl Resource for Group {
    const SCHEMA: &'static Schema = &SCHEMA;

    fn id(&self) -> Option<u64> {
        self.id
    }
}

impl Model for Group {
    const REQUIRED: &'static [&'static str] = &["name"];
}
