use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Model;
use crate::schema::{attribute, AttributeKind as Kind, Deletion, Resource, Schema};

const SCHEMA: Schema = Schema {
    singular: "category",
    collection: "categories",
    attributes: &[
        attribute("id", Kind::Integer),
        attribute("url", Kind::String),
        attribute("name", Kind::String),
        attribute("description", Kind::String),
        attribute("position", Kind::Integer),
        attribute("created_at", Kind::Time),
        attribute("updated_at", Kind::Time),
    ],
    accepted: &["name", "description", "position"],
    deletion: Deletion::Remove,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Option<u64>,
    pub url: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub position: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Category {
    pub fn new(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }
}

impl Resource for Category {
    const SCHEMA: &'static Schema = &SCHEMA;

    fn id(&self) -> Option<u64> {
        self.id
    }
}

impl Model for Category {
    const REQUIRED: &'static [&'static str] = &["name"];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::testing::assert_schema_matches;

    #[test]
    fn schema_matches_struct() {
        assert_schema_matches::<Category>();
    }
}
