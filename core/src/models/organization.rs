use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{scoped, Membership, Model, Ticket, User};
use crate::client::Client;
use crate::error::ApiError;
use crate::schema::{attribute, AttributeKind as Kind, Deletion, Resource, Schema};

const SCHEMA: Schema = Schema {
    singular: "organization",
    collection: "organizations",
    attributes: &[
        attribute("id", Kind::Integer),
        attribute("url", Kind::String),
        attribute("external_id", Kind::String),
        attribute("name", Kind::String),
        attribute("details", Kind::String),
        attribute("notes", Kind::String),
        attribute("domain_names", Kind::Array),
        attribute("group_id", Kind::Integer),
        attribute("shared_tickets", Kind::Boolean),
        attribute("shared_comments", Kind::Boolean),
        attribute("tags", Kind::Array),
        attribute("organization_fields", Kind::Object),
        attribute("created_at", Kind::Time),
        attribute("updated_at", Kind::Time),
    ],
    accepted: &[
        "external_id",
        "name",
        "details",
        "notes",
        "domain_names",
        "group_id",
        "shared_tickets",
        "shared_comments",
        "tags",
        "organization_fields",
    ],
    deletion: Deletion::Remove,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: Option<u64>,
    pub url: Option<String>,
    pub external_id: Option<String>,
    pub name: Option<String>,
    pub details: Option<String>,
    pub notes: Option<String>,
    pub domain_names: Option<Vec<String>>,
    pub group_id: Option<u64>,
    pub shared_tickets: Option<bool>,
    pub shared_comments: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub organization_fields: Option<Map<String, Value>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Organization {
    pub fn new(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    /// Members, through memberships or a primary `organization_id`.
    pub fn users(&self, client: &Client) -> Result<Vec<User>, ApiError> {
        scoped(client, Self::SCHEMA, self.identity()?, "users")
    }

    pub fn tickets(&self, client: &Client) -> Result<Vec<Ticket>, ApiError> {
        scoped(client, Self::SCHEMA, self.identity()?, "tickets")
    }

    pub fn memberships(&self, client: &Client) -> Result<Vec<Membership>, ApiError> {
        scoped(client, Self::SCHEMA, self.identity()?, "organization_memberships")
    }
}

impl Resource for Organization {
    const SCHEMA: &'static Schema = &SCHEMA;

    fn id(&self) -> Option<u64> {
        self.id
    }
}

impl Model for Organization {
    const REQUIRED: &'static [&'static str] = &["name"];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::testing::assert_schema_matches;

    #[test]
    fn schema_matches_struct() {
        assert_schema_matches::<Organization>();
    }

    #[test]
    fn save_requires_name() {
        let client = Client::mock(crate::config::Config::new("https://acme.zendesk.com", "a@acme.com"));
        let err = Organization::default().save(&client).unwrap_err();
        assert!(matches!(
            err,
            ApiError::MissingAttributes { resource: "organization", .. }
        ));
    }
}
