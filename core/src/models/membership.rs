use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{associated, Model, Organization, User};
use crate::client::Client;
use crate::error::ApiError;
use crate::schema::{attribute, AttributeKind as Kind, Deletion, Resource, Schema};

const SCHEMA: Schema = Schema {
    singular: "organization_membership",
    collection: "organization_memberships",
    attributes: &[
        attribute("id", Kind::Integer),
        attribute("url", Kind::String),
        attribute("user_id", Kind::Integer),
        attribute("organization_id", Kind::Integer),
        attribute("default", Kind::Boolean),
        attribute("created_at", Kind::Time),
        attribute("updated_at", Kind::Time),
    ],
    accepted: &["user_id", "organization_id", "default"],
    deletion: Deletion::Remove,
};

/// Links a user to an organization. A user's first membership is its
/// default one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    pub id: Option<u64>,
    pub url: Option<String>,
    pub user_id: Option<u64>,
    pub organization_id: Option<u64>,
    pub default: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Membership {
    pub fn new(user_id: u64, organization_id: u64) -> Self {
        Self {
            user_id: Some(user_id),
            organization_id: Some(organization_id),
            ..Self::default()
        }
    }

    pub fn user(&self, client: &Client) -> Result<Option<User>, ApiError> {
        associated(client, self.user_id)
    }

    pub fn organization(&self, client: &Client) -> Result<Option<Organization>, ApiError> {
        associated(client, self.organization_id)
    }
}

impl Resource for Membership {
    const SCHEMA: &'static Schema = &SCHEMA;

    fn id(&self) -> Option<u64> {
        self.id
    }
}

impl Model for Membership {
    const REQUIRED: &'static [&'static str] = &["user_id", "organization_id"];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::testing::assert_schema_matches;

    #[test]
    fn schema_matches_struct() {
        assert_schema_matches::<Membership>();
    }
}
