use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{associated, scoped, Membership, Model, Organization, Ticket};
use crate::client::Client;
use crate::error::ApiError;
use crate::schema::{attribute, AttributeKind as Kind, Deletion, Resource, Schema};
use crate::sso;

const SCHEMA: Schema = Schema {
    singular: "user",
    collection: "users",
    attributes: &[
        attribute("id", Kind::Integer),
        attribute("url", Kind::String),
        attribute("external_id", Kind::String),
        attribute("name", Kind::String),
        attribute("email", Kind::String),
        attribute("alias", Kind::String),
        attribute("active", Kind::Boolean),
        attribute("verified", Kind::Boolean),
        attribute("shared", Kind::Boolean),
        attribute("locale_id", Kind::Integer),
        attribute("time_zone", Kind::String),
        attribute("last_login_at", Kind::Time),
        attribute("phone", Kind::String),
        attribute("signature", Kind::String),
        attribute("details", Kind::String),
        attribute("notes", Kind::String),
        attribute("organization_id", Kind::Integer),
        attribute("role", Kind::String),
        attribute("moderator", Kind::Boolean),
        attribute("ticket_restriction", Kind::String),
        attribute("only_private_comments", Kind::Boolean),
        attribute("tags", Kind::Array),
        attribute("suspended", Kind::Boolean),
        attribute("user_fields", Kind::Object),
        attribute("created_at", Kind::Time),
        attribute("updated_at", Kind::Time),
    ],
    accepted: &[
        "external_id",
        "name",
        "email",
        "alias",
        "verified",
        "locale_id",
        "time_zone",
        "phone",
        "signature",
        "details",
        "notes",
        "organization_id",
        "role",
        "moderator",
        "ticket_restriction",
        "only_private_comments",
        "tags",
        "suspended",
        "user_fields",
    ],
    deletion: Deletion::Deactivate,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    EndUser,
    Agent,
    Admin,
}

/// A person with access to the help desk: end user, agent or admin.
/// Destroying a user deactivates it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Option<u64>,
    pub url: Option<String>,
    pub external_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub alias: Option<String>,
    pub active: Option<bool>,
    pub verified: Option<bool>,
    pub shared: Option<bool>,
    pub locale_id: Option<u64>,
    pub time_zone: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub phone: Option<String>,
    pub signature: Option<String>,
    pub details: Option<String>,
    pub notes: Option<String>,
    pub organization_id: Option<u64>,
    pub role: Option<Role>,
    pub moderator: Option<bool>,
    pub ticket_restriction: Option<String>,
    pub only_private_comments: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub suspended: Option<bool>,
    pub user_fields: Option<Map<String, Value>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Overrides for the sign-on URL builders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginOptions {
    /// Where Zendesk sends the browser after signing in.
    pub return_to: Option<String>,
    /// Shared secret to use instead of the session's.
    pub token: Option<String>,
}

impl LoginOptions {
    pub fn return_to(mut self, return_to: &str) -> Self {
        self.return_to = Some(return_to.to_string());
        self
    }

    pub fn token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }
}

impl User {
    pub fn new(name: &str, email: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            ..Self::default()
        }
    }

    /// Tickets this user requested.
    pub fn tickets(&self, client: &Client) -> Result<Vec<Ticket>, ApiError> {
        scoped(client, Self::SCHEMA, self.identity()?, "tickets/requested")
    }

    /// Tickets this user is copied on.
    pub fn ccd_tickets(&self, client: &Client) -> Result<Vec<Ticket>, ApiError> {
        scoped(client, Self::SCHEMA, self.identity()?, "tickets/ccd")
    }

    pub fn organizations(&self, client: &Client) -> Result<Vec<Organization>, ApiError> {
        scoped(client, Self::SCHEMA, self.identity()?, "organizations")
    }

    pub fn memberships(&self, client: &Client) -> Result<Vec<Membership>, ApiError> {
        scoped(client, Self::SCHEMA, self.identity()?, "organization_memberships")
    }

    /// The user's primary organization.
    pub fn organization(&self, client: &Client) -> Result<Option<Organization>, ApiError> {
        associated(client, self.organization_id)
    }

    /// Remote-authentication URL signed with the session token.
    ///
    /// The hash is the MD5 of `name + email + token + timestamp`, so the
    /// caller must pass the same timestamp Zendesk will verify against.
    pub fn login_url(
        &self,
        client: &Client,
        timestamp: Option<i64>,
        options: &LoginOptions,
    ) -> Result<String, ApiError> {
        let (name, email) = self.sign_on_identity()?;
        let timestamp = timestamp.ok_or(ApiError::MissingTimestamp)?;
        let token = options
            .token
            .as_deref()
            .or(client.config().token.as_deref())
            .ok_or(ApiError::MissingCredential("token"))?;
        sso::remote_login_url(
            &client.config().url,
            &sso::RemoteLogin {
                name,
                email,
                token,
                timestamp,
            },
            options.return_to.as_deref(),
        )
    }

    /// JWT sign-on URL, issued now with a fresh nonce.
    pub fn jwt_login_url(&self, client: &Client, options: &LoginOptions) -> Result<String, ApiError> {
        let (name, email) = self.sign_on_identity()?;
        let secret = options
            .token
            .as_deref()
            .or(client.config().jwt_token.as_deref())
            .ok_or(ApiError::MissingCredential("jwt_token"))?;
        let claims = sso::Claims::issue(name, email, Utc::now().timestamp());
        sso::jwt_login_url(&client.config().url, &claims, secret, options.return_to.as_deref())
    }

    fn sign_on_identity(&self) -> Result<(&str, &str), ApiError> {
        self.requires(&["name", "email"])?;
        Ok((
            self.name.as_deref().unwrap_or_default(),
            self.email.as_deref().unwrap_or_default(),
        ))
    }
}

impl Resource for User {
    const SCHEMA: &'static Schema = &SCHEMA;

    fn id(&self) -> Option<u64> {
        self.id
    }
}

impl Model for User {
    const REQUIRED: &'static [&'static str] = &["name", "email"];

    /// The session may not delete its own user.
    fn check_destroy(&self, client: &Client) -> Result<(), ApiError> {
        match &self.email {
            Some(email) if email.eq_ignore_ascii_case(&client.config().username) => {
                Err(ApiError::SelfDeletion { email: email.clone() })
            }
            _ => Ok(()),
        }
    }
}
