use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{associated, Group, Model, Organization, User};
use crate::client::Client;
use crate::error::ApiError;
use crate::schema::{attribute, AttributeKind as Kind, Deletion, Resource, Schema};

const SCHEMA: Schema = Schema {
    singular: "ticket",
    collection: "tickets",
    attributes: &[
        attribute("id", Kind::Integer),
        attribute("url", Kind::String),
        attribute("external_id", Kind::String),
        attribute("type", Kind::String),
        attribute("subject", Kind::String),
        attribute("description", Kind::String),
        attribute("priority", Kind::String),
        attribute("status", Kind::String),
        attribute("recipient", Kind::String),
        attribute("requester_id", Kind::Integer),
        attribute("submitter_id", Kind::Integer),
        attribute("assignee_id", Kind::Integer),
        attribute("organization_id", Kind::Integer),
        attribute("group_id", Kind::Integer),
        attribute("collaborator_ids", Kind::Array),
        attribute("tags", Kind::Array),
        attribute("has_incidents", Kind::Boolean),
        attribute("due_at", Kind::Time),
        attribute("custom_fields", Kind::Array),
        attribute("created_at", Kind::Time),
        attribute("updated_at", Kind::Time),
    ],
    accepted: &[
        "external_id",
        "type",
        "subject",
        "description",
        "priority",
        "status",
        "recipient",
        "requester_id",
        "submitter_id",
        "assignee_id",
        "organization_id",
        "group_id",
        "collaborator_ids",
        "tags",
        "due_at",
        "custom_fields",
    ],
    deletion: Deletion::Remove,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    New,
    Open,
    Pending,
    Hold,
    Solved,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketPriority {
    Low,
    Normal,
    High,
    Urgent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketType {
    Problem,
    Incident,
    Question,
    Task,
}

/// Value of an account-defined ticket field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomField {
    pub id: u64,
    pub value: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Option<u64>,
    pub url: Option<String>,
    pub external_id: Option<String>,
    #[serde(rename = "type")]
    pub ticket_type: Option<TicketType>,
    pub subject: Option<String>,
    /// Body of the first comment. Required on create.
    pub description: Option<String>,
    pub priority: Option<TicketPriority>,
    pub status: Option<TicketStatus>,
    pub recipient: Option<String>,
    pub requester_id: Option<u64>,
    pub submitter_id: Option<u64>,
    pub assignee_id: Option<u64>,
    pub organization_id: Option<u64>,
    pub group_id: Option<u64>,
    pub collaborator_ids: Option<Vec<u64>>,
    pub tags: Option<Vec<String>>,
    pub has_incidents: Option<bool>,
    pub due_at: Option<DateTime<Utc>>,
    pub custom_fields: Option<Vec<CustomField>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Ticket {
    pub fn new(subject: &str, description: &str) -> Self {
        Self {
            subject: Some(subject.to_string()),
            description: Some(description.to_string()),
            ..Self::default()
        }
    }

    pub fn requester(&self, client: &Client) -> Result<Option<User>, ApiError> {
        associated(client, self.requester_id)
    }

    pub fn submitter(&self, client: &Client) -> Result<Option<User>, ApiError> {
        associated(client, self.submitter_id)
    }

    pub fn assignee(&self, client: &Client) -> Result<Option<User>, ApiError> {
        associated(client, self.assignee_id)
    }

    pub fn organization(&self, client: &Client) -> Result<Option<Organization>, ApiError> {
        associated(client, self.organization_id)
    }

    pub fn group(&self, client: &Client) -> Result<Option<Group>, ApiError> {
        associated(client, self.group_id)
    }
}

impl Resource for Ticket {
    const SCHEMA: &'static Schema = &SCHEMA;

    fn id(&self) -> Option<u64> {
        self.id
    }
}

impl Model for Ticket {
    const REQUIRED: &'static [&'static str] = &["description"];
}
