//! Per-resource behavior of the mock: defaults, validation and side effects.

use serde_json::{json, Map, Value};

use super::{records, MockStore};
use crate::models::{Membership, Organization, Ticket, User};
use crate::schema::{Record, Resource, Schema};

const ROLES: &[&str] = &["end-user", "agent", "admin"];
const TICKET_STATUSES: &[&str] = &["new", "open", "pending", "hold", "solved", "closed"];
const TICKET_PRIORITIES: &[&str] = &["low", "normal", "high", "urgent"];
const TICKET_TYPES: &[&str] = &["problem", "incident", "question", "task"];

/// Validation failures keyed by attribute, shaped like the API's `details`.
pub(super) type Details = Map<String, Value>;

#[derive(Default)]
struct Errors(Details);

impl Errors {
    fn add(&mut self, attribute: &str, description: String) {
        let entry = self
            .0
            .entry(attribute.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(list) = entry {
            list.push(json!({ "description": description }));
        }
    }

    /// On create the attribute must be present and non-blank; on update it
    /// may be absent but not blank.
    fn required(&mut self, attributes: &Record, attribute: &str, label: &str, creating: bool) {
        let blank = match attributes.get(attribute) {
            None => creating,
            Some(Value::Null) => true,
            Some(Value::String(text)) => text.trim().is_empty(),
            Some(_) => false,
        };
        if blank {
            self.add(attribute, format!("{label}: cannot be blank"));
        }
    }

    fn one_of(&mut self, attributes: &Record, attribute: &str, label: &str, allowed: &[&str]) {
        let Some(value) = attributes.get(attribute) else {
            return;
        };
        if value.is_null() {
            return;
        }
        if !value.as_str().is_some_and(|text| allowed.contains(&text)) {
            self.add(attribute, format!("{label}: {value} is not a valid value"));
        }
    }

    fn into_result(self) -> Result<(), Details> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self.0)
        }
    }
}

pub(super) fn field_u64(record: &Record, key: &str) -> Option<u64> {
    record.get(key).and_then(Value::as_u64)
}

fn references(store: &MockStore, schema: &Schema, attributes: &Record, key: &str) -> bool {
    match field_u64(attributes, key) {
        Some(id) => store.get(schema, id).is_some(),
        None => attributes.get(key).map_or(true, Value::is_null),
    }
}

/// Check `attributes` for a create (`id` is `None`) or an update of `id`.
pub(super) fn validate(
    store: &MockStore,
    schema: &Schema,
    id: Option<u64>,
    attributes: &Record,
) -> Result<(), Details> {
    let creating = id.is_none();
    let mut errors = Errors::default();

    match schema.collection {
        "users" => {
            errors.required(attributes, "name", "Name", creating);
            errors.one_of(attributes, "role", "Role", ROLES);
            if let Some(email) = attributes.get("email").and_then(Value::as_str) {
                let taken = store.records(schema).any(|user| {
                    field_u64(user, Schema::IDENTITY) != id
                        && user
                            .get("email")
                            .and_then(Value::as_str)
                            .is_some_and(|other| other.eq_ignore_ascii_case(email))
                });
                if taken {
                    errors.add("email", format!("Email: {email} is already being used by another user"));
                }
            }
        }
        "organizations" => {
            errors.required(attributes, "name", "Name", creating);
            if let Some(name) = attributes.get("name").and_then(Value::as_str) {
                let taken = store.records(schema).any(|organization| {
                    field_u64(organization, Schema::IDENTITY) != id
                        && organization.get("name").and_then(Value::as_str) == Some(name)
                });
                if taken {
                    errors.add("name", "Name: has already been taken".to_string());
                }
            }
        }
        "organization_memberships" => {
            if let Some(stored) = id.and_then(|id| store.get(schema, id)) {
                // A membership is only ever re-pointed by deleting it.
                for (key, label) in [("user_id", "User"), ("organization_id", "Organization")] {
                    if attributes.contains_key(key) && field_u64(attributes, key) != field_u64(stored, key) {
                        errors.add(key, format!("{label}: cannot be changed"));
                    }
                }
            }
            if creating {
                errors.required(attributes, "user_id", "User", true);
                errors.required(attributes, "organization_id", "Organization", true);
                if !references(store, User::SCHEMA, attributes, "user_id") {
                    errors.add("user_id", "User: is invalid".to_string());
                }
                if !references(store, Organization::SCHEMA, attributes, "organization_id") {
                    errors.add("organization_id", "Organization: is invalid".to_string());
                }
                let user_id = field_u64(attributes, "user_id");
                let organization_id = field_u64(attributes, "organization_id");
                let duplicate = store.records(schema).any(|membership| {
                    field_u64(membership, "user_id") == user_id
                        && field_u64(membership, "organization_id") == organization_id
                });
                if duplicate && user_id.is_some() {
                    errors.add("user_id", "User: has already been taken".to_string());
                }
            }
        }
        "tickets" => {
            if creating {
                errors.required(attributes, "description", "Description", true);
            }
            let people = [
                ("requester_id", "Requester"),
                ("assignee_id", "Assignee"),
                ("submitter_id", "Submitter"),
            ];
            for (key, label) in people {
                if !references(store, User::SCHEMA, attributes, key) {
                    errors.add(key, format!("{label}: is invalid"));
                }
            }
            if !references(store, Organization::SCHEMA, attributes, "organization_id") {
                errors.add("organization_id", "Organization: is invalid".to_string());
            }
            errors.one_of(attributes, "status", "Status", TICKET_STATUSES);
            errors.one_of(attributes, "priority", "Priority", TICKET_PRIORITIES);
            errors.one_of(attributes, "type", "Type", TICKET_TYPES);
        }
        "categories" | "groups" => {
            errors.required(attributes, "name", "Name", creating);
        }
        _ => {}
    }

    errors.into_result()
}

/// Attributes a new record starts with before caller input is applied.
pub(super) fn defaults(store: &mut MockStore, schema: &Schema, origin: &str, attributes: &Record) -> Record {
    let defaults = match schema.collection {
        "users" => json!({
            "active": true,
            "verified": false,
            "role": "end-user",
            "suspended": false,
            "tags": [],
        }),
        "organizations" => json!({
            "shared_tickets": false,
            "shared_comments": false,
            "domain_names": [],
            "tags": [],
        }),
        "organization_memberships" => {
            let user_id = field_u64(attributes, "user_id");
            let first = !store
                .records(schema)
                .any(|membership| field_u64(membership, "user_id") == user_id);
            json!({ "default": first })
        }
        "tickets" => {
            let submitter_id = match field_u64(attributes, "submitter_id") {
                Some(id) => Some(id),
                None => field_u64(&records::current_user(store, origin), Schema::IDENTITY),
            };
            let requester_id = field_u64(attributes, "requester_id").or(submitter_id);
            let organization_id = requester_id
                .and_then(|id| store.get(User::SCHEMA, id))
                .and_then(|requester| requester.get("organization_id").cloned())
                .unwrap_or(Value::Null);
            json!({
                "status": "new",
                "priority": null,
                "type": null,
                "submitter_id": submitter_id,
                "requester_id": requester_id,
                "organization_id": organization_id,
                "collaborator_ids": [],
                "tags": [],
                "has_incidents": false,
            })
        }
        "categories" => json!({ "position": 0 }),
        "groups" => json!({ "deleted": false }),
        _ => json!({}),
    };
    match defaults {
        Value::Object(record) => record,
        _ => Record::new(),
    }
}

/// Effects of a create on other records.
pub(super) fn after_create(store: &mut MockStore, schema: &Schema, record: &mut Record) {
    if schema.collection != Membership::SCHEMA.collection {
        return;
    }
    if record.get("default") != Some(&Value::Bool(true)) {
        return;
    }
    let (Some(user_id), Some(organization_id)) = (field_u64(record, "user_id"), field_u64(record, "organization_id"))
    else {
        return;
    };
    if let Some(user) = store.get_mut(User::SCHEMA, user_id) {
        if user.get("organization_id").map_or(true, Value::is_null) {
            user.insert("organization_id".to_string(), json!(organization_id));
        }
    }
}

/// Effects of a hard removal of `removed` on other records.
pub(super) fn after_destroy(store: &mut MockStore, schema: &Schema, removed: &Record) {
    match schema.collection {
        "organizations" => {
            let Some(organization_id) = field_u64(removed, Schema::IDENTITY) else {
                return;
            };
            let memberships: Vec<u64> = store
                .records(Membership::SCHEMA)
                .filter(|membership| field_u64(membership, "organization_id") == Some(organization_id))
                .filter_map(|membership| field_u64(membership, Schema::IDENTITY))
                .collect();
            for membership in memberships {
                store.remove(Membership::SCHEMA, membership);
            }
            let members: Vec<u64> = store
                .records(User::SCHEMA)
                .filter(|user| field_u64(user, "organization_id") == Some(organization_id))
                .filter_map(|user| field_u64(user, Schema::IDENTITY))
                .collect();
            for user_id in members {
                clear_organization(store, user_id);
            }
            let tickets: Vec<u64> = store
                .records(Ticket::SCHEMA)
                .filter(|ticket| field_u64(ticket, "organization_id") == Some(organization_id))
                .filter_map(|ticket| field_u64(ticket, Schema::IDENTITY))
                .collect();
            for ticket_id in tickets {
                if let Some(ticket) = store.get_mut(Ticket::SCHEMA, ticket_id) {
                    ticket.insert("organization_id".to_string(), Value::Null);
                }
            }
        }
        "organization_memberships" => {
            let (Some(user_id), Some(organization_id)) =
                (field_u64(removed, "user_id"), field_u64(removed, "organization_id"))
            else {
                return;
            };
            let points_at_removed = store
                .get(User::SCHEMA, user_id)
                .is_some_and(|user| field_u64(user, "organization_id") == Some(organization_id));
            if points_at_removed {
                clear_organization(store, user_id);
            }
        }
        _ => {}
    }
}

fn clear_organization(store: &mut MockStore, user_id: u64) {
    if let Some(user) = store.get_mut(User::SCHEMA, user_id) {
        user.insert("organization_id".to_string(), Value::Null);
    }
}
