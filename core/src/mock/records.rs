use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use tracing::warn;

use super::{response, rules, MockStore};
use crate::config::API_PREFIX;
use crate::http::HttpResponse;
use crate::models::User;
use crate::schema::{Deletion, Record, Resource, Schema};

/// Server clock in the API's timestamp format.
pub(super) fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(super) fn index(store: &MockStore, schema: &Schema) -> HttpResponse {
    response::collection(schema, store.records(schema).cloned().collect())
}

pub(super) fn show(store: &MockStore, schema: &Schema, id: u64) -> HttpResponse {
    match store.get(schema, id) {
        Some(record) => response::record(200, schema, record.clone()),
        None => response::not_found(),
    }
}

pub(super) fn create(store: &mut MockStore, schema: &'static Schema, origin: &str, params: Record) -> HttpResponse {
    let attributes = schema.coerce(schema.accept(&params));
    if let Err(details) = rules::validate(store, schema, None, &attributes) {
        warn!(collection = schema.collection, ?details, "mock create rejected");
        return response::invalid(details);
    }
    let record = insert_new(store, schema, origin, attributes);
    response::record(201, schema, record)
}

/// Store a new record built from defaults, `attributes` and the generated
/// fields, in that order of precedence.
pub(super) fn insert_new(store: &mut MockStore, schema: &'static Schema, origin: &str, attributes: Record) -> Record {
    let mut record = rules::defaults(store, schema, origin, &attributes);
    record.extend(attributes);

    let id = store.next_id();
    let timestamp = now();
    record.insert(Schema::IDENTITY.to_string(), json!(id));
    record.insert(
        "url".to_string(),
        json!(format!("{origin}{API_PREFIX}/{}/{id}.json", schema.collection)),
    );
    record.insert("created_at".to_string(), json!(timestamp));
    record.insert("updated_at".to_string(), json!(timestamp));

    rules::after_create(store, schema, &mut record);
    store.insert(schema, id, record.clone());
    record
}

pub(super) fn update(store: &mut MockStore, schema: &Schema, id: u64, params: Record) -> HttpResponse {
    if store.get(schema, id).is_none() {
        return response::not_found();
    }
    let attributes = schema.coerce(schema.accept(&params));
    if let Err(details) = rules::validate(store, schema, Some(id), &attributes) {
        warn!(collection = schema.collection, id, ?details, "mock update rejected");
        return response::invalid(details);
    }
    let Some(record) = store.get_mut(schema, id) else {
        return response::not_found();
    };
    record.extend(attributes);
    record.insert("updated_at".to_string(), json!(now()));
    let record = record.clone();
    response::record(200, schema, record)
}

pub(super) fn destroy(store: &mut MockStore, schema: &Schema, id: u64) -> HttpResponse {
    match schema.deletion {
        Deletion::Deactivate => {
            let Some(record) = store.get_mut(schema, id) else {
                return response::not_found();
            };
            record.insert("active".to_string(), Value::Bool(false));
            record.insert("updated_at".to_string(), json!(now()));
            let record = record.clone();
            response::record(200, schema, record)
        }
        Deletion::Remove => match store.remove(schema, id) {
            Some(removed) => {
                rules::after_destroy(store, schema, &removed);
                response::no_content()
            }
            None => response::not_found(),
        },
    }
}

/// The session user, created as an admin on first access.
pub(super) fn current_user(store: &mut MockStore, origin: &str) -> Record {
    let username = store.username().to_string();
    let existing = store.records(User::SCHEMA).find(|user| {
        user.get("email")
            .and_then(Value::as_str)
            .is_some_and(|email| email.eq_ignore_ascii_case(&username))
    });
    if let Some(user) = existing {
        return user.clone();
    }

    let name = username.split('@').next().unwrap_or(&username).to_string();
    let attributes = json!({
        "name": name,
        "email": username,
        "role": "admin",
        "verified": true,
    });
    let attributes = attributes.as_object().cloned().unwrap_or_default();
    insert_new(store, User::SCHEMA, origin, attributes)
}
