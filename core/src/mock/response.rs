use serde_json::{json, Value};

use super::rules::Details;
use crate::http::HttpResponse;
use crate::schema::{Record, Schema};

pub(super) fn record(status: u16, schema: &Schema, record: Record) -> HttpResponse {
    let mut body = Record::new();
    body.insert(schema.singular.to_string(), Value::Object(record));
    HttpResponse::json(status, &Value::Object(body))
}

/// List envelope. Everything fits on one page.
pub(super) fn collection(schema: &Schema, records: Vec<Record>) -> HttpResponse {
    let count = records.len();
    let mut body = Record::new();
    body.insert(schema.collection.to_string(), Value::Array(records.into_iter().map(Value::Object).collect()));
    body.insert("count".to_string(), json!(count));
    body.insert("next_page".to_string(), Value::Null);
    body.insert("previous_page".to_string(), Value::Null);
    HttpResponse::json(200, &Value::Object(body))
}

pub(super) fn no_content() -> HttpResponse {
    HttpResponse::empty(204)
}

pub(super) fn not_found() -> HttpResponse {
    HttpResponse::json(404, &json!({"error": "RecordNotFound", "description": "Not found"}))
}

pub(super) fn invalid_endpoint(path: &str) -> HttpResponse {
    HttpResponse::json(
        404,
        &json!({"error": "InvalidEndpoint", "description": format!("Not found: {path}")}),
    )
}

pub(super) fn invalid(details: Details) -> HttpResponse {
    HttpResponse::json(
        422,
        &json!({
            "error": "RecordInvalid",
            "description": "Record validation errors",
            "details": details,
        }),
    )
}

pub(super) fn bad_request(description: &str) -> HttpResponse {
    HttpResponse::json(400, &json!({"error": "BadRequest", "description": description}))
}
