//! Request descriptors and response parsing.
//!
//! # Design
//! A `Request` is an immutable description of one API operation: method,
//! path below the API root, query pairs and an optional JSON body already
//! filtered through the resource whitelist. `to_http` renders it against a
//! `Config`; the `parse_*` functions turn the `HttpResponse` back into
//! records. Neither side performs I/O, so the same code serves the live
//! transport and the mock.

use serde_json::Value;
use url::Url;

use crate::config::Config;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::schema::{Deletion, Record, Schema};

/// One API operation described as data.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: HttpMethod,
    /// Path below the API root, e.g. `/users/7.json`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Statuses that count as success for this operation.
    pub expected: &'static [u16],
}

impl Request {
    fn new(method: HttpMethod, path: String, expected: &'static [u16]) -> Self {
        Self {
            method,
            path,
            query: Vec::new(),
            body: None,
            expected,
        }
    }

    pub fn index(schema: &Schema) -> Self {
        Self::new(HttpMethod::Get, format!("/{}.json", schema.collection), &[200])
    }

    pub fn show(schema: &Schema, id: u64) -> Self {
        Self::new(HttpMethod::Get, format!("/{}/{id}.json", schema.collection), &[200])
    }

    /// POST `{"<singular>": params}` with non-whitelisted keys removed.
    pub fn create(schema: &Schema, params: &Record) -> Self {
        let mut request = Self::new(HttpMethod::Post, format!("/{}.json", schema.collection), &[201]);
        request.body = Some(envelope(schema, params));
        request
    }

    pub fn update(schema: &Schema, id: u64, params: &Record) -> Self {
        let mut request = Self::new(HttpMethod::Put, format!("/{}/{id}.json", schema.collection), &[200]);
        request.body = Some(envelope(schema, params));
        request
    }

    pub fn destroy(schema: &Schema, id: u64) -> Self {
        let expected: &'static [u16] = match schema.deletion {
            Deletion::Deactivate => &[200],
            Deletion::Remove => &[200, 204],
        };
        Self::new(HttpMethod::Delete, format!("/{}/{id}.json", schema.collection), expected)
    }

    /// GET a listing nested under one parent record, e.g.
    /// `/users/7/tickets/requested.json`.
    pub fn scoped(parent: &Schema, id: u64, tail: &str) -> Self {
        Self::new(
            HttpMethod::Get,
            format!("/{}/{id}/{}.json", parent.collection, tail.trim_matches('/')),
            &[200],
        )
    }

    /// The user the session is authenticated as.
    pub fn current_user() -> Self {
        Self::new(HttpMethod::Get, "/users/me.json".to_string(), &[200])
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Render against the session: absolute URL, JSON headers and the Basic
    /// credential when one is configured.
    pub fn to_http(&self, config: &Config) -> Result<HttpRequest, ApiError> {
        let mut url = Url::parse(&format!("{}{}", config.api_root(), self.path))?;
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }

        let mut headers = vec![("accept".to_string(), "application/json".to_string())];
        if let Some(authorization) = config.authorization() {
            headers.push(("authorization".to_string(), authorization));
        }
        let body = match &self.body {
            Some(body) => {
                headers.push(("content-type".to_string(), "application/json".to_string()));
                Some(serde_json::to_string(body).map_err(|e| ApiError::SerializationError(e.to_string()))?)
            }
            None => None,
        };

        Ok(HttpRequest {
            method: self.method,
            url: url.to_string(),
            headers,
            body,
        })
    }
}

fn envelope(schema: &Schema, params: &Record) -> Value {
    let mut body = Record::new();
    body.insert(schema.singular.to_string(), Value::Object(schema.accept(params)));
    Value::Object(body)
}

/// Map a status outside `expected` to the appropriate `ApiError` variant.
pub fn check_status(response: &HttpResponse, expected: &[u16]) -> Result<(), ApiError> {
    if expected.contains(&response.status) {
        return Ok(());
    }
    match response.status {
        404 => Err(ApiError::NotFound),
        422 => Err(ApiError::Invalid {
            body: response.body.clone(),
        }),
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}

/// Unwrap `{"<singular>": {...}}`. An empty body (204) yields `None`.
pub fn parse_record(
    response: HttpResponse,
    schema: &Schema,
    expected: &[u16],
) -> Result<Option<Record>, ApiError> {
    check_status(&response, expected)?;
    if response.body.trim().is_empty() {
        return Ok(None);
    }
    let mut body = parse_object(&response.body)?;
    match body.remove(schema.singular) {
        Some(Value::Object(record)) => Ok(Some(record)),
        _ => Err(ApiError::DeserializationError(format!(
            "response has no `{}` object",
            schema.singular
        ))),
    }
}

/// Unwrap `{"<key>": [...]}`.
pub fn parse_collection(response: HttpResponse, key: &str, expected: &[u16]) -> Result<Vec<Record>, ApiError> {
    check_status(&response, expected)?;
    let mut body = parse_object(&response.body)?;
    let Some(Value::Array(items)) = body.remove(key) else {
        return Err(ApiError::DeserializationError(format!("response has no `{key}` array")));
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::Object(record) => Ok(record),
            other => Err(ApiError::DeserializationError(format!("`{key}` item is not an object: {other}"))),
        })
        .collect()
}

fn parse_object(body: &str) -> Result<Record, ApiError> {
    match serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))? {
        Value::Object(object) => Ok(object),
        other => Err(ApiError::DeserializationError(format!("expected an object, got {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::models::{Ticket, User};
    use crate::schema::Resource;

    fn config() -> Config {
        Config::new("https://acme.zendesk.com", "agent@acme.com")
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    fn params(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn index_produces_correct_request() {
        let req = Request::index(User::SCHEMA).to_http(&config()).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "https://acme.zendesk.com/api/v2/users.json");
        assert!(req.body.is_none());
        assert_eq!(req.header("accept"), Some("application/json"));
        assert!(req.header("authorization").is_none());
    }

    #[test]
    fn create_filters_body_to_whitelist() {
        let request = Request::create(
            User::SCHEMA,
            &params(json!({"name": "Ann", "email": "ann@x.com", "id": 4, "favorite_color": "red"})),
        );
        assert_eq!(request.expected, &[201]);
        let req = request.to_http(&config()).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.header("content-type"), Some("application/json"));
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"user": {"name": "Ann", "email": "ann@x.com"}}));
    }

    #[test]
    fn update_and_destroy_carry_the_id() {
        let update = Request::update(Ticket::SCHEMA, 12, &params(json!({"subject": "s"})));
        assert_eq!(update.method, HttpMethod::Put);
        assert_eq!(update.path, "/tickets/12.json");

        let destroy = Request::destroy(Ticket::SCHEMA, 12);
        assert_eq!(destroy.method, HttpMethod::Delete);
        assert_eq!(destroy.expected, &[200, 204]);
        assert_eq!(Request::destroy(User::SCHEMA, 1).expected, &[200]);
    }

    #[test]
    fn scoped_and_query_render_into_url() {
        let req = Request::scoped(User::SCHEMA, 7, "/tickets/requested/")
            .with_query("sort_order", "desc")
            .to_http(&config().with_token("t"))
            .unwrap();
        assert_eq!(
            req.url,
            "https://acme.zendesk.com/api/v2/users/7/tickets/requested.json?sort_order=desc"
        );
        assert!(req.header("Authorization").unwrap().starts_with("Basic "));
    }

    #[test]
    fn parse_record_unwraps_envelope() {
        let record = parse_record(
            response(201, r#"{"user":{"id":1,"name":"Ann"}}"#),
            User::SCHEMA,
            &[201],
        )
        .unwrap()
        .unwrap();
        assert_eq!(record["id"], 1);
    }

    #[test]
    fn parse_record_empty_body_is_none() {
        let record = parse_record(response(204, ""), Ticket::SCHEMA, &[200, 204]).unwrap();
        assert!(record.is_none());
    }

    #[test]
    fn parse_record_missing_envelope() {
        let err = parse_record(response(200, r#"{"ticket":{}}"#), User::SCHEMA, &[200]).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(
            check_status(&response(404, ""), &[200]).unwrap_err(),
            ApiError::NotFound
        ));
        assert!(matches!(
            check_status(&response(422, "{}"), &[201]).unwrap_err(),
            ApiError::Invalid { .. }
        ));
        assert!(matches!(
            check_status(&response(500, "boom"), &[200]).unwrap_err(),
            ApiError::HttpError { status: 500, .. }
        ));
    }

    #[test]
    fn parse_collection_bad_json() {
        let err = parse_collection(response(200, "not json"), "users", &[200]).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn parse_collection_returns_items() {
        let records = parse_collection(
            response(200, r#"{"users":[{"id":1},{"id":2}],"count":2}"#),
            "users",
            &[200],
        )
        .unwrap();
        assert_eq!(records.len(), 2);
    }
}
