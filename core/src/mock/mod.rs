//! In-memory stand-in for the Zendesk API.
//!
//! # Design
//! `MockStore` keeps one table per collection and a single id sequence shared
//! by all of them, so ids are unique across resource types the way they are
//! on a real account. `dispatch` takes the same `HttpRequest` the live
//! transport would send and answers with the envelopes and status codes of
//! the real API. The store is an explicit value; callers that share it wrap
//! it in `SharedStore`.

mod records;
mod relations;
mod response;
mod rules;

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::API_PREFIX;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::models::{self, User};
use crate::schema::{Record, Resource, Schema};

/// A store shared between transports and the mock HTTP server.
pub type SharedStore = Arc<Mutex<MockStore>>;

#[derive(Debug, Default)]
pub struct MockStore {
    serial: u64,
    tables: HashMap<&'static str, BTreeMap<u64, Record>>,
    username: String,
}

impl MockStore {
    /// An empty store. `username` is the email of the acting session user.
    pub fn new(username: &str) -> Self {
        Self {
            serial: 0,
            tables: HashMap::new(),
            username: username.to_string(),
        }
    }

    pub fn shared(username: &str) -> SharedStore {
        Arc::new(Mutex::new(Self::new(username)))
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Next value of the store-wide identity sequence.
    pub fn next_id(&mut self) -> u64 {
        self.serial += 1;
        self.serial
    }

    pub fn get(&self, schema: &Schema, id: u64) -> Option<&Record> {
        self.tables.get(schema.collection)?.get(&id)
    }

    pub fn get_mut(&mut self, schema: &Schema, id: u64) -> Option<&mut Record> {
        self.tables.get_mut(schema.collection)?.get_mut(&id)
    }

    /// Records of one collection in id order.
    pub fn records<'a>(&'a self, schema: &Schema) -> impl Iterator<Item = &'a Record> + 'a {
        self.tables
            .get(schema.collection)
            .into_iter()
            .flat_map(|table| table.values())
    }

    pub fn len(&self, schema: &Schema) -> usize {
        self.tables.get(schema.collection).map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self, schema: &Schema) -> bool {
        self.len(schema) == 0
    }

    pub fn insert(&mut self, schema: &'static Schema, id: u64, record: Record) {
        self.tables.entry(schema.collection).or_default().insert(id, record);
    }

    pub fn remove(&mut self, schema: &Schema, id: u64) -> Option<Record> {
        self.tables.get_mut(schema.collection)?.remove(&id)
    }

    /// Drop every record and restart the identity sequence.
    pub fn reset(&mut self) {
        self.serial = 0;
        self.tables.clear();
    }

    /// Answer `request` the way the real API would.
    pub fn dispatch(&mut self, request: &HttpRequest) -> HttpResponse {
        let url = match Url::parse(&request.url) {
            Ok(url) => url,
            Err(e) => return response::bad_request(&e.to_string()),
        };
        let origin = url.origin().ascii_serialization();
        let Some(path) = url.path().strip_prefix(API_PREFIX) else {
            return response::invalid_endpoint(url.path());
        };
        let path = path.trim_matches('/');
        let segments: Vec<&str> = path
            .strip_suffix(".json")
            .unwrap_or(path)
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();
        debug!(method = %request.method, path, "mock dispatch");

        let body = request.body.as_deref();
        match (request.method, segments.as_slice()) {
            (HttpMethod::Get, ["users", "me"]) => {
                let user = records::current_user(self, &origin);
                response::record(200, User::SCHEMA, user)
            }
            (method, [collection, rest @ ..]) => {
                let Some(schema) = models::schema_for(collection) else {
                    return response::invalid_endpoint(url.path());
                };
                self.route(method, schema, rest, &origin, body, url.path())
            }
            _ => response::invalid_endpoint(url.path()),
        }
    }

    fn route(
        &mut self,
        method: HttpMethod,
        schema: &'static Schema,
        rest: &[&str],
        origin: &str,
        body: Option<&str>,
        path: &str,
    ) -> HttpResponse {
        match (method, rest) {
            (HttpMethod::Get, []) => records::index(self, schema),
            (HttpMethod::Post, []) => match params(schema, body) {
                Ok(params) => records::create(self, schema, origin, params),
                Err(response) => response,
            },
            (method, [id, tail @ ..]) => {
                let Ok(id) = id.parse::<u64>() else {
                    return response::not_found();
                };
                match (method, tail) {
                    (HttpMethod::Get, []) => records::show(self, schema, id),
                    (HttpMethod::Put, []) => match params(schema, body) {
                        Ok(params) => records::update(self, schema, id, params),
                        Err(response) => response,
                    },
                    (HttpMethod::Delete, []) => records::destroy(self, schema, id),
                    (HttpMethod::Get, tail) => relations::scoped(self, schema, id, tail),
                    _ => response::invalid_endpoint(path),
                }
            }
            _ => response::invalid_endpoint(path),
        }
    }
}

/// Pull the `{"<singular>": {...}}` payload out of a request body.
fn params(schema: &Schema, body: Option<&str>) -> Result<Record, HttpResponse> {
    let missing = || response::bad_request(&format!("param is missing or the value is empty: {}", schema.singular));
    let body = body.ok_or_else(missing)?;
    let value: Value = serde_json::from_str(body).map_err(|e| response::bad_request(&e.to_string()))?;
    match value {
        Value::Object(mut object) => match object.remove(schema.singular) {
            Some(Value::Object(params)) => Ok(params),
            _ => Err(missing()),
        },
        _ => Err(missing()),
    }
}
