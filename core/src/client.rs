//! Session-bound client for the Zendesk API.
//!
//! # Design
//! `Client` owns a `Config` and a `Transport` and nothing else. Every call
//! renders a `Request` descriptor, hands the resulting `HttpRequest` to the
//! transport and parses the `HttpResponse`. Whether that transport reaches
//! the network or the in-memory mock is invisible above this layer, so
//! models behave identically in both modes.

use tracing::debug;

use crate::config::Config;
use crate::error::ApiError;
use crate::http::HttpResponse;
use crate::mock::SharedStore;
use crate::models::{Model, User};
use crate::request::{self, Request};
use crate::schema::{Record, Resource, Schema};
use crate::transport::{HttpTransport, MockTransport, Transport};

pub struct Client {
    config: Config,
    transport: Box<dyn Transport>,
}

impl Client {
    /// A live client, or a mock one when `config.mock` is set.
    pub fn new(config: Config) -> Self {
        if config.mock {
            return Self::mock(config);
        }
        Self::with_transport(config, HttpTransport::new())
    }

    /// A client served by a fresh in-memory store.
    pub fn mock(config: Config) -> Self {
        let transport = MockTransport::new(&config.username);
        Self::with_transport(config, transport)
    }

    pub fn with_transport<T>(config: Config, transport: T) -> Self
    where
        T: Transport + 'static,
    {
        Self {
            config,
            transport: Box::new(transport),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The store behind a mock client.
    pub fn mock_store(&self) -> Option<SharedStore> {
        self.transport.mock_store()
    }

    /// Execute one request and return the raw response.
    pub fn send(&self, request: &Request) -> Result<HttpResponse, ApiError> {
        let http = request.to_http(&self.config)?;
        debug!(method = %http.method, url = %http.url, "zendesk request");
        let response = self.transport.execute(http)?;
        debug!(status = response.status, path = %request.path, "zendesk response");
        Ok(response)
    }

    pub fn create_record(&self, schema: &Schema, params: &Record) -> Result<Record, ApiError> {
        self.expect_record(&Request::create(schema, params), schema)
    }

    pub fn show_record(&self, schema: &Schema, id: u64) -> Result<Record, ApiError> {
        self.expect_record(&Request::show(schema, id), schema)
    }

    pub fn update_record(&self, schema: &Schema, id: u64, params: &Record) -> Result<Record, ApiError> {
        self.expect_record(&Request::update(schema, id, params), schema)
    }

    /// Deactivating deletes return the record; removals return `None`.
    pub fn destroy_record(&self, schema: &Schema, id: u64) -> Result<Option<Record>, ApiError> {
        let request = Request::destroy(schema, id);
        request::parse_record(self.send(&request)?, schema, request.expected)
    }

    /// Records listed by any collection request, e.g. `Request::scoped`.
    /// The envelope key is the collection of `R`.
    pub fn fetch_all<R: Resource>(&self, request: &Request) -> Result<Vec<R>, ApiError> {
        let response = self.send(request)?;
        request::parse_collection(response, R::SCHEMA.collection, request.expected)?
            .into_iter()
            .map(R::from_record)
            .collect()
    }

    pub fn get<R: Resource>(&self, id: u64) -> Result<R, ApiError> {
        R::from_record(self.show_record(R::SCHEMA, id)?)
    }

    pub fn list<R: Resource>(&self) -> Result<Vec<R>, ApiError> {
        self.fetch_all(&Request::index(R::SCHEMA))
    }

    /// Save a new record and return it as the server stored it.
    pub fn create<R: Model>(&self, mut record: R) -> Result<R, ApiError> {
        record.save(self)?;
        Ok(record)
    }

    /// The user the session is authenticated as.
    pub fn current_user(&self) -> Result<User, ApiError> {
        User::from_record(self.expect_record(&Request::current_user(), User::SCHEMA)?)
    }

    fn expect_record(&self, request: &Request, schema: &Schema) -> Result<Record, ApiError> {
        request::parse_record(self.send(request)?, schema, request.expected)?
            .ok_or_else(|| ApiError::DeserializationError(format!("empty `{}` response", schema.singular)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpMethod, HttpRequest};
    use crate::models::{Category, Ticket};
    use std::sync::{Arc, Mutex};

    /// Records requests and replays a canned response.
    struct Recording {
        seen: Arc<Mutex<Vec<HttpRequest>>>,
        reply: HttpResponse,
    }

    impl Transport for Recording {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.seen.lock().unwrap().push(request);
            Ok(self.reply.clone())
        }
    }

    fn config() -> Config {
        Config::new("https://acme.zendesk.com", "admin@acme.com").with_token("t")
    }

    fn recording(status: u16, body: &str) -> (Client, Arc<Mutex<Vec<HttpRequest>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let transport = Recording {
            seen: Arc::clone(&seen),
            reply: HttpResponse {
                status,
                headers: Vec::new(),
                body: body.to_string(),
            },
        };
        (Client::with_transport(config(), transport), seen)
    }

    #[test]
    fn new_honors_mock_flag() {
        assert!(Client::new(config().mocked()).mock_store().is_some());
        assert!(Client::new(config()).mock_store().is_none());
    }

    #[test]
    fn get_parses_live_response() {
        let (client, seen) = recording(200, r#"{"category":{"id":3,"name":"General","position":2}}"#);
        let category: Category = client.get(3).unwrap();
        assert_eq!(category.name.as_deref(), Some("General"));
        assert_eq!(category.position, Some(2));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].method, HttpMethod::Get);
        assert_eq!(seen[0].url, "https://acme.zendesk.com/api/v2/categories/3.json");
        assert!(seen[0].header("authorization").is_some());
    }

    #[test]
    fn unexpected_status_surfaces_as_error() {
        let (client, _) = recording(503, "maintenance");
        let err = client.list::<Ticket>().unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 503, .. }));
    }

    #[test]
    fn removal_returns_no_record() {
        let (client, seen) = recording(204, "");
        assert!(client.destroy_record(Ticket::SCHEMA, 8).unwrap().is_none());
        assert_eq!(seen.lock().unwrap()[0].method, HttpMethod::Delete);
    }

    #[test]
    fn mock_client_round_trip() {
        let client = Client::mock(config());
        let created = client.create(Category::new("Billing")).unwrap();
        let id = created.id.unwrap();
        let fetched: Category = client.get(id).unwrap();
        assert_eq!(fetched, created);
        assert_eq!(client.list::<Category>().unwrap().len(), 1);

        let me = client.current_user().unwrap();
        assert_eq!(me.email.as_deref(), Some("admin@acme.com"));
        assert_ne!(me.id, Some(id));
    }
}
