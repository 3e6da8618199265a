//! Client SDK for the Zendesk support REST API, with an in-process mock.
//!
//! # Overview
//! Resources (users, organizations, memberships, tickets, categories,
//! groups) are typed models over a static attribute schema. Operations build
//! `Request` descriptors that render into plain-data `HttpRequest`s; a
//! `Transport` executes them either over the network or against the
//! in-memory `MockStore`, which answers with the real API's envelopes,
//! status codes and id semantics.
//!
//! # Design
//! - Models never own a connection; persistence takes `&Client`.
//! - Caller input passes through a per-resource whitelist before it reaches
//!   the wire, and again when the mock accepts it.
//! - The mock store is an explicit value with one id sequence shared by all
//!   collections.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod mock;
pub mod models;
pub mod request;
pub mod schema;
pub mod sso;
pub mod transport;

pub use client::Client;
pub use config::Config;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use mock::{MockStore, SharedStore};
pub use models::{
    Category, CustomField, Group, LoginOptions, Membership, Model, Organization, Role, Ticket, TicketPriority,
    TicketStatus, TicketType, User,
};
pub use request::Request;
pub use schema::{Record, Resource, Schema};
pub use transport::{HttpTransport, MockTransport, Transport};
