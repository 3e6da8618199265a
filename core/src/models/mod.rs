//! Resource models and their persistence.
//!
//! # Design
//! Models are plain data. Every operation that talks to the API takes the
//! `Client` explicitly; `Model` supplies `save`, `destroy`, `reload` and
//! `is_destroyed` once for all resources, and each resource adds its own
//! relationship accessors on top.

mod category;
mod group;
mod membership;
mod organization;
mod ticket;
mod user;

pub use category::Category;
pub use group::Group;
pub use membership::Membership;
pub use organization::Organization;
pub use ticket::{CustomField, Ticket, TicketPriority, TicketStatus, TicketType};
pub use user::{LoginOptions, Role, User};

use crate::client::Client;
use crate::error::ApiError;
use crate::request::Request;
use crate::schema::{Resource, Schema};

/// Look up a schema by its collection path segment.
pub fn schema_for(collection: &str) -> Option<&'static Schema> {
    [
        User::SCHEMA,
        Organization::SCHEMA,
        Membership::SCHEMA,
        Ticket::SCHEMA,
        Category::SCHEMA,
        Group::SCHEMA,
    ]
    .into_iter()
    .find(|schema| schema.collection == collection)
}

/// Persistence for a resource. The server's answer is authoritative: every
/// call merges the returned record into `self`.
pub trait Model: Resource {
    /// Attributes that must be present before the first save.
    const REQUIRED: &'static [&'static str];

    /// Create when there is no identity yet, update otherwise.
    fn save(&mut self, client: &Client) -> Result<(), ApiError> {
        let params = self.params()?;
        let record = match self.id() {
            None => {
                self.requires(Self::REQUIRED)?;
                client.create_record(Self::SCHEMA, &params)?
            }
            Some(id) => client.update_record(Self::SCHEMA, id, &params)?,
        };
        self.merge_attributes(record)
    }

    /// Guard run before a delete request is issued.
    fn check_destroy(&self, _client: &Client) -> Result<(), ApiError> {
        Ok(())
    }

    fn destroy(&mut self, client: &Client) -> Result<(), ApiError> {
        let id = self.identity()?;
        self.check_destroy(client)?;
        if let Some(record) = client.destroy_record(Self::SCHEMA, id)? {
            self.merge_attributes(record)?;
        }
        Ok(())
    }

    /// Replace every attribute with the server's copy.
    fn reload(&mut self, client: &Client) -> Result<(), ApiError> {
        let id = self.identity()?;
        let record = client.show_record(Self::SCHEMA, id)?;
        *self = Self::from_record(record)?;
        Ok(())
    }

    /// True once the record is gone or deactivated on the server.
    fn is_destroyed(&self, client: &Client) -> Result<bool, ApiError> {
        let id = self.identity()?;
        match client.show_record(Self::SCHEMA, id) {
            Ok(record) => Ok(Self::SCHEMA.is_inactive(&record)),
            Err(ApiError::NotFound) => Ok(true),
            Err(e) => Err(e),
        }
    }
}

/// Records of `R` listed below `parent`, e.g. `/users/7/tickets/requested`.
pub(crate) fn scoped<R: Resource>(client: &Client, parent: &Schema, id: u64, tail: &str) -> Result<Vec<R>, ApiError> {
    client.fetch_all(&Request::scoped(parent, id, tail))
}

/// Fetch the record a foreign key points at, if it is set.
pub(crate) fn associated<R: Resource>(client: &Client, id: Option<u64>) -> Result<Option<R>, ApiError> {
    id.map(|id| client.get::<R>(id)).transpose()
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::BTreeSet;

    use crate::schema::{Resource, Schema};

    /// The schema table must name exactly the keys serde produces, and the
    /// whitelist must never include generated fields.
    pub(crate) fn assert_schema_matches<R: Resource + Default>() {
        let serialized: BTreeSet<String> = R::default().attributes().unwrap().keys().cloned().collect();
        let declared: BTreeSet<String> = R::SCHEMA
            .attributes
            .iter()
            .map(|attribute| attribute.name.to_string())
            .collect();
        assert_eq!(serialized, declared, "{} attribute table", R::SCHEMA.singular);

        for accepted in R::SCHEMA.accepted {
            assert!(
                R::SCHEMA.attribute(accepted).is_some(),
                "{} accepts undeclared `{accepted}`",
                R::SCHEMA.singular
            );
        }
        for generated in [Schema::IDENTITY, "url", "created_at", "updated_at"] {
            assert!(!R::SCHEMA.is_accepted(generated), "{} accepts `{generated}`", R::SCHEMA.singular);
        }
    }
}
