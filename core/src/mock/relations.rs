//! Listings nested under a parent record.

use std::collections::BTreeSet;

use super::rules::field_u64;
use super::{response, MockStore};
use crate::http::HttpResponse;
use crate::models::{Membership, Organization, Ticket, User};
use crate::schema::{Record, Resource, Schema};

pub(super) fn scoped(store: &MockStore, parent: &Schema, id: u64, tail: &[&str]) -> HttpResponse {
    if store.get(parent, id).is_none() {
        return response::not_found();
    }

    match (parent.collection, tail) {
        ("users", ["tickets", "requested"]) => {
            list(store, Ticket::SCHEMA, |ticket| field_u64(ticket, "requester_id") == Some(id))
        }
        ("users", ["tickets", "ccd"]) => list(store, Ticket::SCHEMA, |ticket| {
            ticket
                .get("collaborator_ids")
                .and_then(|ids| ids.as_array())
                .is_some_and(|ids| ids.iter().any(|value| value.as_u64() == Some(id)))
        }),
        ("users", ["organizations"]) => {
            let organizations = organizations_of(store, id);
            list(store, Organization::SCHEMA, |organization| {
                field_u64(organization, Schema::IDENTITY).is_some_and(|org| organizations.contains(&org))
            })
        }
        ("users", ["organization_memberships"]) => {
            list(store, Membership::SCHEMA, |membership| field_u64(membership, "user_id") == Some(id))
        }
        ("organizations", ["users"]) => {
            let members: BTreeSet<u64> = store
                .records(Membership::SCHEMA)
                .filter(|membership| field_u64(membership, "organization_id") == Some(id))
                .filter_map(|membership| field_u64(membership, "user_id"))
                .collect();
            list(store, User::SCHEMA, |user| {
                field_u64(user, "organization_id") == Some(id)
                    || field_u64(user, Schema::IDENTITY).is_some_and(|user_id| members.contains(&user_id))
            })
        }
        ("organizations", ["tickets"]) => {
            list(store, Ticket::SCHEMA, |ticket| field_u64(ticket, "organization_id") == Some(id))
        }
        ("organizations", ["organization_memberships"]) => list(store, Membership::SCHEMA, |membership| {
            field_u64(membership, "organization_id") == Some(id)
        }),
        _ => response::invalid_endpoint(&format!("/{}/{id}/{}", parent.collection, tail.join("/"))),
    }
}

fn list<F>(store: &MockStore, schema: &Schema, keep: F) -> HttpResponse
where
    F: Fn(&Record) -> bool,
{
    let records = store.records(schema).filter(|record| keep(record)).cloned().collect();
    response::collection(schema, records)
}

/// Organizations a user belongs to through memberships or `organization_id`.
fn organizations_of(store: &MockStore, user_id: u64) -> BTreeSet<u64> {
    let mut organizations: BTreeSet<u64> = store
        .records(Membership::SCHEMA)
        .filter(|membership| field_u64(membership, "user_id") == Some(user_id))
        .filter_map(|membership| field_u64(membership, "organization_id"))
        .collect();
    if let Some(organization_id) = store
        .get(User::SCHEMA, user_id)
        .and_then(|user| field_u64(user, "organization_id"))
    {
        organizations.insert(organization_id);
    }
    organizations
}
