//! Static attribute schemas and the `Resource` trait.
//!
//! # Design
//! Each resource is a plain serde struct plus a `Schema` constant naming its
//! JSON keys, their kinds and the whitelist of keys a caller may set. The
//! whitelist is applied at both ends of the wire: `Resource::params` filters
//! what the client sends, and the mock filters what it accepts.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// A resource as it travels over the wire: JSON key to value.
pub type Record = Map<String, Value>;

/// Declared type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    String,
    Integer,
    Boolean,
    /// ISO 8601 timestamp carried as a string.
    Time,
    Array,
    Object,
}

impl AttributeKind {
    /// Convert loosely typed input to this kind. Values that cannot be
    /// converted are returned unchanged.
    pub fn coerce(self, value: Value) -> Value {
        match (self, value) {
            (_, Value::Null) => Value::Null,
            (AttributeKind::Integer, Value::String(raw)) => {
                let parsed = raw.trim().parse::<i64>().ok();
                parsed.map_or(Value::String(raw), Value::from)
            }
            (AttributeKind::Boolean, Value::String(raw)) => {
                let parsed = match raw.trim() {
                    "true" | "1" => Some(true),
                    "false" | "0" => Some(false),
                    _ => None,
                };
                parsed.map_or(Value::String(raw), Value::Bool)
            }
            (AttributeKind::Boolean, Value::Number(number)) => match number.as_i64() {
                Some(0) => Value::Bool(false),
                Some(1) => Value::Bool(true),
                _ => Value::Number(number),
            },
            (AttributeKind::String, Value::Number(number)) => Value::String(number.to_string()),
            (AttributeKind::String, Value::Bool(flag)) => Value::String(flag.to_string()),
            (AttributeKind::Array, scalar @ (Value::String(_) | Value::Number(_) | Value::Bool(_))) => {
                Value::Array(vec![scalar])
            }
            (_, value) => value,
        }
    }
}

/// One typed attribute of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute {
    pub name: &'static str,
    pub kind: AttributeKind,
}

pub const fn attribute(name: &'static str, kind: AttributeKind) -> Attribute {
    Attribute { name, kind }
}

/// What a DELETE does to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    /// Record stays readable with `active=false`; the API answers 200.
    Deactivate,
    /// Record is removed; the API answers 204.
    Remove,
}

/// Wire description of a resource.
#[derive(Debug)]
pub struct Schema {
    /// Envelope key of a single record, e.g. `user`.
    pub singular: &'static str,
    /// Path segment and envelope key of a list, e.g. `users`.
    pub collection: &'static str,
    pub attributes: &'static [Attribute],
    /// Keys a caller may set on create or update.
    pub accepted: &'static [&'static str],
    pub deletion: Deletion,
}

impl Schema {
    /// Name of the identity attribute shared by every resource.
    pub const IDENTITY: &'static str = "id";

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|attribute| attribute.name == name)
    }

    pub fn is_accepted(&self, name: &str) -> bool {
        self.accepted.contains(&name)
    }

    /// Keep only whitelisted keys. Unknown keys are dropped silently.
    pub fn accept(&self, params: &Record) -> Record {
        params
            .iter()
            .filter(|(key, _)| self.is_accepted(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Coerce every declared attribute in `params` to its kind.
    pub fn coerce(&self, params: Record) -> Record {
        params
            .into_iter()
            .map(|(key, value)| match self.attribute(&key) {
                Some(attribute) => {
                    let value = attribute.kind.coerce(value);
                    (key, value)
                }
                None => (key, value),
            })
            .collect()
    }

    /// Whether `record` is a soft-deleted record of this resource.
    pub fn is_inactive(&self, record: &Record) -> bool {
        self.deletion == Deletion::Deactivate && record.get("active") == Some(&Value::Bool(false))
    }
}

/// A typed resource model backed by a `Schema`.
pub trait Resource: Serialize + DeserializeOwned + Clone + fmt::Debug {
    const SCHEMA: &'static Schema;

    fn id(&self) -> Option<u64>;

    fn from_record(record: Record) -> Result<Self, ApiError> {
        serde_json::from_value(Value::Object(record))
            .map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    /// Every attribute, including unset ones as `null`.
    fn attributes(&self) -> Result<Record, ApiError> {
        match serde_json::to_value(self).map_err(|e| ApiError::SerializationError(e.to_string()))? {
            Value::Object(record) => Ok(record),
            other => Err(ApiError::SerializationError(format!(
                "{} serialized to {other}",
                Self::SCHEMA.singular
            ))),
        }
    }

    /// Whitelisted, non-null attributes: the body of a create or update.
    fn params(&self) -> Result<Record, ApiError> {
        let mut params = Self::SCHEMA.accept(&self.attributes()?);
        params.retain(|_, value| !value.is_null());
        Ok(params)
    }

    /// Fail with `MissingAttributes` naming every blank attribute in `names`.
    fn requires(&self, names: &[&'static str]) -> Result<(), ApiError> {
        let attributes = self.attributes()?;
        let missing: Vec<&'static str> = names
            .iter()
            .copied()
            .filter(|name| attributes.get(*name).map_or(true, is_blank))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        Err(ApiError::MissingAttributes {
            resource: Self::SCHEMA.singular,
            attributes: missing,
        })
    }

    fn identity(&self) -> Result<u64, ApiError> {
        self.id().ok_or(ApiError::MissingIdentity {
            resource: Self::SCHEMA.singular,
        })
    }

    /// Overlay `record` on the current attributes; keys present in `record`
    /// win.
    fn merge_attributes(&mut self, record: Record) -> Result<(), ApiError> {
        let mut attributes = self.attributes()?;
        attributes.extend(record);
        *self = Self::from_record(attributes)?;
        Ok(())
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        _ => false,
    }
}
