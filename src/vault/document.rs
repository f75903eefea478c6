//! The decrypted secrets document and its pure data operations.
//!
//! Shape on the wire:
//!
//! ```json
//! { "services": { "github": { "token": "abc123", "username": null } } }
//! ```
//!
//! A missing `services` key reads as an empty document.  Any other
//! top-level key is rejected, so a flat `{"api_key": "..."}` file is never
//! mistaken for a document.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, VaultError};

/// Field name -> value map for one service.
pub type FieldMap = BTreeMap<String, FieldValue>;

/// A secret value: a string, or JSON `null` for a field that is known but
/// left empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldValue(Option<String>);

impl FieldValue {
    pub fn null() -> Self {
        Self(None)
    }

    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }

    pub fn into_inner(self) -> Option<String> {
        self.0
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self(Some(value.to_string()))
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self(Some(value))
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        Self(value)
    }
}

impl From<Option<&str>> for FieldValue {
    fn from(value: Option<&str>) -> Self {
        Self(value.map(str::to_string))
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(s) => f.write_str(s),
            None => f.write_str("null"),
        }
    }
}

/// The full secret hierarchy: service -> field -> value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecretDocument {
    #[serde(default)]
    pub services: BTreeMap<String, FieldMap>,
}

impl SecretDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a document from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_json_slice(json.as_bytes())
    }

    /// Parse a document from UTF-8 JSON bytes.
    ///
    /// Field values must be strings or null.  A number, boolean, array or
    /// object in a field is rejected with an error naming that field.
    pub fn from_json_slice(json: &[u8]) -> Result<Self> {
        serde_json::from_slice(json).map_err(|e| parse_error(e, json))
    }

    /// Compact JSON, used as the plaintext that gets encrypted.
    pub fn to_json_vec(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| VaultError::MalformedDocument(e.to_string()))
    }

    /// Indented JSON, used for exports and backups.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| VaultError::MalformedDocument(e.to_string()))
    }

    /// Look up one field.  Absence of the service or field is `None`.
    pub fn get(&self, service: &str, field: &str) -> Option<&FieldValue> {
        self.services.get(service)?.get(field)
    }

    /// All fields of a service; empty if the service is unknown.
    pub fn get_all_for_service(&self, service: &str) -> FieldMap {
        self.services.get(service).cloned().unwrap_or_default()
    }

    /// Service names, sorted.
    pub fn list_services(&self) -> Vec<String> {
        self.services.keys().cloned().collect()
    }

    pub fn service_count(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Insert or overwrite a field, creating the service if needed.
    pub fn set(&mut self, service: &str, field: &str, value: impl Into<FieldValue>) {
        self.services
            .entry(service.to_string())
            .or_default()
            .insert(field.to_string(), value.into());
    }

    /// Remove a field and return its old value.
    ///
    /// A service whose last field is removed is dropped as well.
    pub fn remove(&mut self, service: &str, field: &str) -> Result<FieldValue> {
        let fields = self
            .services
            .get_mut(service)
            .ok_or_else(|| VaultError::not_found(service, field))?;

        let old = fields
            .remove(field)
            .ok_or_else(|| VaultError::not_found(service, field))?;

        if fields.is_empty() {
            self.services.remove(service);
        }

        Ok(old)
    }

    /// Upsert several fields of one service at once.
    pub fn update_service(&mut self, service: &str, fields: FieldMap) {
        self.services
            .entry(service.to_string())
            .or_default()
            .extend(fields);
    }

    /// Right-biased union with `from`.
    ///
    /// Fields present in both take `from`'s value, fields only here are
    /// kept, services only in `from` are added whole.
    pub fn merge(&mut self, from: SecretDocument) {
        for (service, fields) in from.services {
            self.update_service(&service, fields);
        }
    }
}

/// Functional form of [`SecretDocument::merge`].
pub fn merge(mut into: SecretDocument, from: SecretDocument) -> SecretDocument {
    into.merge(from);
    into
}

/// Prefer an error that names the offending field over serde's
/// line/column message when the JSON itself is well formed.
fn parse_error(err: serde_json::Error, json: &[u8]) -> VaultError {
    let detail = serde_json::from_slice::<serde_json::Value>(json)
        .ok()
        .and_then(|value| unsupported_value(&value));
    VaultError::MalformedDocument(detail.unwrap_or_else(|| err.to_string()))
}

fn unsupported_value(doc: &serde_json::Value) -> Option<String> {
    let services = doc.get("services")?.as_object()?;
    for (service, fields) in services {
        let Some(fields) = fields.as_object() else {
            return Some(format!(
                "service '{service}' holds {}, expected an object of fields",
                json_kind(fields)
            ));
        };
        for (field, value) in fields {
            if !(value.is_string() || value.is_null()) {
                return Some(format!(
                    "field '{field}' of service '{service}' holds {}; only strings and null are supported",
                    json_kind(value)
                ));
            }
        }
    }
    None
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
