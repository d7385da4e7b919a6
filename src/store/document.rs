//! Document store abstraction.
//!
//! Records are schema-less JSON objects grouped in named collections and keyed
//! by an opaque identifier, the same shape the hosted document database uses.
//! Typed records go through [`to_document`] and [`StoredDocument::decode`].

use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// A stored JSON object.
pub type Document = Map<String, Value>;

/// Collection names.
pub mod collections {
    pub const PROPERTIES: &str = "properties";
    pub const USERS: &str = "users";
    pub const MAINTENANCE_REQUESTS: &str = "maintenanceRequests";
    pub const AGREEMENTS: &str = "agreements";

    /// Every collection the service writes to.
    pub const ALL: [&str; 4] = [PROPERTIES, USERS, MAINTENANCE_REQUESTS, AGREEMENTS];
}

/// Errors raised by document and blob stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Document {collection}/{key} not found")]
    NotFound { collection: String, key: String },

    #[error("Record does not serialize to a JSON object")]
    NotAnObject,

    #[error("Invalid blob path: {0}")]
    InvalidPath(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Persistence error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// A document together with its key.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub key: String,
    pub data: Document,
}

impl StoredDocument {
    /// Deserialize the document body into a typed record.
    pub fn decode<T: DeserializeOwned>(&self) -> StoreResult<T> {
        Ok(serde_json::from_value(Value::Object(self.data.clone()))?)
    }
}

/// Serialize a typed record into a document body.
pub fn to_document<T: Serialize>(value: &T) -> StoreResult<Document> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        _ => Err(StoreError::NotAnObject),
    }
}

/// Read a field as text. Numbers are rendered, other types yield `None`.
pub fn field_str(doc: &Document, field: &str) -> Option<String> {
    match doc.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Read a field as a number, accepting numeric strings.
pub fn field_f64(doc: &Document, field: &str) -> Option<f64> {
    match doc.get(field)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Generate a 20-character alphanumeric document key.
pub fn generate_key() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(20)
        .map(char::from)
        .collect()
}

/// Access to the document database.
///
/// Every write is an independent, unconditioned upsert; implementations give
/// no ordering guarantee between concurrent writers.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a document under a freshly generated key and return the key.
    async fn insert(&self, collection: &str, doc: Document) -> StoreResult<String>;

    /// Create or replace the document at `key`.
    async fn set(&self, collection: &str, key: &str, doc: Document) -> StoreResult<()>;

    async fn get(&self, collection: &str, key: &str) -> StoreResult<Option<Document>>;

    /// Merge `fields` into an existing document. Fails with `NotFound` if absent.
    async fn update(&self, collection: &str, key: &str, fields: Document) -> StoreResult<()>;

    /// Documents whose `field` equals `value`, up to `limit`.
    async fn find_eq(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
        limit: Option<usize>,
    ) -> StoreResult<Vec<StoredDocument>>;

    async fn list(&self, collection: &str) -> StoreResult<Vec<StoredDocument>>;

    async fn count(&self, collection: &str) -> StoreResult<usize>;

    /// Persist buffered state, if the implementation buffers any.
    async fn flush(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Sample {
        house_id: String,
        beds: u32,
    }

    #[test]
    fn test_typed_round_trip_uses_field_names() {
        let doc = to_document(&Sample { house_id: "H1".into(), beds: 3 }).unwrap();
        assert_eq!(doc.get("houseId"), Some(&Value::from("H1")));

        let stored = StoredDocument { key: "k".into(), data: doc };
        assert_eq!(stored.decode::<Sample>().unwrap().beds, 3);
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(matches!(to_document(&42), Err(StoreError::NotAnObject)));
    }

    #[test]
    fn test_lenient_field_access() {
        let doc = serde_json::json!({"price": "450000", "beds": 3, "title": "Loft", "tags": []});
        let doc = doc.as_object().unwrap();
        assert_eq!(field_f64(doc, "price"), Some(450000.0));
        assert_eq!(field_f64(doc, "beds"), Some(3.0));
        assert_eq!(field_str(doc, "beds").as_deref(), Some("3"));
        assert_eq!(field_str(doc, "title").as_deref(), Some("Loft"));
        assert_eq!(field_str(doc, "tags"), None);
        assert_eq!(field_f64(doc, "missing"), None);
    }

    #[test]
    fn test_generated_keys() {
        let a = generate_key();
        let b = generate_key();
        assert_eq!(a.len(), 20);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }
}
