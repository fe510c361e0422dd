//! Capture: the enqueue side of the relay
//!
//! Collaborators hand over either raw bytes or a JSON value. JSON values are
//! serialized with `serde_json` before they reach the queue, so what is stored
//! is exactly what will be replayed.

use crate::db::Database;
use crate::error::Result;
use crate::types::EntryId;

/// A request body handed to [`capture`]
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Stored verbatim
    Bytes(Vec<u8>),
    /// Stored as compact JSON
    Json(serde_json::Value),
}

impl Payload {
    /// Bytes that will be written to the queue
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            Payload::Bytes(bytes) => Ok(bytes),
            Payload::Json(value) => Ok(serde_json::to_vec(&value)?),
        }
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Bytes(bytes)
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Payload::Bytes(bytes.to_vec())
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        Payload::Json(value)
    }
}

/// Enqueue a payload under a destination
///
/// Returns once the entry is committed. A storage failure is returned as
/// [`crate::Error::Storage`] and must be treated as fatal by the caller.
pub fn capture(db: &Database, destination: &str, payload: impl Into<Payload>) -> Result<EntryId> {
    let bytes = payload.into().into_bytes()?;
    let id = db.append(destination, &bytes)?;

    tracing::info!(id = %id, destination, bytes = bytes.len(), "Captured request");

    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_payload_round_trips() {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();

        let value = json!({
            "operationName": "pushPayload",
            "variables": {"payload_id": 7, "events": ["a", "ü"]},
        });
        capture(&db, "gql", value.clone()).unwrap();

        let entries = db.entries().unwrap();
        let stored: serde_json::Value = serde_json::from_slice(&entries[0].payload).unwrap();
        assert_eq!(stored, value);
    }

    #[test]
    fn test_json_keeps_big_numbers_and_key_order() {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();

        let literal = r#"{"id":123456789012345678901234567890,"f":0.30000000000000004441}"#;
        let value: serde_json::Value = serde_json::from_str(literal).unwrap();
        capture(&db, "gql", value).unwrap();

        let entries = db.entries().unwrap();
        assert_eq!(entries[0].payload, literal.as_bytes());
    }

    #[test]
    fn test_bytes_stored_verbatim() {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();

        let raw = b"{ \"not\" :  \"reformatted\" }".to_vec();
        let id = capture(&db, "otel:/v1/logs", raw.clone()).unwrap();

        let entries = db.entries().unwrap();
        assert_eq!(entries[0].id, id);
        assert_eq!(entries[0].payload, raw);
    }

    #[test]
    fn test_capture_without_schema_is_storage_fault() {
        // No migrate(): the queue table is missing
        let db = Database::open_in_memory().unwrap();
        let err = capture(&db, "gql", b"{}".as_slice()).unwrap_err();
        assert!(matches!(err, crate::Error::Storage(_)));
    }
}
