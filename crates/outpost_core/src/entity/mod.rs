//! Entity contract and document helpers.

pub mod id;
pub mod stamp;

use crate::error::{RepoError, RepoResult};
use self::id::RecordId;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// A domain record that can be cached locally and synced with the backend.
///
/// Every synced type carries the same envelope alongside its domain fields:
/// an id, creation/update stamps, a `pending` flag marking unconfirmed
/// local mutations, and a `last_modified` epoch-millisecond used for
/// ordering when local and server views are merged.
///
/// Types are expected to serialize the envelope under the wire names the
/// backend uses (`id`, `createdAt`, `updatedAt`, `pending`,
/// `lastModified`, and `isDeleted` for soft-delete collections).
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection-unique identity.
    fn id(&self) -> &RecordId;

    /// Replaces the identity. Called when a temporary id is minted or a
    /// server id is confirmed.
    fn set_id(&mut self, id: RecordId);

    /// RFC 3339 creation stamp.
    fn created_at(&self) -> &str;

    /// Sets the creation stamp.
    fn set_created_at(&mut self, at: String);

    /// RFC 3339 last-update stamp.
    fn updated_at(&self) -> &str;

    /// Sets the last-update stamp.
    fn set_updated_at(&mut self, at: String);

    /// True while the record reflects an unconfirmed local mutation.
    fn pending(&self) -> bool;

    /// Sets the pending flag.
    fn set_pending(&mut self, pending: bool);

    /// Epoch-millisecond of the last local modification.
    fn last_modified(&self) -> i64;

    /// Sets the last-modification instant.
    fn set_last_modified(&mut self, at_ms: i64);

    /// Soft-delete flag. Collections without soft delete keep the default.
    fn is_deleted(&self) -> bool {
        false
    }

    /// Collection-specific field validation.
    ///
    /// Runs synchronously before any I/O; a failure here aborts the
    /// operation without touching the store, the queue, or the network.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::Validation`] describing the offending field.
    fn validate(&self) -> RepoResult<()> {
        Ok(())
    }
}

/// Serializes a record into its stored document form.
///
/// # Errors
///
/// Returns an error if the record does not serialize to a JSON object.
pub fn to_document<T: Entity>(record: &T) -> RepoResult<Value> {
    let doc = serde_json::to_value(record)?;
    if !doc.is_object() {
        return Err(RepoError::validation(
            "entities must serialize to JSON objects",
        ));
    }
    Ok(doc)
}

/// Deserializes a stored or server document into a record.
///
/// # Errors
///
/// Returns an error if the document does not fit the record shape.
pub fn from_document<T: Entity>(document: Value) -> RepoResult<T> {
    Ok(serde_json::from_value(document)?)
}

/// Body for a create request: the document minus the fields the server
/// owns or never sees (`id`, `pending`).
#[must_use]
pub fn creation_body(document: &Value) -> Value {
    let mut body = document.clone();
    if let Some(map) = body.as_object_mut() {
        map.remove("id");
        map.remove("pending");
    }
    body
}

/// Body for an update request: the document minus the local-only
/// `pending` flag.
#[must_use]
pub fn update_body(document: &Value) -> Value {
    let mut body = document.clone();
    if let Some(map) = body.as_object_mut() {
        map.remove("pending");
    }
    body
}
