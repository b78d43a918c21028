//! Per-collection repository configuration.

use crate::entity::id::RecordId;
use serde_json::Value;
use std::time::Duration;

/// Static configuration for one collection.
///
/// Besides naming, the config owns the response-unwrapping rules: the
/// backend may answer with a bare record/list or wrap it under the
/// collection (plural) or singular key, and `unwrap_*` normalize both.
#[derive(Debug, Clone)]
pub struct RepositoryConfig {
    /// Collection name, also the list path segment (`vehicles`).
    pub collection: String,
    /// Singular name used for response unwrapping (`vehicle`).
    pub singular: String,
    /// Whether records carry an `isDeleted` flag instead of being
    /// physically removed.
    pub soft_delete: bool,
    /// Delay before the single retry after a network-change error.
    pub retry_delay: Duration,
}

impl RepositoryConfig {
    /// Creates a configuration for `collection` with its singular form.
    pub fn new(collection: impl Into<String>, singular: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            singular: singular.into(),
            soft_delete: false,
            retry_delay: Duration::from_millis(300),
        }
    }

    /// Enables or disables soft-delete filtering.
    #[must_use]
    pub fn with_soft_delete(mut self, enabled: bool) -> Self {
        self.soft_delete = enabled;
        self
    }

    /// Sets the network-change retry delay.
    #[must_use]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Path of the collection list resource.
    #[must_use]
    pub fn list_path(&self) -> String {
        format!("/{}", self.collection)
    }

    /// Path of a single record resource.
    ///
    /// Temporary ids must never reach the backend as path parameters;
    /// callers route temp-id operations through the offline path instead.
    #[must_use]
    pub fn record_path(&self, id: &RecordId) -> String {
        debug_assert!(!id.is_temp(), "temporary id used as a path parameter");
        format!("/{}/{}", self.collection, id.as_str())
    }

    /// Extracts a record list from a response payload.
    ///
    /// Accepts a bare array or an object wrapping the array under the
    /// collection key.
    #[must_use]
    pub fn unwrap_list(&self, data: &Value) -> Option<Vec<Value>> {
        if let Some(list) = data.as_array() {
            return Some(list.clone());
        }
        data.get(&self.collection)?.as_array().cloned()
    }

    /// Extracts a single record from a response payload.
    ///
    /// Accepts a bare record object or an object wrapping it under the
    /// singular key.
    #[must_use]
    pub fn unwrap_record(&self, data: &Value) -> Option<Value> {
        if data.get("id").is_some() {
            return Some(data.clone());
        }
        let inner = data.get(&self.singular)?;
        inner.get("id")?;
        Some(inner.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_defaults() {
        let config = RepositoryConfig::new("vehicles", "vehicle");
        assert!(!config.soft_delete);
        assert_eq!(config.list_path(), "/vehicles");

        let config = config.with_soft_delete(true);
        assert!(config.soft_delete);
    }

    #[test]
    fn record_path_uses_raw_id() {
        let config = RepositoryConfig::new("vehicles", "vehicle");
        let id = RecordId::server("veh-7");
        assert_eq!(config.record_path(&id), "/vehicles/veh-7");
    }

    #[test]
    fn unwrap_list_accepts_bare_and_wrapped() {
        let config = RepositoryConfig::new("vehicles", "vehicle");

        let bare = json!([{"id": "a"}]);
        assert_eq!(config.unwrap_list(&bare).unwrap().len(), 1);

        let wrapped = json!({"vehicles": [{"id": "a"}, {"id": "b"}]});
        assert_eq!(config.unwrap_list(&wrapped).unwrap().len(), 2);

        assert!(config.unwrap_list(&json!({"bookings": []})).is_none());
    }

    #[test]
    fn unwrap_record_accepts_bare_and_wrapped() {
        let config = RepositoryConfig::new("vehicles", "vehicle");

        let bare = json!({"id": "a", "plate": "XY"});
        assert_eq!(config.unwrap_record(&bare).unwrap()["id"], "a");

        let wrapped = json!({"vehicle": {"id": "b"}});
        assert_eq!(config.unwrap_record(&wrapped).unwrap()["id"], "b");

        assert!(config.unwrap_record(&json!({"vehicle": {}})).is_none());
        assert!(config.unwrap_record(&json!({"note": "no record"})).is_none());
    }
}
