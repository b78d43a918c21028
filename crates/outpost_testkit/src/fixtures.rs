//! Fixture entity types.

use outpost_core::{Entity, RecordId, RepoError, RepoResult, RepositoryConfig};
use serde::{Deserialize, Serialize};

/// A maintenance work order. Plain collection, no soft delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrder {
    /// Record identity.
    pub id: RecordId,
    /// Short description of the job.
    pub title: String,
    /// Vehicle the job applies to.
    pub vehicle_id: String,
    /// Workflow state (`open`, `in_progress`, `done`).
    #[serde(default)]
    pub status: String,
    /// RFC 3339 creation stamp.
    #[serde(default)]
    pub created_at: String,
    /// RFC 3339 last-update stamp.
    #[serde(default)]
    pub updated_at: String,
    /// True while a local mutation is unconfirmed.
    #[serde(default)]
    pub pending: bool,
    /// Epoch-millisecond of the last local modification.
    #[serde(default)]
    pub last_modified: i64,
}

impl WorkOrder {
    /// Creates a draft ready to pass to `create`.
    #[must_use]
    pub fn draft(title: impl Into<String>, vehicle_id: impl Into<String>) -> Self {
        Self {
            id: RecordId::server(String::new()),
            title: title.into(),
            vehicle_id: vehicle_id.into(),
            status: "open".to_string(),
            created_at: String::new(),
            updated_at: String::new(),
            pending: false,
            last_modified: 0,
        }
    }
}

impl Entity for WorkOrder {
    fn id(&self) -> &RecordId {
        &self.id
    }
    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
    fn created_at(&self) -> &str {
        &self.created_at
    }
    fn set_created_at(&mut self, at: String) {
        self.created_at = at;
    }
    fn updated_at(&self) -> &str {
        &self.updated_at
    }
    fn set_updated_at(&mut self, at: String) {
        self.updated_at = at;
    }
    fn pending(&self) -> bool {
        self.pending
    }
    fn set_pending(&mut self, pending: bool) {
        self.pending = pending;
    }
    fn last_modified(&self) -> i64 {
        self.last_modified
    }
    fn set_last_modified(&mut self, at_ms: i64) {
        self.last_modified = at_ms;
    }

    fn validate(&self) -> RepoResult<()> {
        if self.title.trim().is_empty() {
            return Err(RepoError::validation("title is required"));
        }
        if self.vehicle_id.trim().is_empty() {
            return Err(RepoError::validation("vehicleId is required"));
        }
        Ok(())
    }
}

/// A customer. Soft-delete collection: removed records carry `isDeleted`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Record identity.
    pub id: RecordId,
    /// Display name.
    pub full_name: String,
    /// Contact address.
    pub email: String,
    /// Soft-delete marker.
    #[serde(default)]
    pub is_deleted: bool,
    /// RFC 3339 creation stamp.
    #[serde(default)]
    pub created_at: String,
    /// RFC 3339 last-update stamp.
    #[serde(default)]
    pub updated_at: String,
    /// True while a local mutation is unconfirmed.
    #[serde(default)]
    pub pending: bool,
    /// Epoch-millisecond of the last local modification.
    #[serde(default)]
    pub last_modified: i64,
}

impl Customer {
    /// Creates a draft ready to pass to `create`.
    #[must_use]
    pub fn draft(full_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: RecordId::server(String::new()),
            full_name: full_name.into(),
            email: email.into(),
            is_deleted: false,
            created_at: String::new(),
            updated_at: String::new(),
            pending: false,
            last_modified: 0,
        }
    }
}

impl Entity for Customer {
    fn id(&self) -> &RecordId {
        &self.id
    }
    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
    fn created_at(&self) -> &str {
        &self.created_at
    }
    fn set_created_at(&mut self, at: String) {
        self.created_at = at;
    }
    fn updated_at(&self) -> &str {
        &self.updated_at
    }
    fn set_updated_at(&mut self, at: String) {
        self.updated_at = at;
    }
    fn pending(&self) -> bool {
        self.pending
    }
    fn set_pending(&mut self, pending: bool) {
        self.pending = pending;
    }
    fn last_modified(&self) -> i64 {
        self.last_modified
    }
    fn set_last_modified(&mut self, at_ms: i64) {
        self.last_modified = at_ms;
    }
    fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    fn validate(&self) -> RepoResult<()> {
        if self.full_name.trim().is_empty() {
            return Err(RepoError::validation("fullName is required"));
        }
        if !self.email.contains('@') {
            return Err(RepoError::validation("email must contain '@'"));
        }
        Ok(())
    }
}

/// Repository configuration for the work-order collection.
#[must_use]
pub fn work_order_config() -> RepositoryConfig {
    RepositoryConfig::new("workorders", "workorder")
}

/// Repository configuration for the customer collection.
#[must_use]
pub fn customer_config() -> RepositoryConfig {
    RepositoryConfig::new("customers", "customer").with_soft_delete(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_order_validation() {
        assert!(WorkOrder::draft("Replace brakes", "veh-1").validate().is_ok());
        assert!(WorkOrder::draft("  ", "veh-1").validate().is_err());
        assert!(WorkOrder::draft("Replace brakes", "").validate().is_err());
    }

    #[test]
    fn customer_validation() {
        assert!(Customer::draft("Avery Quinn", "avery@example.com").validate().is_ok());
        assert!(Customer::draft("Avery Quinn", "not-an-email").validate().is_err());
    }

    #[test]
    fn wire_form_uses_camel_case() {
        let order = WorkOrder::draft("Replace brakes", "veh-1");
        let value = serde_json::to_value(&order).unwrap();
        assert!(value.get("vehicleId").is_some());
        assert!(value.get("createdAt").is_some());
        assert!(value.get("lastModified").is_some());
    }
}
