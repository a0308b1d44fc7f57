//! Persistence layer — the lead store seam and its libSQL backend.

pub mod libsql_backend;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::flow::model::LeadRecord;

pub use libsql_backend::{LibSqlLeadStore, StoredLead};

/// The storage collaborator the flow hands completed records to.
///
/// Saving is the only operation the flow needs; the backend assigns
/// each record its identity.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Persist a finalized record and return the assigned lead id.
    async fn save(&self, record: &LeadRecord) -> Result<String, StoreError>;
}
