//! libSQL backend — async `LeadStore` implementation.
//!
//! Supports local file and in-memory databases. Each lead row carries
//! one TEXT column per catalog field key plus storage-assigned id and
//! creation timestamp.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::StoreError;
use crate::flow::model::LeadRecord;
use crate::store::LeadStore;

/// libSQL lead store.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlLeadStore {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlLeadStore {
    /// Open (or create) a local database file and prepare the schema.
    pub async fn new_local(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Open(format!("Failed to create database directory: {e}")))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Open(format!("Failed to open libSQL database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| StoreError::Open(format!("Failed to create connection: {e}")))?;

        let store = Self {
            db: Arc::new(db),
            conn,
        };
        store.init_schema().await?;
        info!(path = %path.display(), "Lead store opened");
        Ok(store)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, StoreError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| StoreError::Open(format!("Failed to create in-memory database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| StoreError::Open(format!("Failed to create connection: {e}")))?;

        let store = Self {
            db: Arc::new(db),
            conn,
        };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS leads (
                    id TEXT PRIMARY KEY,
                    task TEXT NOT NULL,
                    plan TEXT NOT NULL,
                    budget TEXT NOT NULL,
                    timeline TEXT NOT NULL,
                    tech_preferences TEXT NOT NULL,
                    contact TEXT NOT NULL,
                    user_contact TEXT NOT NULL,
                    created_at TEXT NOT NULL
                )",
                (),
            )
            .await
            .map_err(|e| StoreError::Query(format!("init_schema: {e}")))?;
        Ok(())
    }

    /// Fetch a stored lead by id. Not part of the flow-facing trait;
    /// used by tests and operator tooling.
    pub async fn get(&self, id: &str) -> Result<Option<StoredLead>, StoreError> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, task, plan, budget, timeline, tech_preferences,
                        contact, user_contact, created_at
                 FROM leads WHERE id = ?1",
                params![id],
            )
            .await
            .map_err(|e| StoreError::Query(format!("get_lead: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let lead = row_to_lead(&row)
                    .map_err(|e| StoreError::Query(format!("get_lead row parse: {e}")))?;
                Ok(Some(lead))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(StoreError::Query(format!("get_lead: {e}"))),
        }
    }

    /// Number of stored leads.
    pub async fn count(&self) -> Result<u64, StoreError> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(*) FROM leads", ())
            .await
            .map_err(|e| StoreError::Query(format!("count_leads: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let count: i64 = row
                    .get(0)
                    .map_err(|e| StoreError::Query(format!("count_leads: {e}")))?;
                Ok(count as u64)
            }
            Ok(None) => Ok(0),
            Err(e) => Err(StoreError::Query(format!("count_leads: {e}"))),
        }
    }
}

/// A persisted lead with its storage-assigned metadata.
#[derive(Debug, Clone)]
pub struct StoredLead {
    pub id: String,
    pub record: LeadRecord,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
impl LeadStore for LibSqlLeadStore {
    async fn save(&self, record: &LeadRecord) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now().to_rfc3339();

        self.conn
            .execute(
                "INSERT INTO leads (id, task, plan, budget, timeline,
                                    tech_preferences, contact, user_contact, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    id.clone(),
                    record.task.clone(),
                    record.plan.clone(),
                    record.budget.clone(),
                    record.timeline.clone(),
                    record.tech_preferences.clone(),
                    record.contact.clone(),
                    record.user_contact.clone(),
                    created_at
                ],
            )
            .await
            .map_err(|e| StoreError::Query(format!("insert_lead: {e}")))?;

        debug!(lead_id = %id, "Lead inserted into DB");
        Ok(id)
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Map a libsql Row to a StoredLead.
///
/// Column order matches the SELECT in `get`:
/// 0:id, 1:task, 2:plan, 3:budget, 4:timeline, 5:tech_preferences,
/// 6:contact, 7:user_contact, 8:created_at
fn row_to_lead(row: &libsql::Row) -> Result<StoredLead, libsql::Error> {
    let id: String = row.get(0)?;
    let created_str: String = row.get(8)?;

    Ok(StoredLead {
        id,
        record: LeadRecord {
            task: row.get(1)?,
            plan: row.get(2)?,
            budget: row.get(3)?,
            timeline: row.get(4)?,
            tech_preferences: row.get(5)?,
            contact: row.get(6)?,
            user_contact: row.get(7)?,
        },
        created_at: parse_datetime(&created_str),
    })
}

/// Parse an RFC 3339 timestamp; malformed input falls back to the epoch.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

// ── Tests ───────────────────────────────────────────────────────────
