//! Per-respondent session state and the in-memory session store.

use std::collections::HashMap;

use tokio::sync::RwLock;

/// Mutable progress of one respondent through the catalog.
#[derive(Debug, Clone)]
pub struct Session {
    /// Stable identity of the respondent (the chat id on Telegram).
    pub respondent: String,
    /// Index of the question currently awaiting an answer.
    pub cursor: usize,
    /// Collected answers keyed by catalog field key.
    pub answers: HashMap<String, String>,
}

impl Session {
    fn new(respondent: &str) -> Self {
        Self {
            respondent: respondent.to_string(),
            cursor: 0,
            answers: HashMap::new(),
        }
    }
}

/// In-memory map of active sessions keyed by respondent identity.
///
/// Sessions are not durable; they live until finalization removes them
/// or the process exits. A respondent has at most one session.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh session at cursor zero, replacing any prior
    /// session for the same respondent. Nothing carries over.
    pub async fn begin(&self, respondent: &str) -> Session {
        let session = Session::new(respondent);
        self.sessions
            .write()
            .await
            .insert(respondent.to_string(), session.clone());
        session
    }

    /// Snapshot of the respondent's session, if one is active.
    pub async fn get(&self, respondent: &str) -> Option<Session> {
        self.sessions.read().await.get(respondent).cloned()
    }

    /// Record an answer on the active session. No-op when the
    /// respondent has no session; callers check existence first.
    pub async fn record_answer(&self, respondent: &str, field_key: &str, value: String) {
        if let Some(session) = self.sessions.write().await.get_mut(respondent) {
            session.answers.insert(field_key.to_string(), value);
        }
    }

    /// Advance the cursor by one and return its new value, or `None`
    /// when the respondent has no session.
    pub async fn advance(&self, respondent: &str) -> Option<usize> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(respondent)?;
        session.cursor += 1;
        Some(session.cursor)
    }

    /// Remove the session and hand it to the caller. Finalization takes
    /// ownership this way, so no store entry outlives the pipeline.
    pub async fn remove(&self, respondent: &str) -> Option<Session> {
        self.sessions.write().await.remove(respondent)
    }

    /// Number of active sessions.
    pub async fn active(&self) -> usize {
        self.sessions.read().await.len()
    }
}
