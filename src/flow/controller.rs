//! Flow controller — drives each respondent's traversal of the catalog.
//!
//! Inbound events are handled to completion in arrival order. Events for
//! respondents with no session, and answers arriving in the wrong
//! modality, are ignored without touching any state. Accepted answers
//! advance the cursor; the terminal answer hands the session to the
//! finalization pipeline.

use std::sync::Arc;

use futures::StreamExt;

use crate::channels::{Channel, FlowEvent};
use crate::config::FlowConfig;
use crate::error::Error;
use crate::flow::catalog::Catalog;
use crate::flow::session::SessionStore;
use crate::notify::Notifier;
use crate::store::LeadStore;

/// Acknowledgment sent when the final answer is recorded.
pub const THANK_YOU: &str = "Thanks for the information! We will be in touch shortly.";

/// Sent when the completed record could not be saved.
pub const SAVE_FAILED: &str =
    "Sorry, something went wrong while saving your answers. Please try again later.";

/// External collaborators of the flow.
pub struct FlowDeps {
    pub channel: Arc<dyn Channel>,
    pub leads: Arc<dyn LeadStore>,
    /// Optional; when absent, saved leads are not reported anywhere.
    pub notifier: Option<Arc<dyn Notifier>>,
}

/// The per-respondent intake state machine.
pub struct FlowController {
    pub(crate) catalog: Catalog,
    pub(crate) sessions: SessionStore,
    pub(crate) deps: FlowDeps,
    pub(crate) config: FlowConfig,
}

impl FlowController {
    pub fn new(catalog: Catalog, deps: FlowDeps, config: FlowConfig) -> Self {
        Self {
            catalog,
            sessions: SessionStore::new(),
            deps,
            config,
        }
    }

    /// Active sessions, exposed for inspection.
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    // ── Main loop ───────────────────────────────────────────────────

    /// Run the controller against the channel's event stream until the
    /// stream ends or Ctrl+C is received.
    pub async fn run(self) -> Result<(), Error> {
        let mut events = self.deps.channel.start().await?;

        tracing::info!(
            channel = self.deps.channel.name(),
            questions = self.catalog.len(),
            "Intake flow ready and listening"
        );

        loop {
            let event = tokio::select! {
                biased;
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received, shutting down...");
                    break;
                }
                event = events.next() => {
                    match event {
                        Some(e) => e,
                        None => {
                            tracing::info!("Event stream ended, shutting down...");
                            break;
                        }
                    }
                }
            };

            self.handle_event(event).await;
        }

        self.deps.channel.shutdown().await?;

        Ok(())
    }

    // ── Event dispatch ──────────────────────────────────────────────

    /// Handle one inbound event to completion.
    pub async fn handle_event(&self, event: FlowEvent) {
        tracing::debug!(respondent = event.respondent(), "Inbound event");

        match event {
            FlowEvent::SessionStart { respondent } => self.start(&respondent).await,
            FlowEvent::Selection { respondent, choice } => {
                self.handle_selection(&respondent, choice).await
            }
            FlowEvent::FreeText { respondent, text } => {
                self.handle_free_text(&respondent, text).await
            }
        }
    }

    /// Open a fresh session and ask the first question.
    ///
    /// A repeated start discards the respondent's prior session
    /// entirely; no answers carry over.
    pub async fn start(&self, respondent: &str) {
        let session = self.sessions.begin(respondent).await;
        tracing::info!(respondent, "Intake flow started");
        self.ask(respondent, session.cursor).await;
    }

    /// Record a selected option and move the flow forward.
    ///
    /// The chosen text is recorded verbatim; membership in the offered
    /// options is not checked, matching the system this bot replaces.
    pub async fn handle_selection(&self, respondent: &str, choice: String) {
        let Some(session) = self.sessions.get(respondent).await else {
            tracing::debug!(respondent, "Selection without an active session; ignored");
            return;
        };
        let Some(question) = self.catalog.get(session.cursor) else {
            tracing::warn!(
                respondent,
                cursor = session.cursor,
                "Session cursor out of catalog range"
            );
            return;
        };
        if question.is_free_text() {
            tracing::debug!(
                respondent,
                cursor = session.cursor,
                "Selection while awaiting free text; ignored"
            );
            return;
        }

        self.sessions
            .record_answer(respondent, &question.field_key, choice)
            .await;

        if session.cursor < self.catalog.last_index() {
            if let Some(next) = self.sessions.advance(respondent).await {
                self.ask(respondent, next).await;
            }
        } else if let Some(completed) = self.sessions.remove(respondent).await {
            self.finalize(completed).await;
        }
    }

    /// Record a free-text answer for the terminal question.
    ///
    /// Free text is only accepted at the last catalog position; text
    /// sent while a selection is expected is ignored without side
    /// effects.
    pub async fn handle_free_text(&self, respondent: &str, text: String) {
        let Some(session) = self.sessions.get(respondent).await else {
            tracing::debug!(respondent, "Free text without an active session; ignored");
            return;
        };
        if session.cursor != self.catalog.last_index() {
            tracing::debug!(
                respondent,
                cursor = session.cursor,
                "Free text while awaiting a selection; ignored"
            );
            return;
        }
        let Some(question) = self.catalog.get(session.cursor) else {
            tracing::warn!(
                respondent,
                cursor = session.cursor,
                "Session cursor out of catalog range"
            );
            return;
        };

        self.sessions
            .record_answer(respondent, &question.field_key, text)
            .await;

        if let Some(completed) = self.sessions.remove(respondent).await {
            self.finalize(completed).await;
        }
    }

    /// Send the prompt for a catalog position.
    async fn ask(&self, respondent: &str, cursor: usize) {
        let Some(question) = self.catalog.get(cursor) else {
            tracing::warn!(respondent, cursor, "No question at cursor");
            return;
        };

        if let Err(e) = self
            .deps
            .channel
            .send_prompt(respondent, &question.prompt, &question.options)
            .await
        {
            tracing::warn!(respondent, error = %e, "Failed to send prompt");
        }
    }

    /// Send a plain message (no options) to the respondent.
    pub(crate) async fn send_text(&self, respondent: &str, text: &str) {
        if let Err(e) = self.deps.channel.send_prompt(respondent, text, &[]).await {
            tracing::warn!(respondent, error = %e, "Failed to send message");
        }
    }
}

// Note: FlowController behavior is covered end to end in
// tests/flow_integration.rs with recording stand-ins for the channel,
// the lead store, and the notifier. The catalog, session store, and
// record models carry their own unit tests.
