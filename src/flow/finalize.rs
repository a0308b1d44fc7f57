//! Finalization pipeline — save the completed record, then report it.

use tokio::time::timeout;

use crate::flow::controller::{FlowController, SAVE_FAILED, THANK_YOU};
use crate::flow::model::LeadRecord;
use crate::flow::session::Session;

impl FlowController {
    /// Close out a completed session.
    ///
    /// The session is already removed from the store when this runs, so
    /// the respondent can restart immediately no matter how the
    /// pipeline ends. Order: acknowledge, save (bounded), report only
    /// after a successful save. A failed or timed-out save produces one
    /// apology and no operator report; a failed report is logged and
    /// never surfaced to the respondent.
    pub(crate) async fn finalize(&self, session: Session) {
        let respondent = session.respondent.as_str();
        tracing::info!(respondent, "Intake flow completed");

        self.send_text(respondent, THANK_YOU).await;

        let record = LeadRecord::from_answers(&session.answers);

        let saved = match timeout(self.config.op_timeout, self.deps.leads.save(&record)).await {
            Ok(Ok(lead_id)) => {
                tracing::info!(respondent, lead_id = %lead_id, "Lead saved");
                true
            }
            Ok(Err(e)) => {
                tracing::error!(respondent, error = %e, "Failed to save lead");
                false
            }
            Err(_) => {
                tracing::error!(
                    respondent,
                    timeout_secs = self.config.op_timeout.as_secs(),
                    "Lead save timed out"
                );
                false
            }
        };

        if !saved {
            self.send_text(respondent, SAVE_FAILED).await;
            return;
        }

        let Some(notifier) = &self.deps.notifier else {
            tracing::warn!(respondent, "No notifier configured; lead not reported");
            return;
        };

        match timeout(self.config.op_timeout, notifier.notify(&record)).await {
            Ok(Ok(())) => tracing::info!(respondent, "Operator notified"),
            Ok(Err(e)) => {
                tracing::warn!(respondent, error = %e, "Operator notification failed")
            }
            Err(_) => {
                tracing::warn!(
                    respondent,
                    timeout_secs = self.config.op_timeout.as_secs(),
                    "Operator notification timed out"
                )
            }
        }
    }
}
