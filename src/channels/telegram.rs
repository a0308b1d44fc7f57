//! Telegram channel — long-polls the Bot API for updates.
//!
//! Native Rust Telegram Bot API implementation. Selection questions are
//! sent as inline keyboards; choices come back as callback queries whose
//! `data` carries the chosen option text verbatim.

use async_trait::async_trait;

use crate::channels::{Channel, EventStream, FlowEvent};
use crate::error::ChannelError;

/// Long-poll wait passed to getUpdates, in seconds.
const POLL_TIMEOUT_SECS: u64 = 30;

/// Telegram channel — connects to the Bot API via long-polling.
pub struct TelegramChannel {
    bot_token: String,
    client: reqwest::Client,
}

impl TelegramChannel {
    pub fn new(bot_token: String) -> Self {
        Self {
            bot_token,
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{method}", self.bot_token)
    }
}

// ── Channel trait implementation ────────────────────────────────────

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self) -> Result<EventStream, ChannelError> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let bot_token = self.bot_token.clone();
        let client = self.client.clone();

        tokio::spawn(async move {
            let mut offset: i64 = 0;

            tracing::info!("Telegram channel listening for updates...");

            loop {
                let url = format!("https://api.telegram.org/bot{bot_token}/getUpdates");
                let body = serde_json::json!({
                    "offset": offset,
                    "timeout": POLL_TIMEOUT_SECS,
                    "allowed_updates": ["message", "callback_query"]
                });

                let resp = match client.post(&url).json(&body).send().await {
                    Ok(r) => r,
                    Err(e) => {
                        tracing::warn!("Telegram poll error: {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                        continue;
                    }
                };

                let data: serde_json::Value = match resp.json().await {
                    Ok(d) => d,
                    Err(e) => {
                        tracing::warn!("Telegram parse error: {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                        continue;
                    }
                };

                if let Some(results) = data.get("result").and_then(serde_json::Value::as_array) {
                    for update in results {
                        // Advance offset past this update
                        if let Some(uid) =
                            update.get("update_id").and_then(serde_json::Value::as_i64)
                        {
                            offset = uid + 1;
                        }

                        // Stop the client-side spinner on button presses
                        if let Some(callback_id) = update
                            .get("callback_query")
                            .and_then(|c| c.get("id"))
                            .and_then(serde_json::Value::as_str)
                        {
                            answer_callback_query(&client, &bot_token, callback_id).await;
                        }

                        let Some(event) = parse_update(update) else {
                            continue;
                        };

                        if tx.send(event).is_err() {
                            tracing::info!("Telegram listener channel closed");
                            return;
                        }
                    }
                }
            }
        });

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        });

        Ok(Box::pin(stream))
    }

    async fn send_prompt(
        &self,
        respondent: &str,
        text: &str,
        options: &[String],
    ) -> Result<(), ChannelError> {
        let body = build_prompt_body(respondent, text, options);

        let resp = self
            .client
            .post(self.api_url("sendMessage"))
            .json(&body)
            .send()
            .await
            .map_err(|e| ChannelError::SendFailed {
                name: "telegram".into(),
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let err = resp.text().await.unwrap_or_default();
            return Err(ChannelError::SendFailed {
                name: "telegram".into(),
                reason: format!("sendMessage returned {status}: {err}"),
            });
        }

        Ok(())
    }

    async fn health_check(&self) -> Result<(), ChannelError> {
        let resp = self
            .client
            .get(self.api_url("getMe"))
            .send()
            .await
            .map_err(|e| ChannelError::StartupFailed {
                name: "telegram".into(),
                reason: e.to_string(),
            })?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ChannelError::StartupFailed {
                name: "telegram".into(),
                reason: format!("getMe returned {}", resp.status()),
            })
        }
    }

    async fn shutdown(&self) -> Result<(), ChannelError> {
        tracing::info!("Telegram channel shutting down");
        Ok(())
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Build the sendMessage body for a prompt.
///
/// Options become a single row of inline buttons whose callback data is
/// the option text itself, so the selection comes back verbatim.
fn build_prompt_body(chat_id: &str, text: &str, options: &[String]) -> serde_json::Value {
    if options.is_empty() {
        return serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });
    }

    let buttons: Vec<serde_json::Value> = options
        .iter()
        .map(|option| serde_json::json!({ "text": option, "callback_data": option }))
        .collect();

    serde_json::json!({
        "chat_id": chat_id,
        "text": text,
        "reply_markup": { "inline_keyboard": [buttons] }
    })
}

/// Map a raw getUpdates entry to a flow event.
///
/// Callback queries carry the chosen option in `data`; a `/start`
/// message opens a session; any other text message is free text.
/// Updates without a usable chat id or text are dropped.
fn parse_update(update: &serde_json::Value) -> Option<FlowEvent> {
    if let Some(callback) = update.get("callback_query") {
        let choice = callback
            .get("data")
            .and_then(serde_json::Value::as_str)?
            .to_string();
        let respondent = callback
            .get("message")
            .and_then(|m| m.get("chat"))
            .and_then(|c| c.get("id"))
            .and_then(serde_json::Value::as_i64)?
            .to_string();
        return Some(FlowEvent::Selection { respondent, choice });
    }

    let message = update.get("message")?;
    let text = message.get("text").and_then(serde_json::Value::as_str)?;
    let respondent = message
        .get("chat")
        .and_then(|c| c.get("id"))
        .and_then(serde_json::Value::as_i64)?
        .to_string();

    if is_start_command(text) {
        return Some(FlowEvent::SessionStart { respondent });
    }

    Some(FlowEvent::FreeText {
        respondent,
        text: text.to_string(),
    })
}

/// Whether a message text is the /start command, with or without a bot
/// mention or deep-link payload.
fn is_start_command(text: &str) -> bool {
    let first = text.trim().split_whitespace().next().unwrap_or_default();
    let command = first.split('@').next().unwrap_or(first);
    command == "/start"
}

/// Acknowledge a callback query so the Telegram client stops showing a
/// loading state. Best effort; failures never reach the flow.
async fn answer_callback_query(client: &reqwest::Client, bot_token: &str, callback_id: &str) {
    let url = format!("https://api.telegram.org/bot{bot_token}/answerCallbackQuery");
    let body = serde_json::json!({ "callback_query_id": callback_id });

    match client.post(&url).json(&body).send().await {
        Ok(resp) if !resp.status().is_success() => {
            tracing::debug!(status = ?resp.status(), "answerCallbackQuery rejected");
        }
        Ok(_) => {}
        Err(e) => tracing::debug!("answerCallbackQuery failed: {e}"),
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Basic channel tests ─────────────────────────────────────────

    #[test]
    fn telegram_channel_name() {
        let ch = TelegramChannel::new("fake-token".into());
        assert_eq!(ch.name(), "telegram");
    }

    #[test]
    fn telegram_api_url() {
        let ch = TelegramChannel::new("123:ABC".into());
        assert_eq!(
            ch.api_url("getMe"),
            "https://api.telegram.org/bot123:ABC/getMe"
        );
    }

    #[test]
    fn health_check_error_keeps_name_and_reason_separate() {
        // The shape health_check produces on a rejected getMe: the
        // channel name stays bare, the status goes in the reason.
        let err = ChannelError::StartupFailed {
            name: "telegram".into(),
            reason: "getMe returned 401 Unauthorized".into(),
        };
        assert_eq!(
            err.to_string(),
            "Channel telegram failed to start: getMe returned 401 Unauthorized"
        );
    }

    // ── Start command tests ─────────────────────────────────────────

    #[test]
    fn start_command_plain() {
        assert!(is_start_command("/start"));
    }

    #[test]
    fn start_command_with_bot_mention() {
        assert!(is_start_command("/start@LeadIntakeBot"));
    }

    #[test]
    fn start_command_with_deep_link_payload() {
        assert!(is_start_command("/start ref-landing-page"));
    }

    #[test]
    fn start_command_surrounding_whitespace() {
        assert!(is_start_command("  /start  "));
    }

    #[test]
    fn start_command_rejects_other_text() {
        assert!(!is_start_command("/started"));
        assert!(!is_start_command("start"));
        assert!(!is_start_command("hello /start"));
        assert!(!is_start_command(""));
    }

    // ── Update parsing tests ────────────────────────────────────────

    #[test]
    fn parse_update_callback_query_becomes_selection() {
        let update = serde_json::json!({
            "update_id": 10,
            "callback_query": {
                "id": "cb-1",
                "data": "Website development",
                "message": { "chat": { "id": 99887766 } }
            }
        });

        let event = parse_update(&update).unwrap();
        assert_eq!(
            event,
            FlowEvent::Selection {
                respondent: "99887766".into(),
                choice: "Website development".into(),
            }
        );
    }

    #[test]
    fn parse_update_start_message_opens_session() {
        let update = serde_json::json!({
            "update_id": 11,
            "message": { "chat": { "id": 42 }, "text": "/start" }
        });

        let event = parse_update(&update).unwrap();
        assert_eq!(event, FlowEvent::SessionStart { respondent: "42".into() });
    }

    #[test]
    fn parse_update_plain_text_becomes_free_text() {
        let update = serde_json::json!({
            "update_id": 12,
            "message": { "chat": { "id": 42 }, "text": "+380 12 345 6789" }
        });

        let event = parse_update(&update).unwrap();
        assert_eq!(
            event,
            FlowEvent::FreeText {
                respondent: "42".into(),
                text: "+380 12 345 6789".into(),
            }
        );
    }

    #[test]
    fn parse_update_non_text_message_is_dropped() {
        let update = serde_json::json!({
            "update_id": 13,
            "message": { "chat": { "id": 42 }, "sticker": { "file_id": "abc" } }
        });

        assert!(parse_update(&update).is_none());
    }

    #[test]
    fn parse_update_callback_without_data_is_dropped() {
        let update = serde_json::json!({
            "update_id": 14,
            "callback_query": {
                "id": "cb-2",
                "message": { "chat": { "id": 42 } }
            }
        });

        assert!(parse_update(&update).is_none());
    }

    #[test]
    fn parse_update_callback_without_origin_chat_is_dropped() {
        let update = serde_json::json!({
            "update_id": 15,
            "callback_query": { "id": "cb-3", "data": "Yes" }
        });

        assert!(parse_update(&update).is_none());
    }

    #[test]
    fn parse_update_without_chat_id_is_dropped() {
        let update = serde_json::json!({
            "update_id": 16,
            "message": { "text": "hello" }
        });

        assert!(parse_update(&update).is_none());
    }

    // ── Prompt body tests ───────────────────────────────────────────

    #[test]
    fn prompt_body_without_options_is_plain_message() {
        let body = build_prompt_body("42", "Thanks!", &[]);

        assert_eq!(body["chat_id"], "42");
        assert_eq!(body["text"], "Thanks!");
        assert!(body.get("reply_markup").is_none());
    }

    #[test]
    fn prompt_body_with_options_builds_single_row_keyboard() {
        let options = vec!["Yes".to_string(), "No".to_string(), "Maybe".to_string()];
        let body = build_prompt_body("42", "Can we contact you?", &options);

        let rows = body["reply_markup"]["inline_keyboard"].as_array().unwrap();
        assert_eq!(rows.len(), 1);

        let buttons = rows[0].as_array().unwrap();
        assert_eq!(buttons.len(), 3);
        for (button, option) in buttons.iter().zip(&options) {
            assert_eq!(button["text"], option.as_str());
            assert_eq!(button["callback_data"], option.as_str());
        }
    }
}
