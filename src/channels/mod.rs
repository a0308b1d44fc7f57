//! Channel abstraction for message I/O.

pub mod telegram;

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::ChannelError;

pub use telegram::TelegramChannel;

/// An inbound event, already reduced to what the intake flow
/// understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowEvent {
    /// The respondent asked to (re)start the intake flow.
    SessionStart { respondent: String },
    /// The respondent picked one of the offered options.
    Selection { respondent: String, choice: String },
    /// The respondent sent free-form text.
    FreeText { respondent: String, text: String },
}

impl FlowEvent {
    /// Respondent identity carried by the event.
    pub fn respondent(&self) -> &str {
        match self {
            Self::SessionStart { respondent }
            | Self::Selection { respondent, .. }
            | Self::FreeText { respondent, .. } => respondent,
        }
    }
}

/// Stream of inbound flow events produced by a channel.
pub type EventStream = Pin<Box<dyn Stream<Item = FlowEvent> + Send>>;

/// A chat transport the intake flow runs over.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Channel name for logging.
    fn name(&self) -> &str;

    /// Start listening and return the inbound event stream.
    async fn start(&self) -> Result<EventStream, ChannelError>;

    /// Send a prompt to a respondent. Non-empty `options` render as a
    /// selection affordance; an empty list sends a plain message.
    async fn send_prompt(
        &self,
        respondent: &str,
        text: &str,
        options: &[String],
    ) -> Result<(), ChannelError>;

    /// Verify the channel can reach its backing service.
    async fn health_check(&self) -> Result<(), ChannelError>;

    /// Stop the channel.
    async fn shutdown(&self) -> Result<(), ChannelError>;
}
