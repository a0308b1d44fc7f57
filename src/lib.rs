//! Lead Intake — conversational lead qualification bot.

pub mod channels;
pub mod config;
pub mod error;
pub mod flow;
pub mod notify;
pub mod store;
