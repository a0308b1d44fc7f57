//! The intake flow core — catalog, sessions, controller, finalization.

pub mod catalog;
pub mod controller;
mod finalize;
pub mod model;
pub mod session;

pub use catalog::{Catalog, QuestionSpec};
pub use controller::{FlowController, FlowDeps, SAVE_FAILED, THANK_YOU};
pub use model::{LeadRecord, field_keys};
pub use session::{Session, SessionStore};
