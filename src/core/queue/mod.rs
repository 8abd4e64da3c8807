// Core queue module - the in-memory moderation table.
// Following the same models/service split as the approval module.

pub mod queue_models;
pub mod queue_service;

pub use queue_models::*;
pub use queue_service::*;
