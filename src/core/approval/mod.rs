// Core approval module - the moderation decision protocol.
// Following the same models/service split as the queue module.

pub mod approval_models;
pub mod approval_service;

pub use approval_models::*;
pub use approval_service::*;
