// Telegram layer - update handlers and keyboard/message construction.

pub mod content_mapping;
pub mod moderator_handlers;
pub mod polling;
pub mod relay_handlers;
