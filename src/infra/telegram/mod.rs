// Telegram infra module - Bot API wire types, the HTTP client and the
// implementations of the core transport ports.

pub mod api_types;
pub mod bot_api_client;
pub mod gateways;

pub use api_types::*;
pub use bot_api_client::TelegramApiClient;
pub use gateways::{TelegramModerationGateway, TelegramRelayTransport};
