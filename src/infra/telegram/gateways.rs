// Implementations of the core transport ports over the Bot API client.

use super::bot_api_client::TelegramApiClient;
use crate::core::approval::{GatewayError, ModerationGateway};
use crate::core::content::MediaKind;
use crate::core::queue::MessageRef;
use crate::core::relay::{DownloadedMedia, RelayError, RelayTransport};
use async_trait::async_trait;
use std::path::Path;
use tempfile::NamedTempFile;

/// Moderator-bot side: publishing, notification edits and direct messages.
pub struct TelegramModerationGateway {
    client: TelegramApiClient,
}

impl TelegramModerationGateway {
    pub fn new(client: TelegramApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ModerationGateway for TelegramModerationGateway {
    async fn publish(&self, origin: &MessageRef, channel: &str) -> Result<(), GatewayError> {
        self.client
            .copy_message(channel, origin.chat_id, origin.message_id)
            .await
            .map_err(|e| GatewayError::Api(e.to_string()))
    }

    async fn edit_notification(
        &self,
        notification: &MessageRef,
        text: &str,
    ) -> Result<(), GatewayError> {
        self.client
            .edit_message_text(notification.chat_id, notification.message_id, text)
            .await
            .map_err(|e| GatewayError::Api(e.to_string()))
    }

    async fn send_direct(&self, user_id: i64, text: &str) -> Result<(), GatewayError> {
        self.client
            .send_message(user_id, text)
            .await
            .map(|_| ())
            .map_err(|e| GatewayError::Api(e.to_string()))
    }
}

/// Relay-bot side: everything is aimed at the one moderation chat.
pub struct TelegramRelayTransport {
    client: TelegramApiClient,
    moderation_chat_id: i64,
}

impl TelegramRelayTransport {
    pub fn new(client: TelegramApiClient, moderation_chat_id: i64) -> Self {
        Self {
            client,
            moderation_chat_id,
        }
    }
}

#[async_trait]
impl RelayTransport for TelegramRelayTransport {
    async fn forward_to_moderation(
        &self,
        source_chat: i64,
        message_id: i64,
    ) -> Result<(), RelayError> {
        self.client
            .forward_message(self.moderation_chat_id, source_chat, message_id)
            .await
            .map(|_| ())
            .map_err(|e| RelayError::Transport(e.to_string()))
    }

    async fn download_payload(&self, file_id: &str) -> Result<DownloadedMedia, RelayError> {
        let file_path = self
            .client
            .get_file_path(file_id)
            .await
            .map_err(|e| RelayError::Download(e.to_string()))?;

        let temp = NamedTempFile::new().map_err(|e| RelayError::Download(e.to_string()))?;
        let temp_path = temp.into_temp_path();
        self.client
            .download_file(&file_path, &temp_path)
            .await
            .map_err(|e| RelayError::Download(e.to_string()))?;
        // The TempPath guard travels with the handle; the file is deleted
        // as soon as the relay drops it.
        Ok(DownloadedMedia::temp(temp_path))
    }

    async fn send_media(
        &self,
        kind: MediaKind,
        path: &Path,
        caption: Option<&str>,
    ) -> Result<(), RelayError> {
        self.client
            .send_media(self.moderation_chat_id, kind, path, caption)
            .await
            .map_err(|e| RelayError::Transport(e.to_string()))
    }

    async fn send_text(&self, text: &str) -> Result<(), RelayError> {
        self.client
            .send_message(self.moderation_chat_id, text)
            .await
            .map(|_| ())
            .map_err(|e| RelayError::Transport(e.to_string()))
    }
}
