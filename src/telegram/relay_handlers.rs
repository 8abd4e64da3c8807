// Relay-bot update handling: watch the configured source channels and hand
// each post to the relay service. A failed item is logged and skipped; it
// never blocks the ones after it.

use super::content_mapping::{extract_item, extract_source, extract_tags};
use super::polling::UpdateHandler;
use crate::core::content::IngestedPost;
use crate::core::relay::{RelayService, RelayTransport};
use crate::infra::telegram::{Message, Update};
use async_trait::async_trait;

pub struct RelayHandler<T: RelayTransport> {
    relay: RelayService<T>,
    source_channel_ids: Vec<i64>,
}

impl<T: RelayTransport> RelayHandler<T> {
    pub fn new(relay: RelayService<T>, source_channel_ids: Vec<i64>) -> Self {
        Self {
            relay,
            source_channel_ids,
        }
    }

    fn is_watched(&self, msg: &Message) -> bool {
        self.source_channel_ids.contains(&msg.chat.id)
    }

    async fn handle_post(&self, msg: &Message) {
        if !self.is_watched(msg) {
            return;
        }

        let Some(item) = extract_item(msg) else {
            tracing::warn!(
                message_id = msg.message_id,
                chat_id = msg.chat.id,
                "unsupported message type, skipping"
            );
            return;
        };

        let post = IngestedPost {
            chat_id: msg.chat.id,
            message_id: msg.message_id,
            item,
            tags: extract_tags(msg),
            source: extract_source(msg),
        };

        if let Err(err) = self.relay.relay(&post).await {
            tracing::error!(
                message_id = post.message_id,
                source = %post.source,
                error = %err,
                "failed to relay post"
            );
        }
    }
}

#[async_trait]
impl<T: RelayTransport> UpdateHandler for RelayHandler<T> {
    async fn handle(&self, update: Update) -> anyhow::Result<()> {
        // Channel posts are the normal case; plain messages cover watched
        // groups used as sources.
        if let Some(post) = &update.channel_post {
            self.handle_post(post).await;
        } else if let Some(msg) = &update.message {
            self.handle_post(msg).await;
        }
        Ok(())
    }
}
