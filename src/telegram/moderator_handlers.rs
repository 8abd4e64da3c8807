// Moderator-bot update handling: /start, fan-out of relayed posts to every
// approver, and button presses routed into the approval service.

use super::content_mapping::extract_item;
use super::polling::UpdateHandler;
use crate::core::approval::{
    greeting_text, notification_text, ApprovalAction, ApprovalService, ModerationGateway,
};
use crate::core::queue::{ApproverTicket, MessageRef, PendingPost, PendingQueue};
use crate::infra::telegram::{
    CallbackQuery, InlineKeyboardButton, InlineKeyboardMarkup, Message, TelegramApiClient, Update,
};
use async_trait::async_trait;
use std::sync::Arc;

pub struct ModeratorHandler<G: ModerationGateway> {
    client: TelegramApiClient,
    approval: ApprovalService<G>,
    queue: Arc<PendingQueue>,
    approver_ids: Vec<i64>,
    target_channels: Vec<String>,
    /// Numeric identity of the counterpart relay process.
    relay_bot_id: i64,
}

impl<G: ModerationGateway> ModeratorHandler<G> {
    pub fn new(
        client: TelegramApiClient,
        approval: ApprovalService<G>,
        queue: Arc<PendingQueue>,
        approver_ids: Vec<i64>,
        target_channels: Vec<String>,
        relay_bot_id: i64,
    ) -> Self {
        Self {
            client,
            approval,
            queue,
            approver_ids,
            target_channels,
            relay_bot_id,
        }
    }

    async fn handle_message(&self, msg: &Message) {
        if let Some(text) = &msg.text {
            if text.trim().starts_with("/start") {
                self.handle_start(msg).await;
                return;
            }
        }

        match &msg.from {
            Some(user) if user.id == self.relay_bot_id => self.fan_out(msg).await,
            Some(user) => {
                tracing::info!(user_id = user.id, "message from non-relay sender, ignoring");
            }
            None => {}
        }
    }

    async fn handle_start(&self, msg: &Message) {
        let is_approver = msg
            .from
            .as_ref()
            .map(|user| self.approver_ids.contains(&user.id))
            .unwrap_or(false);
        let greeting = greeting_text(is_approver, &self.target_channels);
        if let Err(err) = self.client.send_message(msg.chat.id, &greeting).await {
            tracing::error!(chat_id = msg.chat.id, error = %err, "failed to send greeting");
        }
    }

    /// Queue a relayed post and notify every approver: forward them a copy,
    /// then send the buttons message threaded under it. One approver's
    /// failure never blocks the rest.
    async fn fan_out(&self, msg: &Message) {
        let Some(item) = extract_item(msg) else {
            tracing::warn!(message_id = msg.message_id, "unsupported relayed message type");
            return;
        };

        let origin = MessageRef {
            chat_id: msg.chat.id,
            message_id: msg.message_id,
        };
        let headline = notification_text(item.kind_label());

        if !self.queue.insert(msg.message_id, PendingPost::new(origin, item)) {
            return;
        }

        let keyboard = build_keyboard(msg.message_id, &self.target_channels);

        for approver_id in &self.approver_ids {
            match self
                .notify_approver(*approver_id, &origin, &headline, &keyboard)
                .await
            {
                Ok(ticket) => {
                    if let Err(err) = self.queue.attach_ticket(msg.message_id, *approver_id, ticket)
                    {
                        tracing::error!(approver_id, error = %err, "failed to record ticket");
                    }
                }
                Err(err) => {
                    tracing::error!(approver_id, error = %err, "failed to notify approver");
                }
            }
        }

        tracing::info!(
            message_id = msg.message_id,
            approvers = self.approver_ids.len(),
            "queued post for moderation"
        );
    }

    async fn notify_approver(
        &self,
        approver_id: i64,
        origin: &MessageRef,
        headline: &str,
        keyboard: &InlineKeyboardMarkup,
    ) -> anyhow::Result<ApproverTicket> {
        let forwarded = self
            .client
            .forward_message(approver_id, origin.chat_id, origin.message_id)
            .await?;
        let notification = self
            .client
            .send_notification(approver_id, headline, forwarded.message_id, keyboard)
            .await?;

        Ok(ApproverTicket {
            forwarded: MessageRef {
                chat_id: approver_id,
                message_id: forwarded.message_id,
            },
            notification: MessageRef {
                chat_id: approver_id,
                message_id: notification.message_id,
            },
        })
    }

    async fn handle_callback(&self, query: &CallbackQuery) {
        let outcome = match query.data.as_deref().and_then(ApprovalAction::parse) {
            Some(action) => self.approval.handle_action(query.from.id, action).await,
            None => {
                tracing::warn!(data = ?query.data, "unparseable callback data");
                crate::core::approval::ApprovalOutcome::alert(
                    "An error occurred while handling the action",
                )
            }
        };

        if let Err(err) = self
            .client
            .answer_callback_query(&query.id, &outcome.response, outcome.show_alert)
            .await
        {
            tracing::error!(query_id = %query.id, error = %err, "failed to answer callback query");
        }
    }
}

#[async_trait]
impl<G: ModerationGateway> UpdateHandler for ModeratorHandler<G> {
    async fn handle(&self, update: Update) -> anyhow::Result<()> {
        if let Some(msg) = &update.message {
            self.handle_message(msg).await;
        } else if let Some(query) = &update.callback_query {
            self.handle_callback(query).await;
        }
        Ok(())
    }
}

/// One row per action: publish-everywhere on top, one button per destination
/// channel, reject at the bottom.
fn build_keyboard(message_id: i64, target_channels: &[String]) -> InlineKeyboardMarkup {
    let mut rows = vec![vec![InlineKeyboardButton {
        text: "📢 Publish to all channels".to_string(),
        callback_data: ApprovalAction::ApproveAll { message_id }.to_callback_data(),
    }]];

    for channel in target_channels {
        let channel = channel.trim();
        if channel.is_empty() {
            continue;
        }
        rows.push(vec![InlineKeyboardButton {
            text: format!("Publish to {}", channel),
            callback_data: ApprovalAction::ApproveOne {
                message_id,
                channel: channel.to_string(),
            }
            .to_callback_data(),
        }]);
    }

    rows.push(vec![InlineKeyboardButton {
        text: "❌ Reject".to_string(),
        callback_data: ApprovalAction::Reject { message_id }.to_callback_data(),
    }]);

    InlineKeyboardMarkup {
        inline_keyboard: rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyboard_has_all_one_per_channel_and_reject() {
        let channels = vec!["@a".to_string(), " ".to_string(), "@b".to_string()];
        let keyboard = build_keyboard(42, &channels);

        assert_eq!(keyboard.inline_keyboard.len(), 4);
        assert_eq!(
            keyboard.inline_keyboard[0][0].callback_data,
            "approve_all_42"
        );
        assert_eq!(keyboard.inline_keyboard[1][0].callback_data, "approve_42_@a");
        assert_eq!(keyboard.inline_keyboard[2][0].callback_data, "approve_42_@b");
        assert_eq!(keyboard.inline_keyboard[3][0].callback_data, "reject_42");
    }

    #[test]
    fn keyboard_buttons_round_trip_through_the_action_parser() {
        let channels = vec!["@my_channel".to_string()];
        let keyboard = build_keyboard(7, &channels);

        for row in &keyboard.inline_keyboard {
            for button in row {
                assert!(
                    ApprovalAction::parse(&button.callback_data).is_some(),
                    "unparseable callback data: {}",
                    button.callback_data
                );
            }
        }
    }
}
