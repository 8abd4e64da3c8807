// Approval protocol - core business logic for resolving pending posts.
//
// The service interprets a button press, publishes the original post to one
// or all destination channels, rewrites every approver's notification to the
// outcome and retires the queue entry once a terminal state is reached.
//
// NO Telegram dependencies here - just pure domain logic over a gateway port.

use super::approval_models::{
    rejected_text, single_success_text, ApprovalAction, ApprovalOutcome, PublishReport,
};
use crate::core::queue::{MessageRef, PendingPost, PendingQueue};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("telegram api error: {0}")]
    Api(String),
}

/// Transport operations the protocol needs.
///
/// Following the same port pattern as RelayTransport in relay.
#[async_trait]
pub trait ModerationGateway: Send + Sync {
    /// Copy the original post into a destination channel.
    async fn publish(&self, origin: &MessageRef, channel: &str) -> Result<(), GatewayError>;

    /// Rewrite one approver's notification message.
    async fn edit_notification(
        &self,
        notification: &MessageRef,
        text: &str,
    ) -> Result<(), GatewayError>;

    /// Direct-message a user (used to surface publish errors to the actor).
    async fn send_direct(&self, user_id: i64, text: &str) -> Result<(), GatewayError>;
}

/// The moderation decision state machine. A pending post is either in the
/// queue (pending) or gone (resolved); nothing else is persisted.
pub struct ApprovalService<G: ModerationGateway> {
    gateway: G,
    approver_ids: Vec<i64>,
    target_channels: Vec<String>,
    queue: Arc<PendingQueue>,
}

impl<G: ModerationGateway> ApprovalService<G> {
    pub fn new(
        gateway: G,
        approver_ids: Vec<i64>,
        target_channels: Vec<String>,
        queue: Arc<PendingQueue>,
    ) -> Self {
        Self {
            gateway,
            approver_ids,
            target_channels,
            queue,
        }
    }

    /// Handle one button press. Never returns an error: every failure mode
    /// maps to an outcome the actor can see.
    pub async fn handle_action(&self, actor_id: i64, action: ApprovalAction) -> ApprovalOutcome {
        if !self.approver_ids.contains(&actor_id) {
            tracing::warn!(actor_id, "action from non-approver denied");
            return ApprovalOutcome::denied();
        }

        let message_id = action.message_id();
        let post = match self.queue.lookup(message_id) {
            Some(post) => post,
            None => {
                tracing::info!(message_id, "action on a post no longer in the queue");
                return ApprovalOutcome::stale();
            }
        };

        match action {
            ApprovalAction::ApproveAll { .. } => self.approve_all(message_id, &post).await,
            ApprovalAction::ApproveOne { channel, .. } => {
                self.approve_one(actor_id, message_id, &post, &channel).await
            }
            ApprovalAction::Reject { .. } => self.reject(message_id, &post).await,
        }
    }

    /// Publish to every configured channel in list order. Partial failure is
    /// reported, not treated as all-or-nothing; the entry is removed iff at
    /// least one channel succeeded, so a total failure can be retried.
    async fn approve_all(&self, message_id: i64, post: &PendingPost) -> ApprovalOutcome {
        let kind = post.item.kind_label();
        let mut report = PublishReport::default();

        for channel in &self.target_channels {
            let channel = channel.trim();
            if channel.is_empty() {
                continue;
            }
            match self.gateway.publish(&post.origin, channel).await {
                Ok(()) => {
                    tracing::info!(channel, kind, "published to channel");
                    report.succeeded.push(channel.to_string());
                }
                Err(err) => {
                    tracing::error!(channel, kind, error = %err, "failed to publish to channel");
                    report.failed.push(channel.to_string());
                }
            }
        }

        self.edit_all_notifications(post, &report.render(kind)).await;

        if report.any_succeeded() {
            self.queue.remove(message_id);
        }

        ApprovalOutcome::ack("Publishing to all channels finished")
    }

    /// Publish to exactly one channel. On failure the entry stays pending
    /// and the actor gets a direct error message naming the channel.
    async fn approve_one(
        &self,
        actor_id: i64,
        message_id: i64,
        post: &PendingPost,
        channel: &str,
    ) -> ApprovalOutcome {
        let kind = post.item.kind_label();
        match self.gateway.publish(&post.origin, channel).await {
            Ok(()) => {
                tracing::info!(channel, kind, "published to channel");
                let text = single_success_text(kind, channel);
                self.edit_all_notifications(post, &text).await;
                self.queue.remove(message_id);
                ApprovalOutcome::alert(text)
            }
            Err(err) => {
                tracing::error!(channel, kind, error = %err, "failed to publish to channel");
                let detail = format!("Failed to publish to channel {}: {}", channel, err);
                if let Err(dm_err) = self.gateway.send_direct(actor_id, &detail).await {
                    tracing::error!(actor_id, error = %dm_err, "failed to notify actor of publish error");
                }
                ApprovalOutcome::alert("An error occurred during publishing")
            }
        }
    }

    async fn reject(&self, message_id: i64, post: &PendingPost) -> ApprovalOutcome {
        let kind = post.item.kind_label();
        let text = rejected_text(kind);
        self.edit_all_notifications(post, &text).await;
        self.queue.remove(message_id);
        ApprovalOutcome::alert(text)
    }

    /// Rewrite every approver's notification. A single failed edit (message
    /// deleted, chat blocked) is logged and must not block the siblings.
    async fn edit_all_notifications(&self, post: &PendingPost, text: &str) {
        for (approver_id, ticket) in &post.tickets {
            if let Err(err) = self
                .gateway
                .edit_notification(&ticket.notification, text)
                .await
            {
                tracing::error!(approver_id, error = %err, "failed to update approver notification");
            }
        }
    }
}
