// Moderation queue models - what we remember about a post awaiting a decision.

use crate::core::content::ContentItem;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// A (chat, message) pair - enough to forward, copy or edit a message later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    pub chat_id: i64,
    pub message_id: i64,
}

/// Per-approver bookkeeping: their forwarded copy of the post and the
/// notification message whose text tracks the protocol's progress.
/// Never re-created once the pending post exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApproverTicket {
    pub forwarded: MessageRef,
    pub notification: MessageRef,
}

/// A post sitting in the moderation queue. Keyed externally by the message
/// id the relay's post received in the moderation chat. Lives until a
/// terminal decision; a process restart loses it by design.
#[derive(Debug, Clone)]
pub struct PendingPost {
    /// The relay's message in the moderation chat - publishing copies this.
    pub origin: MessageRef,
    pub item: ContentItem,
    /// Approver id -> their ticket.
    pub tickets: HashMap<i64, ApproverTicket>,
    pub created_at: DateTime<Utc>,
}

impl PendingPost {
    pub fn new(origin: MessageRef, item: ContentItem) -> Self {
        Self {
            origin,
            item,
            tickets: HashMap::new(),
            created_at: Utc::now(),
        }
    }
}
