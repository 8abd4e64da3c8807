// The pending-post table. Process memory only - no persistence, no expiry.
//
// Events arrive one at a time per bot process, but the table uses DashMap
// so a parallelized dispatcher would still see consistent entries.

use super::queue_models::{ApproverTicket, PendingPost};
use dashmap::DashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("no pending post for message {0}")]
    Missing(i64),
}

/// In-memory table of posts awaiting an approve/reject decision.
#[derive(Debug, Default)]
pub struct PendingQueue {
    posts: DashMap<i64, PendingPost>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new pending post. A duplicate message id is treated as a
    /// duplicate ingest: logged, original entry kept, `false` returned.
    pub fn insert(&self, message_id: i64, post: PendingPost) -> bool {
        use dashmap::mapref::entry::Entry;
        match self.posts.entry(message_id) {
            Entry::Occupied(_) => {
                tracing::warn!(message_id, "duplicate ingest for pending post, ignoring");
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(post);
                true
            }
        }
    }

    /// Attach one approver's ticket. Requires a prior `insert`.
    pub fn attach_ticket(
        &self,
        message_id: i64,
        approver_id: i64,
        ticket: ApproverTicket,
    ) -> Result<(), QueueError> {
        let mut post = self
            .posts
            .get_mut(&message_id)
            .ok_or(QueueError::Missing(message_id))?;
        post.tickets.insert(approver_id, ticket);
        Ok(())
    }

    /// Absence is a normal outcome here (stale button press), not an error.
    pub fn lookup(&self, message_id: i64) -> Option<PendingPost> {
        self.posts.get(&message_id).map(|post| post.clone())
    }

    /// Idempotent removal once a terminal decision is reached.
    pub fn remove(&self, message_id: i64) {
        self.posts.remove(&message_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::content::ContentItem;
    use crate::core::queue::queue_models::MessageRef;

    fn post() -> PendingPost {
        PendingPost::new(
            MessageRef {
                chat_id: 10,
                message_id: 1,
            },
            ContentItem::Text {
                body: "hi".to_string(),
            },
        )
    }

    fn ticket(approver_id: i64) -> ApproverTicket {
        ApproverTicket {
            forwarded: MessageRef {
                chat_id: approver_id,
                message_id: 100,
            },
            notification: MessageRef {
                chat_id: approver_id,
                message_id: 101,
            },
        }
    }

    #[test]
    fn insert_then_remove_leaves_lookup_absent() {
        let queue = PendingQueue::new();
        assert!(queue.insert(1, post()));
        assert!(queue.lookup(1).is_some());

        queue.remove(1);
        assert!(queue.lookup(1).is_none());
    }

    #[test]
    fn remove_on_absent_id_is_a_noop() {
        let queue = PendingQueue::new();
        queue.remove(404);
        queue.remove(404);
        assert!(queue.lookup(404).is_none());
    }

    #[test]
    fn duplicate_insert_keeps_original_entry() {
        let queue = PendingQueue::new();
        assert!(queue.insert(1, post()));
        queue.attach_ticket(1, 7, ticket(7)).unwrap();

        let mut duplicate = post();
        duplicate.tickets.clear();
        assert!(!queue.insert(1, duplicate));

        let kept = queue.lookup(1).unwrap();
        assert!(kept.tickets.contains_key(&7));
    }

    #[test]
    fn attach_ticket_requires_prior_insert() {
        let queue = PendingQueue::new();
        let err = queue.attach_ticket(1, 7, ticket(7)).unwrap_err();
        assert!(matches!(err, QueueError::Missing(1)));
    }

    #[test]
    fn tickets_accumulate_per_approver() {
        let queue = PendingQueue::new();
        queue.insert(1, post());
        queue.attach_ticket(1, 7, ticket(7)).unwrap();
        queue.attach_ticket(1, 8, ticket(8)).unwrap();

        let stored = queue.lookup(1).unwrap();
        assert_eq!(stored.tickets.len(), 2);
    }
}
