// Approval domain models - button actions, their wire encoding and the
// user-facing texts the protocol produces.

/// A moderator's decision, as carried by a button press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalAction {
    /// Publish to every configured destination channel.
    ApproveAll { message_id: i64 },
    /// Publish to exactly one destination channel.
    ApproveOne { message_id: i64, channel: String },
    /// Drop the post without publishing.
    Reject { message_id: i64 },
}

const APPROVE_ALL_PREFIX: &str = "approve_all_";
const APPROVE_PREFIX: &str = "approve_";
const REJECT_PREFIX: &str = "reject_";

impl ApprovalAction {
    /// Compact callback-data encoding. Kept under Telegram's 64-byte limit
    /// as long as channel identifiers stay reasonable.
    pub fn to_callback_data(&self) -> String {
        match self {
            ApprovalAction::ApproveAll { message_id } => {
                format!("{}{}", APPROVE_ALL_PREFIX, message_id)
            }
            ApprovalAction::ApproveOne {
                message_id,
                channel,
            } => format!("{}{}_{}", APPROVE_PREFIX, message_id, channel),
            ApprovalAction::Reject { message_id } => format!("{}{}", REJECT_PREFIX, message_id),
        }
    }

    /// Parse callback data. The action prefix is stripped first so channel
    /// names containing the delimiter survive, and the approve-all variant's
    /// different field count is tolerated.
    pub fn parse(data: &str) -> Option<Self> {
        if let Some(rest) = data.strip_prefix(APPROVE_ALL_PREFIX) {
            let message_id = rest.parse().ok()?;
            return Some(ApprovalAction::ApproveAll { message_id });
        }
        if let Some(rest) = data.strip_prefix(APPROVE_PREFIX) {
            let (id, channel) = rest.split_once('_')?;
            let message_id = id.parse().ok()?;
            if channel.is_empty() {
                return None;
            }
            return Some(ApprovalAction::ApproveOne {
                message_id,
                channel: channel.to_string(),
            });
        }
        if let Some(rest) = data.strip_prefix(REJECT_PREFIX) {
            let message_id = rest.parse().ok()?;
            return Some(ApprovalAction::Reject { message_id });
        }
        None
    }

    pub fn message_id(&self) -> i64 {
        match self {
            ApprovalAction::ApproveAll { message_id }
            | ApprovalAction::ApproveOne { message_id, .. }
            | ApprovalAction::Reject { message_id } => *message_id,
        }
    }
}

/// Per-channel result of an approve-all run, in configured channel order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<String>,
}

impl PublishReport {
    pub fn any_succeeded(&self) -> bool {
        !self.succeeded.is_empty()
    }

    /// One composite message enumerating successes and failures. Every
    /// approver's notification is edited to exactly this text.
    pub fn render(&self, kind_label: &str) -> String {
        let mut out = format!("✅ {} published to channels:\n", capitalize(kind_label));
        if self.succeeded.is_empty() {
            out.push_str("❌ Could not publish to any channel");
        } else {
            out.push_str(&bullet_list(&self.succeeded));
        }
        if !self.failed.is_empty() {
            out.push_str("\n\n❌ Failed to publish to channels:\n");
            out.push_str(&bullet_list(&self.failed));
        }
        out
    }
}

/// What the acting approver sees when their button press is answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalOutcome {
    pub response: String,
    pub show_alert: bool,
}

impl ApprovalOutcome {
    pub fn ack(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            show_alert: false,
        }
    }

    pub fn alert(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            show_alert: true,
        }
    }

    pub fn denied() -> Self {
        Self::alert("You are not allowed to perform this action")
    }

    pub fn stale() -> Self {
        Self::alert("This post is no longer available")
    }
}

pub fn single_success_text(kind_label: &str, channel: &str) -> String {
    format!(
        "✅ {} successfully published to channel {}",
        capitalize(kind_label),
        channel
    )
}

pub fn rejected_text(kind_label: &str) -> String {
    format!("❌ {} was rejected", capitalize(kind_label))
}

/// Headline of the buttons message each approver receives.
pub fn notification_text(kind_label: &str) -> String {
    format!("⬆️ New {} for review\nChoose an action:", kind_label)
}

/// `/start` reply. Approvers additionally see the destination list.
pub fn greeting_text(is_approver: bool, target_channels: &[String]) -> String {
    if is_approver {
        format!(
            "Hi! I am the post moderation bot. You are an approver.\n\n\
             Destination channels for publishing:\n{}",
            bullet_list(target_channels)
        )
    } else {
        "Hi! I am the post moderation bot.".to_string()
    }
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("• {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_data_round_trips() {
        let actions = vec![
            ApprovalAction::ApproveAll { message_id: 42 },
            ApprovalAction::ApproveOne {
                message_id: 42,
                channel: "@news".to_string(),
            },
            ApprovalAction::Reject { message_id: 42 },
        ];
        for action in actions {
            let data = action.to_callback_data();
            assert_eq!(ApprovalAction::parse(&data), Some(action));
        }
    }

    #[test]
    fn approve_all_is_not_mistaken_for_approve_one() {
        // "approve_all_42" must not parse as channel "42" of message "all".
        assert_eq!(
            ApprovalAction::parse("approve_all_42"),
            Some(ApprovalAction::ApproveAll { message_id: 42 })
        );
    }

    #[test]
    fn channel_names_with_delimiters_survive() {
        let parsed = ApprovalAction::parse("approve_7_@my_channel_name").unwrap();
        assert_eq!(
            parsed,
            ApprovalAction::ApproveOne {
                message_id: 7,
                channel: "@my_channel_name".to_string(),
            }
        );
    }

    #[test]
    fn garbage_callback_data_is_rejected() {
        assert_eq!(ApprovalAction::parse(""), None);
        assert_eq!(ApprovalAction::parse("publish_5"), None);
        assert_eq!(ApprovalAction::parse("approve_notanid_@chan"), None);
        assert_eq!(ApprovalAction::parse("approve_5_"), None);
        assert_eq!(ApprovalAction::parse("reject_"), None);
    }

    #[test]
    fn report_lists_successes_and_failures_by_identifier() {
        let report = PublishReport {
            succeeded: vec!["@a".to_string()],
            failed: vec!["@b".to_string()],
        };
        let text = report.render("post");
        assert!(text.contains("✅ Post published to channels:"));
        assert!(text.contains("• @a"));
        assert!(text.contains("❌ Failed to publish to channels:"));
        assert!(text.contains("• @b"));
    }

    #[test]
    fn report_with_no_successes_says_so() {
        let report = PublishReport {
            succeeded: vec![],
            failed: vec!["@a".to_string(), "@b".to_string()],
        };
        let text = report.render("voice message");
        assert!(text.contains("❌ Could not publish to any channel"));
        assert!(text.starts_with("✅ Voice message published to channels:"));
    }

    #[test]
    fn greeting_shows_channels_only_to_approvers() {
        let channels = vec!["@a".to_string(), "@b".to_string()];
        let approver = greeting_text(true, &channels);
        assert!(approver.contains("• @a"));
        assert!(approver.contains("• @b"));

        let visitor = greeting_text(false, &channels);
        assert!(!visitor.contains("@a"));
    }
}
