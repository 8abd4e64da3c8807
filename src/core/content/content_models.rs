// Content domain models - the single abstraction over every post variant.
//
// These are pure domain types with no Telegram dependencies.
// The telegram layer converts Bot API messages into these.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Media payload variant. Parameterizes the one download/re-upload path
/// instead of six near-identical per-type branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    Photo,
    Video,
    Document,
    Voice,
    VideoNote,
}

/// A single piece of relayed content. Exactly one variant is populated.
///
/// Media variants hold the remote file handle assigned by the transport;
/// payload bytes are only materialized locally when a re-upload is needed.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentItem {
    Text {
        body: String,
    },
    Photo {
        file_id: String,
        caption: Option<String>,
    },
    Video {
        file_id: String,
        caption: Option<String>,
    },
    Document {
        file_id: String,
        caption: Option<String>,
    },
    Voice {
        file_id: String,
        caption: Option<String>,
    },
    /// Video notes cannot carry a caption on re-upload.
    VideoNote {
        file_id: String,
    },
}

impl ContentItem {
    /// The text a restriction policy should look at: the body for text
    /// posts, the caption for media posts.
    pub fn text(&self) -> Option<&str> {
        match self {
            ContentItem::Text { body } => Some(body),
            _ => self.caption(),
        }
    }

    pub fn caption(&self) -> Option<&str> {
        match self {
            ContentItem::Text { .. } | ContentItem::VideoNote { .. } => None,
            ContentItem::Photo { caption, .. }
            | ContentItem::Video { caption, .. }
            | ContentItem::Document { caption, .. }
            | ContentItem::Voice { caption, .. } => caption.as_deref(),
        }
    }

    /// Remote payload reference, if this variant carries one.
    pub fn media(&self) -> Option<(MediaKind, &str)> {
        match self {
            ContentItem::Text { .. } => None,
            ContentItem::Photo { file_id, .. } => Some((MediaKind::Photo, file_id)),
            ContentItem::Video { file_id, .. } => Some((MediaKind::Video, file_id)),
            ContentItem::Document { file_id, .. } => Some((MediaKind::Document, file_id)),
            ContentItem::Voice { file_id, .. } => Some((MediaKind::Voice, file_id)),
            ContentItem::VideoNote { file_id } => Some((MediaKind::VideoNote, file_id)),
        }
    }

    /// How this item is referred to in user-facing texts.
    pub fn kind_label(&self) -> &'static str {
        match self {
            ContentItem::Voice { .. } => "voice message",
            ContentItem::VideoNote { .. } => "video message",
            _ => "post",
        }
    }
}

/// Typed source attribution carried alongside a relayed item, replacing
/// the ad hoc metadata the transport cannot preserve across a re-upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub channel_id: i64,
    pub username: Option<String>,
    pub title: Option<String>,
}

impl fmt::Display for SourceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Channel ID: {}", self.channel_id)?;
        if let Some(username) = &self.username {
            write!(f, " (@{})", username)?;
        }
        if let Some(title) = &self.title {
            write!(f, " - {}", title)?;
        }
        Ok(())
    }
}

/// One post as it arrived from a watched source channel.
#[derive(Debug, Clone)]
pub struct IngestedPost {
    /// Chat the post arrived in (needed for forwarding by reference).
    pub chat_id: i64,
    /// Message id within that chat.
    pub message_id: i64,
    pub item: ContentItem,
    /// Hashtag/cashtag entity strings, extracted at ingestion.
    pub tags: Vec<String>,
    pub source: SourceInfo,
}
