// Translates Bot API messages into core content models.

use crate::core::content::{ContentItem, SourceInfo};
use crate::infra::telegram::Message;

/// Map a Bot API message onto the content abstraction. Returns `None` for
/// unsupported message types (polls, stickers, service messages, ...).
pub fn extract_item(msg: &Message) -> Option<ContentItem> {
    if let Some(text) = &msg.text {
        return Some(ContentItem::Text { body: text.clone() });
    }
    if let Some(photos) = &msg.photo {
        // Renditions are ordered smallest to largest; relay the largest.
        let largest = photos.last()?;
        return Some(ContentItem::Photo {
            file_id: largest.file_id.clone(),
            caption: msg.caption.clone(),
        });
    }
    if let Some(video) = &msg.video {
        return Some(ContentItem::Video {
            file_id: video.file_id.clone(),
            caption: msg.caption.clone(),
        });
    }
    if let Some(document) = &msg.document {
        return Some(ContentItem::Document {
            file_id: document.file_id.clone(),
            caption: msg.caption.clone(),
        });
    }
    if let Some(voice) = &msg.voice {
        return Some(ContentItem::Voice {
            file_id: voice.file_id.clone(),
            caption: msg.caption.clone(),
        });
    }
    if let Some(note) = &msg.video_note {
        return Some(ContentItem::VideoNote {
            file_id: note.file_id.clone(),
        });
    }
    None
}

/// Hashtag/cashtag entity strings from text and caption.
///
/// Entity offsets are in UTF-16 code units, so byte slicing would panic on
/// Cyrillic posts; decode through UTF-16 instead.
pub fn extract_tags(msg: &Message) -> Vec<String> {
    let mut tags = Vec::new();
    let sources = [
        (msg.text.as_deref(), msg.entities.as_deref()),
        (msg.caption.as_deref(), msg.caption_entities.as_deref()),
    ];
    for (text, entities) in sources {
        let (Some(text), Some(entities)) = (text, entities) else {
            continue;
        };
        for entity in entities {
            if entity.kind != "hashtag" && entity.kind != "cashtag" {
                continue;
            }
            if let Some(tag) = utf16_slice(text, entity.offset, entity.length) {
                tags.push(tag);
            }
        }
    }
    tags
}

pub fn extract_source(msg: &Message) -> SourceInfo {
    SourceInfo {
        channel_id: msg.chat.id,
        username: msg.chat.username.clone(),
        title: msg.chat.title.clone(),
    }
}

fn utf16_slice(text: &str, offset: usize, length: usize) -> Option<String> {
    let units: Vec<u16> = text.encode_utf16().collect();
    let end = offset.checked_add(length)?;
    if end > units.len() {
        return None;
    }
    Some(String::from_utf16_lossy(&units[offset..end]))
}
