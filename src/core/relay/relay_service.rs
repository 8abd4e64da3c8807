// Ingest relay - core business logic for mirroring source-channel posts
// into the moderation chat.
//
// Strategy per item: restricted content is re-materialized (download +
// re-upload + attribution line); everything else is forwarded natively,
// falling back to re-materialization when the transport refuses the forward.
//
// NO Telegram dependencies here - just pure domain logic over a port.

use crate::core::content::{IngestedPost, MediaKind};
use crate::core::restriction::RestrictionPolicy;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to download payload: {0}")]
    Download(String),
}

/// A payload downloaded to local disk for re-upload. The backing temp file
/// is deleted when this handle drops, on success and failure paths alike.
#[derive(Debug)]
pub struct DownloadedMedia {
    path: PathBuf,
    _guard: TempPath,
}

impl DownloadedMedia {
    pub fn temp(guard: TempPath) -> Self {
        Self {
            path: guard.to_path_buf(),
            _guard: guard,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Transport operations the relay needs, all directed at the single
/// moderation endpoint configured at startup.
#[async_trait]
pub trait RelayTransport: Send + Sync {
    /// Native forward by reference.
    async fn forward_to_moderation(
        &self,
        source_chat: i64,
        message_id: i64,
    ) -> Result<(), RelayError>;

    /// Fetch a remote payload into a local temp file.
    async fn download_payload(&self, file_id: &str) -> Result<DownloadedMedia, RelayError>;

    /// Re-upload a payload as a fresh item of the same variant.
    async fn send_media(
        &self,
        kind: MediaKind,
        path: &Path,
        caption: Option<&str>,
    ) -> Result<(), RelayError>;

    /// Plain text message (post bodies and attribution lines).
    async fn send_text(&self, text: &str) -> Result<(), RelayError>;
}

pub struct RelayService<T: RelayTransport> {
    transport: T,
    policy: RestrictionPolicy,
}

impl<T: RelayTransport> RelayService<T> {
    pub fn new(transport: T, policy: RestrictionPolicy) -> Self {
        Self { transport, policy }
    }

    /// Relay one ingested post to the moderation endpoint.
    pub async fn relay(&self, post: &IngestedPost) -> Result<(), RelayError> {
        if self.policy.is_restricted(post.item.text(), &post.tags) {
            tracing::warn!(
                message_id = post.message_id,
                source = %post.source,
                "copying restricted, re-materializing"
            );
            return self.rematerialize(post).await;
        }

        match self
            .transport
            .forward_to_moderation(post.chat_id, post.message_id)
            .await
        {
            Ok(()) => {
                tracing::info!(
                    message_id = post.message_id,
                    source = %post.source,
                    "forwarded post to moderation"
                );
                Ok(())
            }
            Err(err) => {
                tracing::warn!(
                    message_id = post.message_id,
                    error = %err,
                    "forward failed, re-materializing instead"
                );
                self.rematerialize(post).await
            }
        }
    }

    /// Recreate the item at the destination: re-send text directly, or
    /// download-and-re-upload media, then follow with the attribution line.
    async fn rematerialize(&self, post: &IngestedPost) -> Result<(), RelayError> {
        if let Some((kind, file_id)) = post.item.media() {
            let media = self.transport.download_payload(file_id).await?;
            self.transport
                .send_media(kind, media.path(), post.item.caption())
                .await?;
            // `media` drops here, deleting the temp file.
        } else if let Some(body) = post.item.text() {
            self.transport.send_text(body).await?;
        }

        self.transport
            .send_text(&format!("💬 Source: {}", post.source))
            .await?;

        tracing::info!(
            message_id = post.message_id,
            source = %post.source,
            "re-materialized post at moderation endpoint"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::content::{ContentItem, SourceInfo};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    #[derive(Default)]
    struct MockTransport {
        fail_forward: bool,
        forwards: Mutex<Vec<(i64, i64)>>,
        sent_media: Mutex<Vec<(MediaKind, Option<String>)>>,
        sent_texts: Mutex<Vec<String>>,
        media_existed_at_send: AtomicBool,
    }

    #[async_trait]
    impl RelayTransport for MockTransport {
        async fn forward_to_moderation(
            &self,
            source_chat: i64,
            message_id: i64,
        ) -> Result<(), RelayError> {
            if self.fail_forward {
                return Err(RelayError::Transport("forwards not allowed".to_string()));
            }
            self.forwards.lock().unwrap().push((source_chat, message_id));
            Ok(())
        }

        async fn download_payload(&self, _file_id: &str) -> Result<DownloadedMedia, RelayError> {
            let file = NamedTempFile::new()
                .map_err(|e| RelayError::Download(e.to_string()))?;
            Ok(DownloadedMedia::temp(file.into_temp_path()))
        }

        async fn send_media(
            &self,
            kind: MediaKind,
            path: &Path,
            caption: Option<&str>,
        ) -> Result<(), RelayError> {
            self.media_existed_at_send
                .store(path.exists(), Ordering::SeqCst);
            self.sent_media
                .lock()
                .unwrap()
                .push((kind, caption.map(|c| c.to_string())));
            Ok(())
        }

        async fn send_text(&self, text: &str) -> Result<(), RelayError> {
            self.sent_texts.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn post(item: ContentItem, tags: Vec<String>) -> IngestedPost {
        IngestedPost {
            chat_id: -100500,
            message_id: 17,
            item,
            tags,
            source: SourceInfo {
                channel_id: -100500,
                username: None,
                title: None,
            },
        }
    }

    fn service(transport: MockTransport) -> RelayService<MockTransport> {
        RelayService::new(transport, RestrictionPolicy::default())
    }

    #[tokio::test]
    async fn unrestricted_post_is_forwarded_natively() {
        let svc = service(MockTransport::default());
        let post = post(
            ContentItem::Text {
                body: "fresh news".to_string(),
            },
            vec![],
        );

        svc.relay(&post).await.unwrap();

        assert_eq!(*svc.transport.forwards.lock().unwrap(), vec![(-100500, 17)]);
        assert!(svc.transport.sent_texts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn restricted_text_is_never_forwarded() {
        let svc = service(MockTransport::default());
        let post = post(
            ContentItem::Text {
                body: "cool pic, no repost".to_string(),
            },
            vec![],
        );

        svc.relay(&post).await.unwrap();

        assert!(svc.transport.forwards.lock().unwrap().is_empty());
        let texts = svc.transport.sent_texts.lock().unwrap();
        assert_eq!(texts.len(), 2);
        assert_eq!(texts[0], "cool pic, no repost");
        assert!(texts[1].contains("Source: Channel ID: -100500"));
    }

    #[tokio::test]
    async fn restricted_hashtag_forces_reupload() {
        let svc = service(MockTransport::default());
        let post = post(
            ContentItem::Photo {
                file_id: "abc".to_string(),
                caption: Some("sunset".to_string()),
            },
            vec!["#nocopy".to_string()],
        );

        svc.relay(&post).await.unwrap();

        assert!(svc.transport.forwards.lock().unwrap().is_empty());
        let media = svc.transport.sent_media.lock().unwrap();
        assert_eq!(*media, vec![(MediaKind::Photo, Some("sunset".to_string()))]);
        drop(media);
        let texts = svc.transport.sent_texts.lock().unwrap();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].starts_with("💬 Source: "));
    }

    #[tokio::test]
    async fn forward_failure_falls_back_to_reupload() {
        let transport = MockTransport {
            fail_forward: true,
            ..Default::default()
        };
        let svc = service(transport);
        let post = post(
            ContentItem::Video {
                file_id: "vid".to_string(),
                caption: None,
            },
            vec![],
        );

        svc.relay(&post).await.unwrap();

        let media = svc.transport.sent_media.lock().unwrap();
        assert_eq!(*media, vec![(MediaKind::Video, None)]);
        // The downloaded payload must still exist at upload time.
        assert!(svc.transport.media_existed_at_send.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn downloaded_temp_file_is_deleted_when_handle_drops() {
        let svc = service(MockTransport::default());

        // Grab the path the mock would produce by doing the download inline.
        let media = svc.transport.download_payload("x").await.unwrap();
        let path = media.path().to_path_buf();
        assert!(path.exists());
        drop(media);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn video_note_reupload_carries_no_caption() {
        let svc = service(MockTransport::default());
        let post = post(
            ContentItem::VideoNote {
                file_id: "note".to_string(),
            },
            vec!["#запретпоста".to_string()],
        );

        svc.relay(&post).await.unwrap();

        let media = svc.transport.sent_media.lock().unwrap();
        assert_eq!(*media, vec![(MediaKind::VideoNote, None)]);
    }
}
