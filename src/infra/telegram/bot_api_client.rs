// Minimal Telegram Bot API client. It deliberately exposes only the calls
// the core layer needs, all as JSON posts against api.telegram.org.

use anyhow::{anyhow, Context, Result};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::path::Path;

use super::api_types::{ApiResponse, FileInfo, InlineKeyboardMarkup, Message, Update};
use crate::core::content::MediaKind;

#[derive(Clone)]
pub struct TelegramApiClient {
    client: Client,
    token: String,
    api_base: String,
}

impl TelegramApiClient {
    pub fn new(token: String) -> Self {
        Self {
            client: Client::new(),
            token,
            api_base: "https://api.telegram.org".to_string(),
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: serde_json::Value) -> Result<T> {
        let url = format!("{}/bot{}/{}", self.api_base, self.token, method);
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Telegram {} request failed", method))?;

        // Telegram reports errors in the JSON envelope even on non-2xx.
        let api: ApiResponse<T> = resp
            .json()
            .await
            .with_context(|| format!("Telegram {} returned malformed JSON", method))?;
        Self::unwrap_envelope(method, api)
    }

    fn unwrap_envelope<T>(method: &str, api: ApiResponse<T>) -> Result<T> {
        if !api.ok {
            return Err(anyhow!(
                "Telegram {} failed: {}",
                method,
                api.description.unwrap_or_else(|| "no description".to_string())
            ));
        }
        api.result
            .ok_or_else(|| anyhow!("Telegram {} returned ok without a result", method))
    }

    pub async fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<Update>> {
        let mut body = json!({ "timeout": timeout_secs });
        if let Some(offset) = offset {
            body["offset"] = json!(offset);
        }
        self.call("getUpdates", body).await
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<Message> {
        self.call(
            "sendMessage",
            json!({ "chat_id": chat_id, "text": text }),
        )
        .await
    }

    /// The buttons message sent to each approver, threaded under their
    /// forwarded copy.
    pub async fn send_notification(
        &self,
        chat_id: i64,
        text: &str,
        reply_to_message_id: i64,
        keyboard: &InlineKeyboardMarkup,
    ) -> Result<Message> {
        self.call(
            "sendMessage",
            json!({
                "chat_id": chat_id,
                "text": text,
                "reply_to_message_id": reply_to_message_id,
                "reply_markup": keyboard,
            }),
        )
        .await
    }

    pub async fn forward_message(
        &self,
        to_chat_id: i64,
        from_chat_id: i64,
        message_id: i64,
    ) -> Result<Message> {
        self.call(
            "forwardMessage",
            json!({
                "chat_id": to_chat_id,
                "from_chat_id": from_chat_id,
                "message_id": message_id,
            }),
        )
        .await
    }

    /// Publish by copy. Destination channels are addressed by identifier
    /// string ("@username" or a numeric id), exactly as configured.
    pub async fn copy_message(
        &self,
        to_channel: &str,
        from_chat_id: i64,
        message_id: i64,
    ) -> Result<()> {
        let chat_id: serde_json::Value = match to_channel.parse::<i64>() {
            Ok(numeric) => json!(numeric),
            Err(_) => json!(to_channel),
        };
        let _: serde_json::Value = self
            .call(
                "copyMessage",
                json!({
                    "chat_id": chat_id,
                    "from_chat_id": from_chat_id,
                    "message_id": message_id,
                }),
            )
            .await?;
        Ok(())
    }

    pub async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
    ) -> Result<()> {
        let _: serde_json::Value = self
            .call(
                "editMessageText",
                json!({
                    "chat_id": chat_id,
                    "message_id": message_id,
                    "text": text,
                }),
            )
            .await?;
        Ok(())
    }

    pub async fn answer_callback_query(
        &self,
        callback_query_id: &str,
        text: &str,
        show_alert: bool,
    ) -> Result<()> {
        let _: serde_json::Value = self
            .call(
                "answerCallbackQuery",
                json!({
                    "callback_query_id": callback_query_id,
                    "text": text,
                    "show_alert": show_alert,
                }),
            )
            .await?;
        Ok(())
    }

    /// Resolve a file_id to its download path on the file endpoint.
    pub async fn get_file_path(&self, file_id: &str) -> Result<String> {
        let info: FileInfo = self.call("getFile", json!({ "file_id": file_id })).await?;
        info.file_path
            .ok_or_else(|| anyhow!("Telegram getFile returned no file_path"))
    }

    pub async fn download_file(&self, file_path: &str, dest: &Path) -> Result<()> {
        let url = format!("{}/file/bot{}/{}", self.api_base, self.token, file_path);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("Telegram file download request failed")?;
        if !resp.status().is_success() {
            return Err(anyhow!(
                "Telegram file download failed with status {}",
                resp.status()
            ));
        }
        let bytes = resp
            .bytes()
            .await
            .context("Telegram file download body read failed")?;
        tokio::fs::write(dest, &bytes)
            .await
            .with_context(|| format!("failed to write downloaded payload to {:?}", dest))?;
        Ok(())
    }

    /// Upload a local payload as a fresh item of the given variant.
    pub async fn send_media(
        &self,
        chat_id: i64,
        kind: MediaKind,
        path: &Path,
        caption: Option<&str>,
    ) -> Result<()> {
        let (method, field) = match kind {
            MediaKind::Photo => ("sendPhoto", "photo"),
            MediaKind::Video => ("sendVideo", "video"),
            MediaKind::Document => ("sendDocument", "document"),
            MediaKind::Voice => ("sendVoice", "voice"),
            MediaKind::VideoNote => ("sendVideoNote", "video_note"),
        };

        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read payload from {:?}", path))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "payload".to_string());

        let mut form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part(field, Part::bytes(bytes).file_name(file_name));
        // Video notes cannot carry a caption.
        if kind != MediaKind::VideoNote {
            if let Some(caption) = caption {
                form = form.text("caption", caption.to_string());
            }
        }

        let url = format!("{}/bot{}/{}", self.api_base, self.token, method);
        let resp = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("Telegram {} request failed", method))?;
        let api: ApiResponse<serde_json::Value> = resp
            .json()
            .await
            .with_context(|| format!("Telegram {} returned malformed JSON", method))?;
        Self::unwrap_envelope(method, api).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_error_carries_description() {
        let api: ApiResponse<i64> = serde_json::from_str(
            r#"{"ok": false, "description": "Bad Request: chat not found"}"#,
        )
        .unwrap();
        let err = TelegramApiClient::unwrap_envelope("copyMessage", api).unwrap_err();
        assert!(err.to_string().contains("chat not found"));
    }

    #[test]
    fn envelope_ok_yields_result() {
        let api: ApiResponse<i64> = serde_json::from_str(r#"{"ok": true, "result": 5}"#).unwrap();
        assert_eq!(
            TelegramApiClient::unwrap_envelope("getUpdates", api).unwrap(),
            5
        );
    }

    #[test]
    fn update_with_callback_query_deserializes() {
        let raw = r#"{
            "update_id": 9,
            "callback_query": {
                "id": "cb1",
                "from": { "id": 42 },
                "data": "approve_all_7"
            }
        }"#;
        let update: Update = serde_json::from_str(raw).unwrap();
        let cq = update.callback_query.unwrap();
        assert_eq!(cq.from.id, 42);
        assert_eq!(cq.data.as_deref(), Some("approve_all_7"));
    }

    #[test]
    fn channel_post_with_media_deserializes() {
        let raw = r#"{
            "update_id": 10,
            "channel_post": {
                "message_id": 3,
                "chat": { "id": -100123, "username": "news", "title": "News" },
                "caption": "look #nocopy",
                "caption_entities": [ { "type": "hashtag", "offset": 5, "length": 7 } ],
                "photo": [ { "file_id": "small" }, { "file_id": "big" } ]
            }
        }"#;
        let update: Update = serde_json::from_str(raw).unwrap();
        let post = update.channel_post.unwrap();
        assert_eq!(post.chat.id, -100123);
        assert_eq!(post.photo.unwrap().last().unwrap().file_id, "big");
        assert_eq!(post.caption_entities.unwrap()[0].kind, "hashtag");
    }
}
