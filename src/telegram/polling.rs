// Long-polling update loop shared by both bot processes.
//
// One update at a time, in order; a handler error is logged and never
// stops the loop. Transport failures back off exponentially.

use crate::infra::telegram::{TelegramApiClient, Update};
use async_trait::async_trait;
use tokio::time::{sleep, Duration};

/// One bot process's event handling, run to completion per update.
#[async_trait]
pub trait UpdateHandler: Send + Sync {
    async fn handle(&self, update: Update) -> anyhow::Result<()>;
}

pub struct UpdatePoller {
    client: TelegramApiClient,
    poll_timeout_secs: u64,
}

impl UpdatePoller {
    pub fn new(client: TelegramApiClient) -> Self {
        Self {
            client,
            poll_timeout_secs: 30,
        }
    }

    pub async fn run(&self, handler: &dyn UpdateHandler) {
        tracing::info!("starting Telegram long polling loop");

        let mut offset: Option<i64> = None;
        let mut backoff_secs = 1;

        loop {
            match self
                .client
                .get_updates(offset, self.poll_timeout_secs)
                .await
            {
                Ok(updates) => {
                    backoff_secs = 1;

                    for update in updates {
                        offset = Some(update.update_id + 1);
                        let update_id = update.update_id;

                        if let Err(err) = handler.handle(update).await {
                            tracing::error!(update_id, error = %err, "failed to handle update");
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(
                        error = %err,
                        "Telegram polling error, retrying in {}s",
                        backoff_secs
                    );
                    sleep(Duration::from_secs(backoff_secs)).await;
                    backoff_secs = (backoff_secs * 2).min(60);
                }
            }
        }
    }
}
