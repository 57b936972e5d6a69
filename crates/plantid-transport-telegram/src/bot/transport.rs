//! Chat transport seam.
//!
//! The orchestrator only needs three operations from the chat platform;
//! `TelegramTransport` provides them over a `teloxide::Bot`.

use anyhow::Result;
use async_trait::async_trait;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{ChatId, FileId, MessageId, ParseMode};
use tracing::debug;

/// Operations the request flow performs against the chat platform
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send a text message and return its id.
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<MessageId>;

    /// Delete a previously sent message.
    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> Result<()>;

    /// Download the contents of an attached file.
    async fn fetch_attachment(&self, file_id: FileId) -> Result<Vec<u8>>;
}

/// [`ChatTransport`] backed by the Telegram Bot API
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    /// Wrap a bot instance
    #[must_use]
    pub const fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<MessageId> {
        let mut req = self.bot.send_message(chat_id, text.to_string());
        if let Some(pm) = parse_mode {
            req = req.parse_mode(pm);
        }
        let sent = req
            .await
            .map_err(|e| anyhow::anyhow!("Telegram send error: {e}"))?;
        Ok(sent.id)
    }

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> Result<()> {
        self.bot
            .delete_message(chat_id, message_id)
            .await
            .map_err(|e| anyhow::anyhow!("Telegram delete error: {e}"))?;
        Ok(())
    }

    async fn fetch_attachment(&self, file_id: FileId) -> Result<Vec<u8>> {
        let file = self.bot.get_file(file_id).await?;
        let mut buf = Vec::new();
        self.bot.download_file(&file.path, &mut buf).await?;
        debug!("Downloaded attachment: {} bytes", buf.len());
        Ok(buf)
    }
}
