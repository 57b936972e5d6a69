//! Per-message request flow.
//!
//! Every inbound photo or text goes through one [`RequestOrchestrator::handle`]
//! call: show a loading indicator, gather the inputs, run the analysis,
//! remove the indicator and reply. Nothing is shared between calls except
//! the immutable collaborators held by the orchestrator.

use std::sync::Arc;

use anyhow::Result;
use plantid_core::analysis::{AnalysisClient, ImagePayload, SYSTEM_PROMPT};
use plantid_core::formatting::format_reply;
use teloxide::types::{ChatId, FileId, MessageId, ParseMode};
use tracing::{debug, error, info, warn};

use super::loading::{PhrasePicker, RandomPicker, LOADING_PHRASES};
use super::transport::ChatTransport;

/// Sent when the attached photo could not be downloaded.
pub const DOWNLOAD_FAILED_MESSAGE: &str = "Could not download the photo, please try again";
/// Sent when the model call for a photo failed.
pub const PHOTO_ANALYSIS_FAILED_MESSAGE: &str = "Could not analyze the photo, please try again";
/// Sent when the model call for a text description failed.
pub const TEXT_ANALYSIS_FAILED_MESSAGE: &str =
    "Could not analyze the description, please try again";
/// Sent when anything else went wrong.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong, please try again";

/// Actionable content of an inbound message
#[derive(Debug, Clone)]
pub enum Inbound {
    /// A photo, identified by its largest size, with an optional caption
    Photo {
        /// File id of the photo size to download
        file_id: FileId,
        /// Caption sent along with the photo
        caption: Option<String>,
    },
    /// A plain text message
    Text(String),
}

impl Inbound {
    const fn kind(&self) -> &'static str {
        match self {
            Self::Photo { .. } => "photo",
            Self::Text(_) => "text",
        }
    }

    const fn analysis_failure_message(&self) -> &'static str {
        match self {
            Self::Photo { .. } => PHOTO_ANALYSIS_FAILED_MESSAGE,
            Self::Text(_) => TEXT_ANALYSIS_FAILED_MESSAGE,
        }
    }

    /// Text that carries nothing to analyze (blank or a command).
    fn is_ignorable(&self) -> bool {
        match self {
            Self::Photo { .. } => false,
            Self::Text(text) => {
                let text = text.trim();
                text.is_empty() || text.starts_with('/')
            }
        }
    }
}

/// Terminal state of one request
///
/// A request starts idle, becomes working once the loading indicator is
/// shown, and ends as `Done` or `Failed`. `Ignored` requests never leave idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Nothing to do, no reply sent
    Ignored,
    /// A plant reply (full or low-quality) was sent
    Done,
    /// An error message was sent instead of a plant reply
    Failed,
}

/// Handle to the transient "working" message of one request
struct LoadingIndicator {
    chat_id: ChatId,
    message_id: Option<MessageId>,
}

impl LoadingIndicator {
    /// Delete the indicator if it is still shown. Later calls are no-ops.
    async fn clear(&mut self, transport: &dyn ChatTransport) {
        if let Some(message_id) = self.message_id.take() {
            if let Err(e) = transport.delete_message(self.chat_id, message_id).await {
                warn!("Failed to delete loading message in chat {}: {e:#}", self.chat_id);
            }
        }
    }
}

/// Drives a single inbound message from receipt to reply
pub struct RequestOrchestrator {
    transport: Arc<dyn ChatTransport>,
    analyzer: Arc<AnalysisClient>,
    picker: Arc<dyn PhrasePicker>,
}

impl RequestOrchestrator {
    /// Create an orchestrator with random loading phrases
    #[must_use]
    pub fn new(transport: Arc<dyn ChatTransport>, analyzer: Arc<AnalysisClient>) -> Self {
        Self {
            transport,
            analyzer,
            picker: Arc::new(RandomPicker),
        }
    }

    /// Replace the loading phrase picker
    #[must_use]
    pub fn with_picker(mut self, picker: Arc<dyn PhrasePicker>) -> Self {
        self.picker = picker;
        self
    }

    /// Process one inbound message and reply to `chat_id`.
    ///
    /// Never returns an error: every failure ends with a user-facing message
    /// and the loading indicator removed.
    pub async fn handle(&self, chat_id: ChatId, inbound: Inbound) -> RequestOutcome {
        if inbound.is_ignorable() {
            debug!("Ignoring non-actionable text in chat {chat_id}");
            return RequestOutcome::Ignored;
        }

        info!("Handling {} request in chat {chat_id}", inbound.kind());
        let mut indicator = self.show_loading(chat_id).await;

        match self.process(chat_id, &inbound, &mut indicator).await {
            Ok(outcome) => {
                info!("{} request in chat {chat_id} finished: {outcome:?}", inbound.kind());
                outcome
            }
            Err(e) => {
                error!(
                    "Unexpected error while handling {} request in chat {chat_id}: {e:?}",
                    inbound.kind()
                );
                indicator.clear(self.transport.as_ref()).await;
                if let Err(send_err) = self
                    .transport
                    .send_text(chat_id, GENERIC_FAILURE_MESSAGE, None)
                    .await
                {
                    error!("Failed to send error message to chat {chat_id}: {send_err:#}");
                }
                RequestOutcome::Failed
            }
        }
    }

    async fn show_loading(&self, chat_id: ChatId) -> LoadingIndicator {
        let phrase = self.picker.pick(LOADING_PHRASES);
        let message_id = match self.transport.send_text(chat_id, phrase, None).await {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("Failed to send loading message to chat {chat_id}: {e:#}");
                None
            }
        };
        LoadingIndicator {
            chat_id,
            message_id,
        }
    }

    async fn process(
        &self,
        chat_id: ChatId,
        inbound: &Inbound,
        indicator: &mut LoadingIndicator,
    ) -> Result<RequestOutcome> {
        let (image, text) = match inbound {
            Inbound::Photo { file_id, caption } => {
                match self.transport.fetch_attachment(file_id.clone()).await {
                    Ok(bytes) => {
                        debug!("Photo for chat {chat_id}: {} bytes", bytes.len());
                        (Some(ImagePayload::from_jpeg_bytes(&bytes)), caption.as_deref())
                    }
                    Err(e) => {
                        warn!("Failed to download photo for chat {chat_id}: {e:#}");
                        indicator.clear(self.transport.as_ref()).await;
                        self.transport
                            .send_text(chat_id, DOWNLOAD_FAILED_MESSAGE, None)
                            .await?;
                        return Ok(RequestOutcome::Failed);
                    }
                }
            }
            Inbound::Text(text) => (None, Some(text.trim())),
        };

        let analysis = self
            .analyzer
            .analyze(image.as_ref(), SYSTEM_PROMPT, text)
            .await;
        indicator.clear(self.transport.as_ref()).await;

        match analysis {
            Ok(result) => {
                let reply = format_reply(&result.with_defaults());
                self.transport
                    .send_text(chat_id, &reply, Some(ParseMode::Html))
                    .await?;
                Ok(RequestOutcome::Done)
            }
            Err(e) => {
                warn!("{} analysis failed for chat {chat_id}: {e}", inbound.kind());
                self.transport
                    .send_text(chat_id, inbound.analysis_failure_message(), None)
                    .await?;
                Ok(RequestOutcome::Failed)
            }
        }
    }
}
