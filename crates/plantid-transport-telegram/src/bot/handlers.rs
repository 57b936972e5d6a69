use crate::bot::orchestrator::{Inbound, RequestOrchestrator, RequestOutcome};
use anyhow::Result;
use std::sync::Arc;
use teloxide::{prelude::*, types::ParseMode, utils::command::BotCommands};
use tracing::{debug, info};

/// Greeting sent on `/start`.
pub const GREETING_TEXT: &str = "🌿 Hi! I identify plants.\n\n\
    Send me:\n\
    📸 <b>A photo of a plant</b> and I will name it and tell you about it\n\
    ✍️ <b>A description</b>, for example \"a pretty flower with white petals\"\n\
    📸+✍️ <b>A photo with a caption</b> for a more precise answer\n\n\
    I will share interesting facts about the plant and give you care tips! 🌱";

/// Usage text sent on `/help`.
pub const HELP_TEXT: &str = "🌿 <b>How to use the bot:</b>\n\n\
    📸 <b>Send a photo of a plant</b> and I will identify it\n\
    ✍️ <b>Describe a plant in text</b> and I will try to work out what it is\n\
    📸+✍️ <b>Photo with a caption</b> for the best result\n\n\
    <b>Commands:</b>\n\
    /start - start using the bot\n\
    /help - show this help\n\n\
    I will tell you:\n\
    • The plant's common and scientific name\n\
    • Its family\n\
    • A description and characteristics\n\
    • Care tips\n\
    • Fun facts\n\
    • Whether it is toxic\n\
    • How hard it is to care for\n\n\
    🌱 Happy exploring!";

/// Supported commands for the bot
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    /// Show the welcome message
    #[command(description = "Start the bot.")]
    Start,
    /// Show usage help
    #[command(description = "Show help.")]
    Help,
}

/// Start command handler
///
/// # Errors
///
/// Returns an error if the greeting cannot be sent.
pub async fn start(bot: Bot, msg: Message) -> Result<()> {
    info!("Start command received in chat {}.", msg.chat.id);
    bot.send_message(msg.chat.id, GREETING_TEXT)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

/// Help command handler
///
/// # Errors
///
/// Returns an error if the help text cannot be sent.
pub async fn help(bot: Bot, msg: Message) -> Result<()> {
    info!("Help command received in chat {}.", msg.chat.id);
    bot.send_message(msg.chat.id, HELP_TEXT)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

/// Extract the actionable part of a message.
///
/// Photos win over text; the largest photo size is used. Messages with
/// neither yield `None`.
#[must_use]
pub fn inbound_from_message(msg: &Message) -> Option<Inbound> {
    if let Some(photo) = msg
        .photo()
        .and_then(|sizes| sizes.iter().max_by_key(|p| u64::from(p.width) * u64::from(p.height)))
    {
        return Some(Inbound::Photo {
            file_id: photo.file.id.clone(),
            caption: msg.caption().map(str::to_string),
        });
    }

    msg.text().map(|text| Inbound::Text(text.to_string()))
}

/// Photo and text message handler
pub async fn handle_message(msg: Message, orchestrator: Arc<RequestOrchestrator>) -> RequestOutcome {
    let Some(inbound) = inbound_from_message(&msg) else {
        debug!("Message {} in chat {} has nothing to analyze", msg.id.0, msg.chat.id);
        return RequestOutcome::Ignored;
    };
    orchestrator.handle(msg.chat.id, inbound).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(extra: serde_json::Value) -> Message {
        let mut value = json!({
            "message_id": 1,
            "date": 1_700_000_000,
            "chat": {"id": 42, "type": "private", "first_name": "Ann"},
        });
        if let (Some(base), Some(extra)) = (value.as_object_mut(), extra.as_object()) {
            base.extend(extra.clone());
        }
        serde_json::from_value(value).expect("valid message json")
    }

    #[test]
    fn test_commands_parse() {
        assert_eq!(Command::parse("/start", "plantbot").ok(), Some(Command::Start));
        assert_eq!(Command::parse("/help", "plantbot").ok(), Some(Command::Help));
        assert!(Command::parse("/unknown", "plantbot").is_err());
    }

    #[test]
    fn test_command_list_for_menu() {
        let commands = Command::bot_commands();
        let names: Vec<_> = commands.iter().map(|c| c.command.trim_start_matches('/')).collect();
        assert_eq!(names, ["start", "help"]);
    }

    #[test]
    fn test_help_mentions_both_commands() {
        assert!(HELP_TEXT.contains("/start"));
        assert!(HELP_TEXT.contains("/help"));
        assert!(GREETING_TEXT.contains("caption"));
    }

    #[test]
    fn test_photo_uses_largest_size_and_caption() {
        let msg = message(json!({
            "photo": [
                {"file_id": "small", "file_unique_id": "s", "width": 90, "height": 90, "file_size": 100},
                {"file_id": "large", "file_unique_id": "l", "width": 1280, "height": 960, "file_size": 9000},
                {"file_id": "medium", "file_unique_id": "m", "width": 320, "height": 240, "file_size": 900}
            ],
            "caption": "growing on a balcony"
        }));

        match inbound_from_message(&msg) {
            Some(Inbound::Photo { file_id, caption }) => {
                assert_eq!(file_id.0, "large");
                assert_eq!(caption.as_deref(), Some("growing on a balcony"));
            }
            other => panic!("expected photo, got {other:?}"),
        }
    }

    #[test]
    fn test_text_message() {
        let msg = message(json!({"text": "tall plant with purple spikes"}));
        assert!(matches!(
            inbound_from_message(&msg),
            Some(Inbound::Text(text)) if text == "tall plant with purple spikes"
        ));
    }
}
