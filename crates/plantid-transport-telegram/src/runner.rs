use crate::bot;
use crate::bot::handlers::Command;
use crate::bot::{RequestOrchestrator, TelegramTransport};
use crate::config::BotSettings;
use plantid_core::analysis::AnalysisClient;
use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{error, info, warn};

/// Run the Telegram transport runtime.
pub async fn run_bot(settings: Arc<BotSettings>) {
    let analyzer = init_analyzer(&settings);

    let bot = Bot::new(settings.telegram.telegram_bot_token.clone());
    register_commands(&bot).await;

    let transport = Arc::new(TelegramTransport::new(bot.clone()));
    let orchestrator = Arc::new(RequestOrchestrator::new(transport, analyzer));
    let handler = setup_handler();

    info!("Bot is running...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![orchestrator, settings])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

fn init_analyzer(settings: &BotSettings) -> Arc<AnalysisClient> {
    match AnalysisClient::new(settings.analysis.as_ref()) {
        Ok(client) => {
            info!("Analysis client initialized (model: {}).", client.model());
            Arc::new(client)
        }
        Err(e) => {
            error!("Failed to initialize analysis client: {}", e);
            std::process::exit(1);
        }
    }
}

async fn register_commands(bot: &Bot) {
    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!("Failed to register bot commands: {}", e);
    }
}

fn setup_handler() -> UpdateHandler<teloxide::RequestError> {
    Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(
            dptree::filter(|msg: Message| msg.photo().is_some() || msg.text().is_some())
                .endpoint(handle_message),
        )
}

async fn handle_command(bot: Bot, msg: Message, cmd: Command) -> Result<(), teloxide::RequestError> {
    let res = match cmd {
        Command::Start => bot::handlers::start(bot, msg).await,
        Command::Help => bot::handlers::help(bot, msg).await,
    };
    if let Err(e) = res {
        error!("Command error: {}", e);
    }
    respond(())
}

async fn handle_message(
    msg: Message,
    orchestrator: Arc<RequestOrchestrator>,
) -> Result<(), teloxide::RequestError> {
    bot::handlers::handle_message(msg, orchestrator).await;
    respond(())
}
