mod bot;
mod chat;
mod config;
mod quiz;

use std::sync::Arc;

use bot::QuizBot;
use chat::{TelegramChat, ANSWER_CALLBACK_PREFIX, MODE_CALLBACK_PREFIX};
use config::Config;
use dotenv::dotenv;
use quiz::{engine::QuizEngine, session::Mode, session::UserId, QuestionStore, SET_CATALOG};
use teloxide::{prelude::*, utils::command::BotCommands};

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;
type SharedQuizBot = Arc<QuizBot<TelegramChat>>;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Доступные команды:")]
enum Command {
    #[command(description = "выбрать режим вопросов")]
    Start,
    #[command(description = "следующий вопрос")]
    Quiz,
    #[command(description = "показать статистику и завершить тест")]
    Stats,
    #[command(description = "показать эту справку")]
    Help,
}

/// A `/<key>` command selecting one of the question sets.
#[derive(Clone, Copy)]
struct SetCommand(&'static str);

#[tokio::main]
async fn main() {
    dotenv().ok();
    pretty_env_logger::init();
    log::info!("Starting quiz bot...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            log::error!("Invalid configuration: {}", err);
            eprintln!("Invalid configuration: {}", err);
            std::process::exit(1);
        }
    };

    log::info!("Loading question sets from {}", config.data_dir.display());
    let store = Arc::new(QuestionStore::load(&config.data_dir, SET_CATALOG));

    let bot = Bot::new(config.token.clone());
    let quiz: SharedQuizBot = Arc::new(QuizBot::new(
        QuizEngine::new(store),
        TelegramChat::new(bot.clone()),
        config.answer_delay,
    ));

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(
            Update::filter_message()
                .filter_map(|msg: Message| parse_set_command(msg.text()?))
                .endpoint(handle_set_command),
        )
        .branch(Update::filter_callback_query().endpoint(handle_callback));

    log::info!("Bot started");
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![quiz])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn handle_command(
    bot: Bot,
    quiz: SharedQuizBot,
    msg: Message,
    cmd: Command,
) -> HandlerResult {
    let Some(user) = msg.from().map(|user| UserId(user.id.0)) else {
        return Ok(());
    };

    match cmd {
        Command::Start => quiz.start(user).await,
        Command::Quiz => quiz.next_question(user).await,
        Command::Stats => quiz.stats(user).await,
        Command::Help => {
            bot.send_message(msg.chat.id, help_text()).await?;
            Ok(())
        }
    }
}

async fn handle_set_command(quiz: SharedQuizBot, msg: Message, set: SetCommand) -> HandlerResult {
    match msg.from() {
        Some(user) => quiz.select_set(UserId(user.id.0), set.0).await,
        None => Ok(()),
    }
}

async fn handle_callback(bot: Bot, quiz: SharedQuizBot, q: CallbackQuery) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;
    let user = UserId(q.from.id.0);

    match q.data.as_deref().and_then(parse_callback) {
        Some(Callback::Mode(mode)) => quiz.choose_mode(user, mode).await,
        Some(Callback::Answer(position)) => quiz.answer(user, position).await,
        None => {
            log::warn!("Unknown callback data {:?} from {:?}", q.data, user);
            Ok(())
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Callback {
    Mode(Mode),
    Answer(usize),
}

fn parse_callback(data: &str) -> Option<Callback> {
    if let Some(mode) = data.strip_prefix(MODE_CALLBACK_PREFIX) {
        return Mode::from_callback(mode).map(Callback::Mode);
    }
    data.strip_prefix(ANSWER_CALLBACK_PREFIX)?
        .parse()
        .ok()
        .map(Callback::Answer)
}

// Accepts `/ogn` as well as `/ogn@SomeBot` in group chats.
fn parse_set_command(text: &str) -> Option<SetCommand> {
    let command = text.split_whitespace().next()?.strip_prefix('/')?;
    let name = command.split('@').next()?;
    quiz::find_set(name).map(|info| SetCommand(info.key))
}

fn help_text() -> String {
    let sets = SET_CATALOG
        .iter()
        .map(|info| format!("/{} — {}", info.key, info.title))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{}\n\nНаборы вопросов:\n{}", Command::descriptions(), sets)
}
