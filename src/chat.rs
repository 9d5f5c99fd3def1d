use dashmap::DashMap;
use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, MessageId},
};

use crate::quiz::session::{Mode, UserId};

pub type ChatResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Everything the quiz needs from a messaging platform.
#[async_trait::async_trait]
pub trait ChatInterface: Send + Sync {
    /// Sends a question with one numbered button per answer.
    async fn send_prompt(&self, user: UserId, text: &str, answer_count: usize) -> ChatResult;

    /// Sends the mode selection menu.
    async fn send_mode_menu(&self, user: UserId, text: &str) -> ChatResult;

    /// Replaces the text of the last prompt or menu sent to the user.
    async fn edit_last_message(&self, user: UserId, text: &str) -> ChatResult;

    async fn send_stats(&self, user: UserId, text: &str) -> ChatResult;

    async fn send_text(&self, user: UserId, text: &str) -> ChatResult;
}

pub const ANSWER_CALLBACK_PREFIX: &str = "ans_";
pub const MODE_CALLBACK_PREFIX: &str = "mode_";

const MODE_RANDOM_BUTTON: &str = "Рандомные вопросы";
const MODE_SEQUENTIAL_BUTTON: &str = "По порядку";

/// Telegram implementation. Quiz conversations happen in private chats, where
/// the chat id equals the user id.
pub struct TelegramChat {
    bot: Bot,
    last_messages: DashMap<UserId, MessageId>,
}

impl TelegramChat {
    pub fn new(bot: Bot) -> Self {
        Self {
            bot,
            last_messages: DashMap::new(),
        }
    }

    fn chat_id(user: UserId) -> ChatId {
        ChatId(user.0 as i64)
    }

    async fn send_with_keyboard(
        &self,
        user: UserId,
        text: &str,
        keyboard: InlineKeyboardMarkup,
    ) -> ChatResult {
        let message = self
            .bot
            .send_message(Self::chat_id(user), text)
            .reply_markup(keyboard)
            .await?;
        self.last_messages.insert(user, message.id);
        Ok(())
    }
}

#[async_trait::async_trait]
impl ChatInterface for TelegramChat {
    async fn send_prompt(&self, user: UserId, text: &str, answer_count: usize) -> ChatResult {
        let buttons = (0..answer_count)
            .map(|i| {
                InlineKeyboardButton::callback(
                    (i + 1).to_string(),
                    format!("{}{}", ANSWER_CALLBACK_PREFIX, i),
                )
            })
            .collect::<Vec<_>>();
        self.send_with_keyboard(user, text, InlineKeyboardMarkup::new(vec![buttons]))
            .await
    }

    async fn send_mode_menu(&self, user: UserId, text: &str) -> ChatResult {
        let keyboard = InlineKeyboardMarkup::new(vec![
            vec![InlineKeyboardButton::callback(
                MODE_RANDOM_BUTTON,
                Mode::Random.callback_data(),
            )],
            vec![InlineKeyboardButton::callback(
                MODE_SEQUENTIAL_BUTTON,
                Mode::Sequential.callback_data(),
            )],
        ]);
        self.send_with_keyboard(user, text, keyboard).await
    }

    async fn edit_last_message(&self, user: UserId, text: &str) -> ChatResult {
        let message_id = self.last_messages.get(&user).map(|id| *id);
        match message_id {
            Some(message_id) => {
                self.bot
                    .edit_message_text(Self::chat_id(user), message_id, text)
                    .await?;
            }
            None => {
                log::debug!("No message to edit for {:?}, sending a new one", user);
                self.bot.send_message(Self::chat_id(user), text).await?;
            }
        }
        Ok(())
    }

    async fn send_stats(&self, user: UserId, text: &str) -> ChatResult {
        self.bot.send_message(Self::chat_id(user), text).await?;
        Ok(())
    }

    async fn send_text(&self, user: UserId, text: &str) -> ChatResult {
        self.bot.send_message(Self::chat_id(user), text).await?;
        Ok(())
    }
}
