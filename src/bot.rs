use std::time::Duration;

use crate::chat::{ChatInterface, ChatResult};
use crate::quiz::engine::{Prompt, QuizEngine, QuizError, Stats, Step, Verdict};
use crate::quiz::session::{Mode, UserId};
use crate::quiz::{find_set, SET_CATALOG};

const MODE_MENU_TEXT: &str = "📚 Выберите режим вопросов:";
const SET_UNAVAILABLE_TEXT: &str = "❌ Вопросы из этого набора не загружены.";
const NO_ACTIVE_QUESTION_TEXT: &str = "❌ Вопрос не найден.";

/// Turns user actions into engine calls and renders the outcome in the chat.
pub struct QuizBot<C> {
    engine: QuizEngine,
    chat: C,
    answer_delay: Duration,
}

impl<C: ChatInterface> QuizBot<C> {
    pub fn new(engine: QuizEngine, chat: C, answer_delay: Duration) -> Self {
        Self {
            engine,
            chat,
            answer_delay,
        }
    }

    pub async fn start(&self, user: UserId) -> ChatResult {
        self.chat.send_mode_menu(user, MODE_MENU_TEXT).await
    }

    pub async fn choose_mode(&self, user: UserId, mode: Mode) -> ChatResult {
        self.engine.set_mode(user, mode);
        self.chat.edit_last_message(user, &set_menu_text()).await
    }

    pub async fn select_set(&self, user: UserId, key: &str) -> ChatResult {
        match self.engine.select_set(user, key) {
            Ok(selection) => {
                let text = format!(
                    "✅ Набор «{}» выбран. Введите /quiz чтобы начать!\nРежим: {}",
                    selection.key.to_uppercase(),
                    selection.mode
                );
                self.chat.send_text(user, &text).await
            }
            Err(err) => self.reject(user, err).await,
        }
    }

    pub async fn next_question(&self, user: UserId) -> ChatResult {
        match self.engine.next_question(user) {
            Ok(step) => self.render_step(user, step).await,
            Err(err) => self.reject(user, err).await,
        }
    }

    pub async fn answer(&self, user: UserId, position: usize) -> ChatResult {
        let answered = match self.engine.submit_answer(user, position) {
            Ok(answered) => answered,
            Err(err) => return self.reject(user, err).await,
        };

        self.chat
            .edit_last_message(user, &verdict_text(&answered.verdict))
            .await?;
        if !self.answer_delay.is_zero() {
            tokio::time::sleep(self.answer_delay).await;
        }
        self.render_step(user, answered.next).await
    }

    pub async fn stats(&self, user: UserId) -> ChatResult {
        match self.engine.finalize(user) {
            Ok(stats) => self.chat.send_stats(user, &stats_text(&stats)).await,
            Err(err) => self.reject(user, err).await,
        }
    }

    async fn render_step(&self, user: UserId, step: Step) -> ChatResult {
        match step {
            Step::Question(prompt) => {
                log::debug!("Sending question #{} to {:?}", prompt.number, user);
                self.chat
                    .send_prompt(user, &prompt_text(&prompt), prompt.answers.len())
                    .await
            }
            Step::Finished(stats) => self.chat.send_stats(user, &stats_text(&stats)).await,
        }
    }

    async fn reject(&self, user: UserId, err: QuizError) -> ChatResult {
        log::debug!("Rejected action of {:?}: {}", user, err);
        match err {
            QuizError::SetUnavailable(_) => self.chat.send_text(user, SET_UNAVAILABLE_TEXT).await,
            QuizError::NoSetSelected => {
                let text = format!("❗️ Сначала выберите набор: {}", set_commands());
                self.chat.send_text(user, &text).await
            }
            QuizError::NoActiveQuestion => {
                self.chat
                    .edit_last_message(user, NO_ACTIVE_QUESTION_TEXT)
                    .await
            }
        }
    }
}

fn set_commands() -> String {
    SET_CATALOG
        .iter()
        .map(|info| format!("/{}", info.key))
        .collect::<Vec<_>>()
        .join(" ")
}

fn set_menu_text() -> String {
    let sets = SET_CATALOG
        .iter()
        .map(|info| format!("/{} - {}", info.key, info.title))
        .collect::<Vec<_>>()
        .join("\n");
    format!("🔍 Теперь выберите набор вопросов:\n{}", sets)
}

fn prompt_text(prompt: &Prompt) -> String {
    let answers = prompt
        .answers
        .iter()
        .enumerate()
        .map(|(i, answer)| format!("{}. {}", i + 1, answer))
        .collect::<Vec<_>>()
        .join("\n");
    format!("❓ {}\n\n{}", prompt.text, answers)
}

fn verdict_text(verdict: &Verdict) -> String {
    let resolution = if verdict.is_correct {
        format!("✅ Правильно! {}", verdict.selected)
    } else {
        format!(
            "❌ Неверно! Ваш ответ: {}\nПравильный ответ: {}",
            verdict.selected, verdict.correct
        )
    };
    format!("{}\n\n{}", prompt_text(&verdict.question), resolution)
}

fn stats_text(stats: &Stats) -> String {
    let title = find_set(&stats.set_key)
        .map(|info| format!(" «{}»", info.title))
        .unwrap_or_default();
    let mut text = format!(
        "📊 Статистика по теме {}{}:\n✅ Правильных ответов: {}/{}\n",
        stats.set_key.to_uppercase(),
        title,
        stats.correct_count,
        stats.total_questions
    );

    if !stats.missed.is_empty() {
        let missed = stats
            .missed
            .iter()
            .map(|index| (index + 1).to_string())
            .collect::<Vec<_>>()
            .join(", ");
        text.push_str(&format!("❌ Ошибки в вопросах: {}\n", missed));
    }

    text.push_str(&format!(
        "Выберите набор, чтобы начать заново: {}",
        set_commands()
    ));
    text
}
