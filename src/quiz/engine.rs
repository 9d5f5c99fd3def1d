use std::sync::Arc;

use dashmap::DashMap;
use rand::Rng;

use super::session::{CurrentQuestion, Mode, SessionState, UserId};
use super::{Question, QuestionStore};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuizError {
    #[error("question set '{0}' is not loaded")]
    SetUnavailable(String),
    #[error("no question set selected")]
    NoSetSelected,
    #[error("no question is waiting for an answer")]
    NoActiveQuestion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub key: String,
    pub mode: Mode,
    pub total: usize,
}

/// A question as shown to the user. Answers are addressed by position and
/// nothing here tells which one is correct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// 1-based number of the question inside its set.
    pub number: usize,
    pub text: String,
    pub answers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stats {
    pub set_key: String,
    pub correct_count: usize,
    pub total_questions: usize,
    /// 0-based positions of the missed questions.
    pub missed: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Question(Prompt),
    Finished(Stats),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub question: Prompt,
    pub selected: String,
    pub correct: String,
    pub is_correct: bool,
}

/// Result of an answer: how it was resolved, then what comes next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answered {
    pub verdict: Verdict,
    pub next: Step,
}

pub struct QuizEngine {
    store: Arc<QuestionStore>,
    sessions: DashMap<UserId, SessionState>,
}

impl QuizEngine {
    pub fn new(store: Arc<QuestionStore>) -> Self {
        Self {
            store,
            sessions: DashMap::new(),
        }
    }

    pub fn set_mode(&self, user: UserId, mode: Mode) {
        self.sessions.entry(user).or_default().mode = mode;
    }

    pub fn select_set(&self, user: UserId, key: &str) -> Result<Selection, QuizError> {
        let questions = self
            .store
            .get(key)
            .ok_or_else(|| QuizError::SetUnavailable(key.to_string()))?;

        let mut session = self.sessions.entry(user).or_default();
        session.restart(key, questions.clone());
        log::debug!(
            "User {:?} selected set {:?} ({:?})",
            user,
            session.set_key(),
            session.mode
        );

        Ok(Selection {
            key: key.to_string(),
            mode: session.mode,
            total: session.total_questions,
        })
    }

    pub fn next_question(&self, user: UserId) -> Result<Step, QuizError> {
        let step = {
            let mut session = self
                .sessions
                .get_mut(&user)
                .filter(|session| session.set.is_some())
                .ok_or(QuizError::NoSetSelected)?;
            advance(&mut session)
        };
        self.finish_if_done(user, step)
    }

    pub fn submit_answer(&self, user: UserId, position: usize) -> Result<Answered, QuizError> {
        let (verdict, next) = {
            let mut session = self
                .sessions
                .get_mut(&user)
                .ok_or(QuizError::NoActiveQuestion)?;

            let current = session.current.take().ok_or(QuizError::NoActiveQuestion)?;
            let Some(selected) = current.question.answers.get(position).cloned() else {
                log::warn!(
                    "User {:?} answered with position {} out of {}",
                    user,
                    position,
                    current.question.answers.len()
                );
                session.current = Some(current);
                return Err(QuizError::NoActiveQuestion);
            };

            let is_correct = selected == current.question.correct();
            if is_correct {
                session.correct_count += 1;
            } else {
                session.missed.push(current.index);
            }

            let verdict = Verdict {
                question: prompt(current.index, &current.question),
                selected,
                correct: current.question.correct,
                is_correct,
            };
            (verdict, advance(&mut session))
        };

        let next = self.finish_if_done(user, next)?;
        Ok(Answered { verdict, next })
    }

    pub fn finalize(&self, user: UserId) -> Result<Stats, QuizError> {
        let (_, session) = self
            .sessions
            .remove_if(&user, |_, session| session.set.is_some())
            .ok_or(QuizError::NoSetSelected)?;
        Ok(stats(session))
    }

    fn finish_if_done(&self, user: UserId, step: Advance) -> Result<Step, QuizError> {
        match step {
            Advance::Question(prompt) => Ok(Step::Question(prompt)),
            Advance::Exhausted => self.finalize(user).map(Step::Finished),
        }
    }
}

enum Advance {
    Question(Prompt),
    Exhausted,
}

// Serves the next question for a session that has a set selected.
fn advance(session: &mut SessionState) -> Advance {
    let Some(set) = session.set.as_ref() else {
        return Advance::Exhausted;
    };

    let index = match session.mode {
        Mode::Sequential => {
            if session.is_exhausted() {
                return Advance::Exhausted;
            }
            session.cursor += 1;
            session.cursor - 1
        }
        Mode::Random => rand::thread_rng().gen_range(0..set.questions.len()),
    };

    let question = set.questions[index].clone();
    let shown = prompt(index, &question);
    session.current = Some(CurrentQuestion { index, question });
    Advance::Question(shown)
}

fn prompt(index: usize, question: &Question) -> Prompt {
    Prompt {
        number: index + 1,
        text: question.text().to_string(),
        answers: question.answers().to_vec(),
    }
}

fn stats(session: SessionState) -> Stats {
    Stats {
        set_key: session.set.map(|set| set.key).unwrap_or_default(),
        correct_count: session.correct_count,
        total_questions: session.total_questions,
        missed: session.missed,
    }
}
