use std::fmt;
use std::sync::Arc;

use super::Question;

/// Platform independent user identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub u64);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Random,
    Sequential,
}

impl Mode {
    /// Parses the suffix of a `mode_*` callback.
    pub fn from_callback(data: &str) -> Option<Self> {
        match data {
            "random" => Some(Mode::Random),
            "sequential" => Some(Mode::Sequential),
            _ => None,
        }
    }

    pub fn callback_data(self) -> &'static str {
        match self {
            Mode::Random => "mode_random",
            Mode::Sequential => "mode_sequential",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Random => write!(f, "рандомный"),
            Mode::Sequential => write!(f, "по порядку"),
        }
    }
}

/// The question currently shown to a user, with its position in the set.
#[derive(Debug, Clone)]
pub struct CurrentQuestion {
    pub index: usize,
    pub question: Question,
}

/// The set a user has picked, together with a handle to its questions.
#[derive(Debug, Clone)]
pub struct SelectedSet {
    pub key: String,
    pub questions: Arc<[Question]>,
}

/// Quiz progress of a single user.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub mode: Mode,
    pub set: Option<SelectedSet>,
    /// Next index to serve in sequential mode.
    pub cursor: usize,
    pub correct_count: usize,
    /// Positions of missed questions inside the set, in answer order.
    pub missed: Vec<usize>,
    pub total_questions: usize,
    pub current: Option<CurrentQuestion>,
}

impl SessionState {
    /// Starts over on a new set. The mode survives, everything else resets.
    pub fn restart(&mut self, key: &str, questions: Arc<[Question]>) {
        *self = Self {
            mode: self.mode,
            total_questions: questions.len(),
            set: Some(SelectedSet {
                key: key.to_string(),
                questions,
            }),
            ..Self::default()
        };
    }

    pub fn set_key(&self) -> Option<&str> {
        self.set.as_ref().map(|set| set.key.as_str())
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.total_questions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mode_is_random() {
        assert_eq!(SessionState::default().mode, Mode::Random);
    }

    #[test]
    fn mode_callbacks() {
        assert_eq!(Mode::from_callback("sequential"), Some(Mode::Sequential));
        assert_eq!(Mode::from_callback("random"), Some(Mode::Random));
        assert_eq!(Mode::from_callback("shuffle"), None);
        assert_eq!(Mode::Sequential.callback_data(), "mode_sequential");
    }

    #[test]
    fn restart_keeps_mode_and_clears_progress() {
        let questions: Arc<[Question]> = crate::quiz::loader::load(
            r#"{"question": "q", "answers": [{"text": "a", "correct": true}, {"text": "b"}]}"#,
        )
        .into();
        let mut state = SessionState {
            mode: Mode::Sequential,
            cursor: 3,
            correct_count: 2,
            missed: vec![1],
            ..SessionState::default()
        };

        state.restart("demo", questions);

        assert_eq!(state.mode, Mode::Sequential);
        assert_eq!(state.set_key(), Some("demo"));
        assert_eq!(state.cursor, 0);
        assert_eq!(state.correct_count, 0);
        assert!(state.missed.is_empty());
        assert_eq!(state.total_questions, 1);
        assert!(state.current.is_none());
    }
}
