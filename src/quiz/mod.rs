pub mod engine;
pub mod loader;
pub mod session;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// A validated multiple-choice question.
///
/// Only the loader builds these, so `correct` is always one of `answers`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    text: String,
    answers: Vec<String>,
    correct: String,
}

impl Question {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn correct(&self) -> &str {
        &self.correct
    }
}

/// Static description of a question set: the command that selects it,
/// its display title and the file it is loaded from.
#[derive(Debug, Clone, Copy)]
pub struct SetInfo {
    pub key: &'static str,
    pub title: &'static str,
    pub file: &'static str,
}

pub const SET_CATALOG: &[SetInfo] = &[
    SetInfo {
        key: "ogn",
        title: "Огнестрельное оружие",
        file: "ogn.txt",
    },
    SetInfo {
        key: "ovu",
        title: "Общевоинские уставы",
        file: "ovu.txt",
    },
    SetInfo {
        key: "vpp",
        title: "Вопросы по ВПП",
        file: "vpp.txt",
    },
];

pub fn find_set(key: &str) -> Option<&'static SetInfo> {
    SET_CATALOG.iter().find(|info| info.key == key)
}

/// All question sets, loaded once at startup and never modified afterwards.
#[derive(Debug, Default)]
pub struct QuestionStore {
    sets: HashMap<String, Arc<[Question]>>,
}

impl QuestionStore {
    pub fn load(data_dir: &Path, catalog: &[SetInfo]) -> Self {
        let mut store = Self::default();
        for info in catalog {
            let questions = loader::load_file(data_dir.join(info.file));
            if questions.is_empty() {
                log::warn!("Question set '{}' is empty and can't be selected", info.key);
            } else {
                log::info!(
                    "Loaded {} questions for set '{}'",
                    questions.len(),
                    info.key
                );
            }
            store.insert(info.key, questions);
        }
        store
    }

    pub fn insert(&mut self, key: impl Into<String>, questions: Vec<Question>) {
        self.sets.insert(key.into(), questions.into());
    }

    /// Returns the set only if it holds at least one question.
    pub fn get(&self, key: &str) -> Option<&Arc<[Question]>> {
        self.sets.get(key).filter(|set| !set.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn store_loads_catalog_files_and_skips_missing_ones() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("ogn.txt"),
            r#"{"question": "Калибр АК-74?", "answers": [{"text": "5.45"}, {"text": "7.62"}, {"text": "5.45 мм", "correct": true}]},"#,
        )
        .unwrap();
        fs::write(dir.path().join("ovu.txt"), "not json at all").unwrap();

        let store = QuestionStore::load(dir.path(), SET_CATALOG);

        let ogn = store.get("ogn").unwrap();
        assert_eq!(ogn.len(), 1);
        assert_eq!(ogn[0].correct(), "5.45 мм");
        assert!(store.get("ovu").is_none());
        assert!(store.get("vpp").is_none());
        assert!(store.get("unknown").is_none());
    }

    #[test]
    fn catalog_lookup() {
        assert_eq!(find_set("vpp").unwrap().title, "Вопросы по ВПП");
        assert!(find_set("quiz").is_none());
    }
}
