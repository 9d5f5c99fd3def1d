use std::fs;
use std::path::Path;

use serde_json::Value;

use super::Question;

// Shapes as they appear in the set files. `correct` is kept as a raw value
// since the files use `true`, `1` and sometimes strings for it.
#[derive(Debug, serde::Deserialize)]
struct RawQuestion {
    question: String,
    answers: Vec<RawAnswer>,
}

#[derive(Debug, serde::Deserialize)]
struct RawAnswer {
    text: String,
    #[serde(default)]
    correct: Value,
}

/// Reads a set file. A missing or unreadable file gives an empty set.
pub fn load_file(path: impl AsRef<Path>) -> Vec<Question> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(source) => load(&source),
        Err(err) => {
            log::error!("Failed to read question file {}: {}", path.display(), err);
            Vec::new()
        }
    }
}

/// Parses the content of a set file into validated questions.
///
/// The files are hand-edited, so besides a proper JSON array this also
/// accepts comma separated objects without the enclosing brackets, with or
/// without a trailing comma. Records that don't have exactly one correct
/// answer are dropped.
pub fn load(source: &str) -> Vec<Question> {
    let normalized = normalize(source);
    let records: Vec<Value> = match serde_json::from_str(&normalized) {
        Ok(records) => records,
        Err(err) => {
            log::error!("Failed to parse question file: {}", err);
            return Vec::new();
        }
    };

    records
        .into_iter()
        .enumerate()
        .filter_map(|(position, record)| {
            let question = validate(record);
            if question.is_none() {
                log::debug!("Skipping invalid question record #{}", position + 1);
            }
            question
        })
        .collect()
}

fn normalize(source: &str) -> String {
    let trimmed = source.trim();
    let trimmed = trimmed.strip_suffix(',').unwrap_or(trimmed);
    if trimmed.starts_with('[') {
        trimmed.to_string()
    } else {
        format!("[{}]", trimmed)
    }
}

fn validate(record: Value) -> Option<Question> {
    let raw: RawQuestion = serde_json::from_value(record).ok()?;
    if raw.answers.len() < 2 {
        return None;
    }

    let mut correct = raw.answers.iter().filter(|a| is_truthy(&a.correct));
    let correct = match (correct.next(), correct.next()) {
        (Some(answer), None) => answer.text.clone(),
        _ => return None,
    };

    Some(Question {
        text: raw.question,
        answers: raw.answers.into_iter().map(|a| a.text).collect(),
        correct,
    })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIRST: &str = r#"{"question": "2+2?", "answers": [{"text": "3"}, {"text": "4", "correct": true}]}"#;
    const SECOND: &str = r#"{"question": "Столица?", "answers": [{"text": "Москва", "correct": 1}, {"text": "Казань", "correct": false}]}"#;

    fn bracketed() -> String {
        format!("[{}, {}]", FIRST, SECOND)
    }

    #[test]
    fn fragments_parse_like_the_bracketed_array() {
        let expected = load(&bracketed());
        assert_eq!(expected.len(), 2);

        assert_eq!(load(&format!("{},\n{}", FIRST, SECOND)), expected);
        assert_eq!(load(&format!("\n  {},\n{},\n\n", FIRST, SECOND)), expected);
        assert_eq!(load(&format!("  {},  ", bracketed())), expected);
    }

    #[test]
    fn projects_answers_in_original_order() {
        let questions = load(FIRST);
        assert_eq!(questions.len(), 1);
        let question = &questions[0];
        assert_eq!(question.text(), "2+2?");
        assert_eq!(question.answers(), ["3", "4"]);
        assert_eq!(question.correct(), "4");
    }

    #[test]
    fn drops_records_without_exactly_one_correct_answer() {
        let source = format!(
            "{},{},{},{},{}",
            FIRST,
            r#"{"question": "none", "answers": [{"text": "a"}, {"text": "b", "correct": false}]}"#,
            r#"{"question": "two", "answers": [{"text": "a", "correct": true}, {"text": "b", "correct": "yes"}]}"#,
            r#"{"question": "no answers field"}"#,
            SECOND,
        );

        let questions = load(&source);
        let texts: Vec<_> = questions.iter().map(|q| q.text()).collect();
        assert_eq!(texts, ["2+2?", "Столица?"]);
    }

    #[test]
    fn drops_records_with_missing_or_malformed_fields() {
        let source = [
            r#"{"answers": [{"text": "a", "correct": true}, {"text": "b"}]}"#,
            r#"{"question": "no text", "answers": [{"correct": true}, {"text": "b"}]}"#,
            r#"{"question": "single", "answers": [{"text": "a", "correct": true}]}"#,
            r#"{"question": "not a list", "answers": "a"}"#,
            r#""just a string""#,
        ]
        .join(",");

        assert!(load(&source).is_empty());
    }

    #[test]
    fn malformed_input_yields_no_questions() {
        assert!(load("").is_empty());
        assert!(load("{\"question\": ").is_empty());
        assert!(load("[1, 2").is_empty());
        assert!(load("\"text\"]").is_empty());
    }

    #[test]
    fn missing_file_yields_no_questions() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_file(dir.path().join("absent.txt")).is_empty());
    }

    #[test]
    fn truthiness_follows_json_values() {
        assert!(is_truthy(&serde_json::json!(true)));
        assert!(is_truthy(&serde_json::json!(2)));
        assert!(is_truthy(&serde_json::json!("x")));
        assert!(!is_truthy(&serde_json::json!(0)));
        assert!(!is_truthy(&serde_json::json!("")));
        assert!(!is_truthy(&serde_json::json!(null)));
        assert!(!is_truthy(&serde_json::json!([])));
    }
}
