//! Task directives embedded in assistant responses.
//!
//! A response is scanned line by line once it has been fully received. Lines
//! of the form
//!
//! ```text
//! ADD_TASK|category|text[|schedule[|priority]]
//! REMOVE_TASK|fragment
//! ```
//!
//! become [`Directive`]s. The keyword and its `|` must open the line; indented
//! or spaced-out lines, and directive lines with too few fields, are prose.

use rand::Rng;
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

const ADD_PREFIX: &str = "ADD_TASK|";
const REMOVE_PREFIX: &str = "REMOVE_TASK|";
const FIELD_SEP: char = '|';
const ID_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Directive {
    AddTask {
        category: String,
        text: String,
        schedule: Option<String>,
        /// Carried for display; not used when resolving tasks.
        priority: Option<String>,
    },
    RemoveTask {
        fragment: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedResponse {
    pub directives: Vec<Directive>,
    /// Non-directive lines rejoined in order, trimmed.
    pub prose: String,
}

pub fn parse_response(text: &str) -> ParsedResponse {
    let mut directives = Vec::new();
    let mut prose = Vec::new();

    for line in text.split('\n') {
        match parse_line(line) {
            Some(d) => directives.push(d),
            None => prose.push(line),
        }
    }

    ParsedResponse {
        directives,
        prose: prose.join("\n").trim().to_string(),
    }
}

fn parse_line(line: &str) -> Option<Directive> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if let Some(rest) = line.strip_prefix(ADD_PREFIX) {
        let parts: Vec<&str> = rest.split(FIELD_SEP).map(str::trim).collect();
        if parts.len() < 2 {
            return None;
        }
        return Some(Directive::AddTask {
            category: parts[0].to_lowercase(),
            text: parts[1].to_string(),
            schedule: non_empty(parts.get(2)),
            priority: non_empty(parts.get(3)),
        });
    }
    let rest = line.strip_prefix(REMOVE_PREFIX)?;
    let fragment = rest.split(FIELD_SEP).next().unwrap_or_default().trim();
    Some(Directive::RemoveTask {
        fragment: fragment.to_string(),
    })
}

fn non_empty(field: Option<&&str>) -> Option<String> {
    field.filter(|s| !s.is_empty()).map(|s| s.to_string())
}

/// `custom-{unix_millis}-{9 base36 chars}`.
pub fn synthesize_task_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("custom-{millis}-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_task_with_all_fields() {
        let parsed = parse_response(
            "Sure, adding it now.\nADD_TASK|japanese|Kanji drill|Daily|high\nGood luck!",
        );
        assert_eq!(
            parsed.directives,
            vec![Directive::AddTask {
                category: "japanese".into(),
                text: "Kanji drill".into(),
                schedule: Some("Daily".into()),
                priority: Some("high".into()),
            }]
        );
        assert_eq!(parsed.prose, "Sure, adding it now.\nGood luck!");
    }

    #[test]
    fn category_is_lower_cased_and_empty_schedule_dropped() {
        let parsed = parse_response("ADD_TASK|AIML|Read a paper||medium");
        match &parsed.directives[0] {
            Directive::AddTask {
                category,
                schedule,
                priority,
                ..
            } => {
                assert_eq!(category, "aiml");
                assert!(schedule.is_none());
                assert_eq!(priority.as_deref(), Some("medium"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(parsed.prose, "");
    }

    #[test]
    fn remove_task() {
        let parsed = parse_response("REMOVE_TASK|duolingo\nDone.");
        assert_eq!(
            parsed.directives,
            vec![Directive::RemoveTask {
                fragment: "duolingo".into()
            }]
        );
        assert_eq!(parsed.prose, "Done.");
    }

    #[test]
    fn malformed_directives_stay_prose() {
        let text = "ADD_TASK|japanese\nREMOVE_TASK\nadd_task|goals|lower keyword";
        let parsed = parse_response(text);
        assert!(parsed.directives.is_empty());
        assert_eq!(parsed.prose, text);
    }

    #[test]
    fn keyword_must_open_the_line() {
        let text = "Example syntax:\n    ADD_TASK|goals|Example task\nREMOVE_TASK | is how you remove";
        let parsed = parse_response(text);
        assert!(parsed.directives.is_empty());
        assert_eq!(parsed.prose, text);
    }

    #[test]
    fn carriage_return_is_ignored() {
        let parsed = parse_response("REMOVE_TASK|anki\r\nOk\r");
        assert_eq!(
            parsed.directives,
            vec![Directive::RemoveTask {
                fragment: "anki".into()
            }]
        );
        assert_eq!(parsed.prose, "Ok");
    }

    #[test]
    fn plain_text_has_no_directives() {
        let parsed = parse_response("  Hello there  \n\n");
        assert!(parsed.directives.is_empty());
        assert_eq!(parsed.prose, "Hello there");
    }

    #[test]
    fn directives_keep_response_order() {
        let parsed = parse_response("REMOVE_TASK|anki\nADD_TASK|goals|Ship it");
        assert!(matches!(parsed.directives[0], Directive::RemoveTask { .. }));
        assert!(matches!(parsed.directives[1], Directive::AddTask { .. }));
    }

    #[test]
    fn synthesized_ids_have_expected_shape() {
        let id = synthesize_task_id();
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "custom");
        assert!(parts[1].parse::<u128>().is_ok());
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2].chars().all(|c| c.is_ascii_alphanumeric() && !c.is_ascii_uppercase()));
        assert_ne!(synthesize_task_id(), synthesize_task_id());
    }
}
