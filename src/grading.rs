use std::collections::BTreeSet;

use crate::errors::ClientError;
use crate::models::{QType, Question, QuestionKind};
use crate::normalizer::{matches_any, normalize};

const DISPLAY_SEPARATOR: &str = " / ";

/// What the user entered for one question
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Single(usize),
    Multi(Vec<usize>),
    Text(String),
    MultiText(Vec<String>),
}

impl Response {
    pub fn qtype(&self) -> QType {
        match self {
            Response::Single(_) => QType::Single,
            Response::Multi(_) => QType::Multi,
            Response::Text(_) => QType::Text,
            Response::MultiText(_) => QType::MultiText,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeOutcome {
    pub correct: bool,
    pub your_answer: String,
    pub correct_answer: String,
}

fn filled_entries(entries: &[String]) -> Vec<&str> {
    entries
        .iter()
        .map(|e| e.trim())
        .filter(|e| !e.is_empty())
        .collect()
}

fn choice_texts(choices: &[String], indices: &[usize]) -> String {
    indices
        .iter()
        .filter_map(|&i| choices.get(i).map(String::as_str))
        .collect::<Vec<_>>()
        .join(DISPLAY_SEPARATOR)
}

/// Whether the response has a shape the submit button would accept for this question
pub fn is_submittable(question: &Question, response: &Response) -> bool {
    match (&question.kind, response) {
        (QuestionKind::Single { choices, .. }, Response::Single(selected)) => *selected < choices.len(),
        (QuestionKind::Multi { choices, .. }, Response::Multi(checked)) => {
            !checked.is_empty() && checked.iter().all(|&i| i < choices.len())
        }
        (QuestionKind::Text { .. }, Response::Text(input)) => !input.trim().is_empty(),
        (QuestionKind::MultiText { .. }, Response::MultiText(entries)) => {
            !filled_entries(entries).is_empty()
        }
        _ => false,
    }
}

/// Grade a response; all-or-nothing, no partial credit
pub fn grade(question: &Question, response: &Response) -> Result<GradeOutcome, ClientError> {
    if !is_submittable(question, response) {
        return Err(ClientError::validation(format!(
            "Answer the {} question before submitting",
            question.qtype()
        )));
    }

    let outcome = match (&question.kind, response) {
        (QuestionKind::Single { choices, answer }, Response::Single(selected)) => GradeOutcome {
            correct: *answer == Some(*selected),
            your_answer: choices[*selected].clone(),
            correct_answer: answer
                .and_then(|a| choices.get(a).cloned())
                .unwrap_or_default(),
        },
        (QuestionKind::Multi { choices, answers }, Response::Multi(checked)) => {
            let checked_set: BTreeSet<usize> = checked.iter().copied().collect();
            let expected_set: BTreeSet<usize> = answers.iter().copied().collect();
            GradeOutcome {
                correct: checked_set == expected_set,
                your_answer: choice_texts(choices, checked),
                correct_answer: choice_texts(choices, answers),
            }
        }
        (QuestionKind::Text { answers }, Response::Text(input)) => GradeOutcome {
            correct: matches_any(input, answers),
            your_answer: input.trim().to_string(),
            correct_answer: answers.join(DISPLAY_SEPARATOR),
        },
        (QuestionKind::MultiText { answers }, Response::MultiText(entries)) => {
            let filled = filled_entries(entries);
            let correct = filled.len() == answers.len() && {
                let mut user: Vec<String> = filled.iter().map(|e| normalize(e)).collect();
                let mut expected: Vec<String> = answers.iter().map(|a| normalize(a)).collect();
                user.sort();
                expected.sort();
                user == expected
            };
            GradeOutcome {
                correct,
                your_answer: filled.join(DISPLAY_SEPARATOR),
                correct_answer: answers.join(DISPLAY_SEPARATOR),
            }
        }
        _ => unreachable!("is_submittable rejects mismatched kinds"),
    };

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(kind: QuestionKind) -> Question {
        Question {
            id: 1,
            text: "Q".into(),
            explain: None,
            category: String::new(),
            owner: None,
            kind,
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_single_grading() {
        let q = question(QuestionKind::Single {
            choices: strings(&["a", "b", "c"]),
            answer: Some(1),
        });
        let right = grade(&q, &Response::Single(1)).unwrap();
        assert!(right.correct);
        let wrong = grade(&q, &Response::Single(2)).unwrap();
        assert!(!wrong.correct);
        assert_eq!(wrong.your_answer, "c");
        assert_eq!(wrong.correct_answer, "b");
        assert!(grade(&q, &Response::Single(3)).is_err());
    }

    #[test]
    fn test_single_without_valid_answer_is_never_correct() {
        let q = question(QuestionKind::Single {
            choices: strings(&["a", "b"]),
            answer: None,
        });
        let outcome = grade(&q, &Response::Single(0)).unwrap();
        assert!(!outcome.correct);
        assert_eq!(outcome.correct_answer, "");
    }

    #[test]
    fn test_multi_grading_is_order_independent() {
        let q = question(QuestionKind::Multi {
            choices: strings(&["a", "b", "c"]),
            answers: vec![0, 2],
        });
        assert!(grade(&q, &Response::Multi(vec![2, 0])).unwrap().correct);
        let partial = grade(&q, &Response::Multi(vec![0])).unwrap();
        assert!(!partial.correct);
        assert_eq!(partial.your_answer, "a");
        assert_eq!(partial.correct_answer, "a / c");
        assert!(!grade(&q, &Response::Multi(vec![0, 1, 2])).unwrap().correct);
        assert!(grade(&q, &Response::Multi(vec![])).is_err());
    }

    #[test]
    fn test_text_grading_accepts_any_answer() {
        let q = question(QuestionKind::Text {
            answers: strings(&["paris", "London"]),
        });
        let outcome = grade(&q, &Response::Text(" Paris ".into())).unwrap();
        assert!(outcome.correct);
        assert!(grade(&q, &Response::Text("LON DON".into())).unwrap().correct);
        let wrong = grade(&q, &Response::Text(" Rome".into())).unwrap();
        assert!(!wrong.correct);
        assert_eq!(wrong.your_answer, "Rome");
        assert_eq!(wrong.correct_answer, "paris / London");
        assert!(grade(&q, &Response::Text("   ".into())).is_err());
    }

    #[test]
    fn test_multi_text_requires_equal_counts() {
        let q = question(QuestionKind::MultiText {
            answers: strings(&["Na", "Cl"]),
        });
        assert!(grade(&q, &Response::MultiText(strings(&["cl", " na "]))).unwrap().correct);
        assert!(
            !grade(&q, &Response::MultiText(strings(&["na", "cl", "na"])))
                .unwrap()
                .correct
        );
        let short = grade(&q, &Response::MultiText(strings(&["na", ""]))).unwrap();
        assert!(!short.correct);
        assert_eq!(short.your_answer, "na");
    }

    #[test]
    fn test_multi_text_is_a_multiset_comparison() {
        let q = question(QuestionKind::MultiText {
            answers: strings(&["x", "x", "y"]),
        });
        assert!(!grade(&q, &Response::MultiText(strings(&["x", "y", "y"]))).unwrap().correct);
        assert!(grade(&q, &Response::MultiText(strings(&["y", "X", "x"]))).unwrap().correct);
    }

    #[test]
    fn test_mismatched_response_kind_is_rejected() {
        let q = question(QuestionKind::Text {
            answers: strings(&["a"]),
        });
        assert!(!is_submittable(&q, &Response::Single(0)));
        assert!(grade(&q, &Response::Single(0)).is_err());
    }
}
