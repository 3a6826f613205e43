use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use tracing::warn;

use crate::category::parse_segments;

/// Answer-shape discriminator carried on the wire as `qtype`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum QType {
    #[default]
    Single,
    Multi,
    Text,
    MultiText,
}

impl QType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "single" => Some(QType::Single),
            "multi" => Some(QType::Multi),
            "text" => Some(QType::Text),
            "multi-text" => Some(QType::MultiText),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QType::Single => "single",
            QType::Multi => "multi",
            QType::Text => "text",
            QType::MultiText => "multi-text",
        }
    }

    pub fn has_choices(&self) -> bool {
        matches!(self, QType::Single | QType::Multi)
    }
}

impl fmt::Display for QType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type-specific part of a question; each variant carries only the fields its `qtype` uses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionKind {
    /// `answer` is `None` when the server record pointed outside `choices`
    Single { choices: Vec<String>, answer: Option<usize> },
    Multi { choices: Vec<String>, answers: Vec<usize> },
    Text { answers: Vec<String> },
    MultiText { answers: Vec<String> },
}

impl QuestionKind {
    pub fn qtype(&self) -> QType {
        match self {
            QuestionKind::Single { .. } => QType::Single,
            QuestionKind::Multi { .. } => QType::Multi,
            QuestionKind::Text { .. } => QType::Text,
            QuestionKind::MultiText { .. } => QType::MultiText,
        }
    }

    pub fn choices(&self) -> &[String] {
        match self {
            QuestionKind::Single { choices, .. } | QuestionKind::Multi { choices, .. } => choices,
            QuestionKind::Text { .. } | QuestionKind::MultiText { .. } => &[],
        }
    }
}

/// Client-side snapshot of a question record owned by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: i64,
    pub text: String,
    pub explain: Option<String>,
    pub category: String,
    pub owner: Option<String>,
    pub kind: QuestionKind,
}

impl Question {
    pub fn qtype(&self) -> QType {
        self.kind.qtype()
    }

    pub fn choices(&self) -> &[String] {
        self.kind.choices()
    }

    pub fn category_segments(&self) -> Vec<String> {
        parse_segments(&self.category)
    }

    pub fn is_unclassified(&self) -> bool {
        self.category_segments().is_empty()
    }

    /// Number of free-text inputs the quiz view offers: one per expected answer, at least two
    pub fn multi_text_slots(&self) -> usize {
        match &self.kind {
            QuestionKind::MultiText { answers } => answers.len().max(2),
            QuestionKind::Text { .. } => 1,
            _ => 0,
        }
    }
}

/// Loosely-typed question record as the server sends it.
///
/// Only `id` is required; every other field is kept as raw JSON and narrowed in
/// `From<QuestionRecord>`, so null or wrong-typed values fall back instead of failing.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionRecord {
    pub id: i64,
    #[serde(default)]
    pub text: Value,
    #[serde(default)]
    pub explain: Value,
    #[serde(default)]
    pub category: Value,
    #[serde(default)]
    pub qtype: Value,
    #[serde(default)]
    pub choices: Value,
    #[serde(default)]
    pub answer: Value,
    #[serde(default)]
    pub answers: Value,
    #[serde(default)]
    pub owner: Value,
}

fn index_from_value(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => n.as_u64().map(|n| n as usize),
        Value::String(s) => s.trim().parse::<usize>().ok(),
        _ => None,
    }
}

fn text_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn string_field(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

/// Elements of a JSON array; anything else reads as empty
fn array_field(value: &Value) -> &[Value] {
    value.as_array().map(Vec::as_slice).unwrap_or_default()
}

impl From<QuestionRecord> for Question {
    fn from(record: QuestionRecord) -> Self {
        let qtype = match record.qtype.as_str().map(str::trim) {
            None | Some("") => QType::Single,
            Some(raw) => QType::parse(raw).unwrap_or_else(|| {
                warn!(question_id = record.id, qtype = %raw, "Unknown qtype, treating as single");
                QType::Single
            }),
        };

        let choices: Vec<String> = array_field(&record.choices)
            .iter()
            .map(|c| text_from_value(c).unwrap_or_default())
            .collect();
        let raw_answers = array_field(&record.answers);

        let kind = match qtype {
            QType::Single => {
                let answer = index_from_value(&record.answer).filter(|idx| *idx < choices.len());
                QuestionKind::Single { choices, answer }
            }
            QType::Multi => {
                let mut answers: Vec<usize> = Vec::new();
                for idx in raw_answers.iter().filter_map(index_from_value) {
                    if idx < choices.len() && !answers.contains(&idx) {
                        answers.push(idx);
                    }
                }
                QuestionKind::Multi { choices, answers }
            }
            QType::Text => QuestionKind::Text {
                answers: raw_answers.iter().filter_map(text_from_value).collect(),
            },
            QType::MultiText => QuestionKind::MultiText {
                answers: raw_answers.iter().filter_map(text_from_value).collect(),
            },
        };

        Question {
            id: record.id,
            text: string_field(&record.text).unwrap_or_default(),
            explain: string_field(&record.explain).filter(|e| !e.trim().is_empty()),
            category: string_field(&record.category).unwrap_or_default(),
            owner: string_field(&record.owner),
            kind,
        }
    }
}

/// Decode a list of raw records, skipping the ones that cannot be read at all
pub fn questions_from_values(values: Vec<Value>) -> Vec<Question> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<QuestionRecord>(value) {
            Ok(record) => Some(Question::from(record)),
            Err(e) => {
                warn!(error = %e, "Skipping malformed question record");
                None
            }
        })
        .collect()
}

/// Validated body for create/update requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionPayload {
    pub text: String,
    pub explain: String,
    pub category: String,
    pub kind: QuestionKind,
}

#[derive(Serialize)]
struct PayloadWire<'a> {
    text: &'a str,
    explain: &'a str,
    category: &'a str,
    qtype: QType,
    choices: &'a [String],
    answer: usize,
    answers: Value,
}

// The server stores the body verbatim, so unused fields keep their neutral legacy values.
impl Serialize for QuestionPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (answer, answers) = match &self.kind {
            QuestionKind::Single { answer, .. } => (answer.unwrap_or(0), Value::Array(vec![])),
            QuestionKind::Multi { answers, .. } => (0, serde_json::json!(answers)),
            QuestionKind::Text { answers } | QuestionKind::MultiText { answers } => {
                (0, serde_json::json!(answers))
            }
        };

        PayloadWire {
            text: &self.text,
            explain: &self.explain,
            category: &self.category,
            qtype: self.kind.qtype(),
            choices: self.kind.choices(),
            answer,
            answers,
        }
        .serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub username: String,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_admin: bool,
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Value::deserialize(deserializer)?.as_bool().unwrap_or(false))
}

/// A list field that reads null or a non-array as empty and skips elements of the wrong shape
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        if !value.is_null() {
            warn!("Expected a list in the response, treating it as empty");
        }
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoriesResponse {
    #[serde(default, deserialize_with = "lenient_list")]
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionsResponse {
    #[serde(default, deserialize_with = "lenient_list")]
    pub questions: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsersResponse {
    #[serde(default, deserialize_with = "lenient_list")]
    pub users: Vec<UserSummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaveResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub id: Option<i64>,
}

/// One entry of the end-of-quiz review
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrongAnswer {
    pub question_text: String,
    pub your_answer: String,
    pub correct_answer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

/// User-visible notification; rendering it is up to the UI adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}
