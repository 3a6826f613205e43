#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;
use school_quiz::category::{ALL_SENTINEL, UNCLASSIFIED_SENTINEL, parse_segments};
use school_quiz::{ClientError, Question, QuestionKind, QuestionPayload, QuizGateway, UserSummary};

#[derive(Debug, Default)]
pub struct FakeState {
    pub questions: Vec<Question>,
    pub users: Vec<UserSummary>,
    pub next_id: i64,
    /// Every call fails with this status while set
    pub fail_with: Option<StatusCode>,
    pub calls: Vec<String>,
}

/// In-memory stand-in for the quiz REST API
#[derive(Debug, Clone, Default)]
pub struct FakeGateway {
    pub state: Arc<Mutex<FakeState>>,
}

impl FakeGateway {
    pub fn with_questions(questions: Vec<Question>) -> Self {
        let next_id = questions.iter().map(|q| q.id).max().unwrap_or(0) + 1;
        let gateway = Self::default();
        {
            let mut state = gateway.state.lock().unwrap();
            state.questions = questions;
            state.next_id = next_id;
        }
        gateway
    }

    pub fn set_failure(&self, status: Option<StatusCode>) {
        self.state.lock().unwrap().fail_with = status;
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn question(&self, id: i64) -> Option<Question> {
        self.state.lock().unwrap().questions.iter().find(|q| q.id == id).cloned()
    }

    pub fn question_count(&self) -> usize {
        self.state.lock().unwrap().questions.len()
    }

    fn record(&self, call: String) -> Result<std::sync::MutexGuard<'_, FakeState>, ClientError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        let failure = state.fail_with;
        match failure {
            Some(status) => Err(ClientError::Status(status)),
            None => Ok(state),
        }
    }
}

fn in_prefix(category: &str, prefix: &str) -> bool {
    if prefix == UNCLASSIFIED_SENTINEL {
        return parse_segments(category).is_empty();
    }
    let wanted = parse_segments(prefix);
    let actual = parse_segments(category);
    actual.len() >= wanted.len() && actual[..wanted.len()] == wanted[..]
}

fn from_payload(id: i64, payload: &QuestionPayload) -> Question {
    Question {
        id,
        text: payload.text.clone(),
        explain: Some(payload.explain.clone()).filter(|e| !e.is_empty()),
        category: payload.category.clone(),
        owner: None,
        kind: payload.kind.clone(),
    }
}

#[async_trait]
impl QuizGateway for FakeGateway {
    async fn list_categories(&self) -> Result<Vec<String>, ClientError> {
        let state = self.record("list_categories".to_string())?;
        let mut categories = vec![ALL_SENTINEL.to_string()];
        let mut seen = BTreeSet::new();
        let mut has_unclassified = false;
        for question in &state.questions {
            if parse_segments(&question.category).is_empty() {
                has_unclassified = true;
            } else if seen.insert(question.category.clone()) {
                categories.push(question.category.clone());
            }
        }
        if has_unclassified {
            categories.push(UNCLASSIFIED_SENTINEL.to_string());
        }
        Ok(categories)
    }

    async fn list_questions(&self, category: Option<&str>) -> Result<Vec<Question>, ClientError> {
        let state = self.record(format!("list_questions:{}", category.unwrap_or("")))?;
        Ok(state
            .questions
            .iter()
            .filter(|q| category.is_none_or(|c| in_prefix(&q.category, c)))
            .cloned()
            .collect())
    }

    async fn get_question(&self, id: i64) -> Result<Question, ClientError> {
        let state = self.record(format!("get_question:{}", id))?;
        state
            .questions
            .iter()
            .find(|q| q.id == id)
            .cloned()
            .ok_or(ClientError::Status(StatusCode::NOT_FOUND))
    }

    async fn create_question(&self, payload: &QuestionPayload) -> Result<Option<i64>, ClientError> {
        let mut state = self.record("create_question".to_string())?;
        let id = state.next_id.max(1);
        state.next_id = id + 1;
        state.questions.push(from_payload(id, payload));
        Ok(Some(id))
    }

    async fn update_question(&self, id: i64, payload: &QuestionPayload) -> Result<(), ClientError> {
        let mut state = self.record(format!("update_question:{}", id))?;
        let slot = state
            .questions
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or(ClientError::Status(StatusCode::NOT_FOUND))?;
        *slot = from_payload(id, payload);
        Ok(())
    }

    async fn delete_question(&self, id: i64) -> Result<(), ClientError> {
        let mut state = self.record(format!("delete_question:{}", id))?;
        let before = state.questions.len();
        state.questions.retain(|q| q.id != id);
        if state.questions.len() == before {
            return Err(ClientError::Status(StatusCode::NOT_FOUND));
        }
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<UserSummary>, ClientError> {
        let state = self.record("list_users".to_string())?;
        Ok(state.users.clone())
    }

    async fn list_user_questions(&self, username: &str) -> Result<Vec<Question>, ClientError> {
        let state = self.record(format!("list_user_questions:{}", username))?;
        Ok(state
            .questions
            .iter()
            .filter(|q| q.owner.as_deref() == Some(username))
            .cloned()
            .collect())
    }
}

pub fn text_question(id: i64, category: &str, answers: &[&str]) -> Question {
    Question {
        id,
        text: format!("Question {}", id),
        explain: None,
        category: category.to_string(),
        owner: None,
        kind: QuestionKind::Text {
            answers: answers.iter().map(|a| a.to_string()).collect(),
        },
    }
}

pub fn single_question(id: i64, category: &str, choices: &[&str], answer: usize) -> Question {
    Question {
        id,
        text: format!("Question {}", id),
        explain: None,
        category: category.to_string(),
        owner: None,
        kind: QuestionKind::Single {
            choices: choices.iter().map(|c| c.to_string()).collect(),
            answer: Some(answer),
        },
    }
}
