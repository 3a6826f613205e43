use chrono::{DateTime, Utc};
use rand::Rng;
use uuid::Uuid;

use crate::category::FolderScope;
use crate::errors::ClientError;
use crate::grading::{GradeOutcome, Response, grade, is_submittable};
use crate::log_quiz_event;
use crate::models::{Question, WrongAnswer};
use crate::shuffler::shuffle_choices;

/// One run through a fixed, already shuffled question set
#[derive(Debug, Clone)]
pub struct QuizSession {
    id: Uuid,
    scope: FolderScope,
    started_at: DateTime<Utc>,
    questions: Vec<Question>,
    cursor: usize,
    score: usize,
    wrong_list: Vec<WrongAnswer>,
}

impl QuizSession {
    fn new(scope: FolderScope, questions: Vec<Question>) -> Self {
        Self {
            id: Uuid::new_v4(),
            scope,
            started_at: Utc::now(),
            questions,
            cursor: 0,
            score: 0,
            wrong_list: Vec::new(),
        }
    }

    fn restart(&mut self) {
        self.cursor = 0;
        self.score = 0;
        self.wrong_list.clear();
        self.started_at = Utc::now();
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn scope(&self) -> &FolderScope {
        &self.scope
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn wrong_list(&self) -> &[WrongAnswer] {
        &self.wrong_list
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.cursor)
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= self.questions.len()
    }
}

/// Result view shown once every question has been answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSummary {
    pub session_id: Uuid,
    pub scope: FolderScope,
    pub score: usize,
    pub total: usize,
    pub wrong_list: Vec<WrongAnswer>,
}

impl QuizSummary {
    pub fn all_correct(&self) -> bool {
        self.wrong_list.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub enum QuizState {
    #[default]
    Idle,
    Running(QuizSession),
    Finished(QuizSession),
}

/// Quiz flow: `Idle -> Running -> Finished`, retry back to `Running`, return to `Idle`
#[derive(Debug, Default)]
pub struct QuizRunner {
    state: QuizState,
}

impl QuizRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &QuizState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, QuizState::Idle)
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, QuizState::Running(_))
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, QuizState::Finished(_))
    }

    pub fn session(&self) -> Option<&QuizSession> {
        match &self.state {
            QuizState::Idle => None,
            QuizState::Running(session) | QuizState::Finished(session) => Some(session),
        }
    }

    /// Filter `questions` by `scope`, shuffle their choices and begin a new session.
    ///
    /// An empty selection is rejected and leaves the current state untouched.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        scope: FolderScope,
        questions: Vec<Question>,
        rng: &mut R,
    ) -> Result<(), ClientError> {
        let selected: Vec<Question> = questions
            .iter()
            .filter(|q| scope.matches(&q.category))
            .map(|q| shuffle_choices(q, rng))
            .collect();

        if selected.is_empty() {
            return Err(ClientError::EmptyScope);
        }

        let session = QuizSession::new(scope, selected);
        log_quiz_event!(
            start,
            session_id = session.id,
            scope = session.scope,
            question_count = session.total()
        );
        self.state = QuizState::Running(session);
        Ok(())
    }

    pub fn current_question(&self) -> Option<&Question> {
        match &self.state {
            QuizState::Running(session) => session.current_question(),
            _ => None,
        }
    }

    /// Whether the submit action should be enabled for this response
    pub fn can_submit(&self, response: &Response) -> bool {
        self.current_question()
            .is_some_and(|question| is_submittable(question, response))
    }

    /// Grade the current question and move on; the last answer finishes the session
    pub fn submit(&mut self, response: &Response) -> Result<GradeOutcome, ClientError> {
        let QuizState::Running(session) = &mut self.state else {
            return Err(ClientError::InvalidState("no quiz is running".to_string()));
        };
        let Some(question) = session.questions.get(session.cursor) else {
            return Err(ClientError::InvalidState("every question is already answered".to_string()));
        };

        let outcome = grade(question, response)?;
        if outcome.correct {
            session.score += 1;
        } else {
            session.wrong_list.push(WrongAnswer {
                question_text: question.text.clone(),
                your_answer: outcome.your_answer.clone(),
                correct_answer: outcome.correct_answer.clone(),
            });
        }
        session.cursor += 1;
        log_quiz_event!(
            answer,
            session_id = session.id,
            cursor = session.cursor,
            correct = outcome.correct
        );

        if session.is_complete() {
            if let QuizState::Running(session) = std::mem::take(&mut self.state) {
                log_quiz_event!(
                    finish,
                    session_id = session.id,
                    score = session.score,
                    total = session.total()
                );
                self.state = QuizState::Finished(session);
            }
        }

        Ok(outcome)
    }

    pub fn summary(&self) -> Option<QuizSummary> {
        match &self.state {
            QuizState::Finished(session) => Some(QuizSummary {
                session_id: session.id,
                scope: session.scope.clone(),
                score: session.score,
                total: session.total(),
                wrong_list: session.wrong_list.clone(),
            }),
            _ => None,
        }
    }

    /// Run the same questions again, in the same order, with counters reset
    pub fn retry(&mut self) -> Result<(), ClientError> {
        match std::mem::take(&mut self.state) {
            QuizState::Finished(mut session) => {
                session.restart();
                log_quiz_event!(restart, session_id = session.id);
                self.state = QuizState::Running(session);
                Ok(())
            }
            other => {
                self.state = other;
                Err(ClientError::InvalidState("only a finished quiz can be retried".to_string()))
            }
        }
    }

    /// Drop the session and go back to folder selection
    pub fn return_to_title(&mut self) {
        if let Some(session) = self.session() {
            log_quiz_event!(discard, session_id = session.id);
        }
        self.state = QuizState::Idle;
    }
}
