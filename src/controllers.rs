use std::collections::BTreeSet;

use rand::Rng;
use tracing::{info, warn};

use crate::api_client::QuizGateway;
use crate::category::{CategoryFilterOptions, CategoryTree, FolderSelector, segment_suggestions};
use crate::errors::{ClientError, ErrorContext};
use crate::grading::{GradeOutcome, Response};
use crate::models::{Notice, Question, UserSummary};
use crate::question_form::QuestionForm;
use crate::quiz_runner::{QuizRunner, QuizSummary};

/// Student-facing view: folder picker plus the quiz runner
pub struct QuizController<G: QuizGateway> {
    gateway: G,
    selector: FolderSelector,
    runner: QuizRunner,
}

impl<G: QuizGateway> QuizController<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            selector: FolderSelector::default(),
            runner: QuizRunner::new(),
        }
    }

    pub fn selector(&self) -> &FolderSelector {
        &self.selector
    }

    pub fn selector_mut(&mut self) -> &mut FolderSelector {
        &mut self.selector
    }

    pub fn runner(&self) -> &QuizRunner {
        &self.runner
    }

    /// Fetch categories and rebuild the folder tree; the selection goes back to "(all)"
    pub async fn load_categories(&mut self) -> Result<(), Notice> {
        let categories = self
            .gateway
            .list_categories()
            .await
            .map_err(|e| e.to_notice_with_context(ErrorContext::new("load", "categories")))?;
        self.selector.reset(CategoryTree::from_categories(&categories));
        Ok(())
    }

    /// Fetch every question, keep the ones inside the selected folder and start a new session.
    ///
    /// On any failure the runner keeps its previous state.
    pub async fn start_quiz<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), Notice> {
        let questions = self
            .gateway
            .list_questions(None)
            .await
            .map_err(|e| e.to_notice_with_context(ErrorContext::new("load", "questions")))?;

        let scope = self.selector.scope();
        self.runner.start(scope, questions, rng).map_err(|e| {
            e.to_notice_with_context(
                ErrorContext::new("start", "quiz").with_id(&self.selector.label()),
            )
        })
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.runner.current_question()
    }

    pub fn can_submit(&self, response: &Response) -> bool {
        self.runner.can_submit(response)
    }

    pub fn submit(&mut self, response: &Response) -> Result<GradeOutcome, Notice> {
        self.runner
            .submit(response)
            .map_err(|e| e.to_notice_with_context(ErrorContext::new("submit", "answer")))
    }

    pub fn summary(&self) -> Option<QuizSummary> {
        self.runner.summary()
    }

    pub fn retry(&mut self) -> Result<(), Notice> {
        self.runner
            .retry()
            .map_err(|e| e.to_notice_with_context(ErrorContext::new("retry", "quiz")))
    }

    pub fn return_to_title(&mut self) {
        self.runner.return_to_title();
    }
}

/// Admin question editor: the form, the filtered question list and category helpers
pub struct AdminEditor<G: QuizGateway> {
    gateway: G,
    form: QuestionForm,
    questions: Vec<Question>,
    filter: CategoryFilterOptions,
    suggestions: BTreeSet<String>,
}

impl<G: QuizGateway> AdminEditor<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            form: QuestionForm::new(),
            questions: Vec::new(),
            filter: CategoryFilterOptions::default(),
            suggestions: BTreeSet::new(),
        }
    }

    pub fn form(&self) -> &QuestionForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut QuestionForm {
        &mut self.form
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn filter(&self) -> &CategoryFilterOptions {
        &self.filter
    }

    /// Known path segments for the category builder
    pub fn suggestions(&self) -> &BTreeSet<String> {
        &self.suggestions
    }

    /// Reload the list with the current filter
    pub async fn refresh_list(&mut self) -> Result<(), Notice> {
        let filter = self.filter.selected().to_string();
        let category = (!filter.is_empty()).then_some(filter.as_str());
        self.questions = self.gateway.list_questions(category).await.map_err(|e| {
            e.to_notice_with_context(
                ErrorContext::new("load", "question list").with_user_message("Failed to load the question list"),
            )
        })?;
        Ok(())
    }

    /// Pick a filter value (empty for everything) and reload the list
    pub async fn apply_filter(&mut self, value: &str) -> Result<(), Notice> {
        self.filter
            .select(value)
            .map_err(|e| e.to_notice_with_context(ErrorContext::new("filter", "question list")))?;
        self.refresh_list().await
    }

    /// Rebuild segment suggestions and filter options from the server's category list
    pub async fn refresh_categories(&mut self) -> Result<(), Notice> {
        let categories = self
            .gateway
            .list_categories()
            .await
            .map_err(|e| e.to_notice_with_context(ErrorContext::new("load", "categories")))?;
        self.suggestions = segment_suggestions(&categories);
        self.filter.refresh(&categories);
        Ok(())
    }

    /// Fetch a question and switch the form to edit mode
    pub async fn edit(&mut self, id: i64) -> Notice {
        match self.gateway.get_question(id).await {
            Ok(question) => {
                self.form.load(&question);
                Notice::success("Switched to edit mode")
            }
            Err(e) => e.to_notice_with_context(
                ErrorContext::new("load", "question")
                    .with_id(&id.to_string())
                    .with_user_message("Failed to load the question for editing"),
            ),
        }
    }

    /// Validate and submit the form; creates in new-entry mode, updates in edit mode
    pub async fn save(&mut self) -> Notice {
        let payload = match self.form.build_payload() {
            Ok(payload) => payload,
            Err(e) => return e.to_notice_with_context(ErrorContext::new("save", "question")),
        };

        let result = match self.form.editing_id() {
            Some(id) => self.gateway.update_question(id, &payload).await.map(|_| Some(id)),
            None => self.gateway.create_question(&payload).await,
        };

        match result {
            Ok(id) => {
                info!(question_id = ?id, qtype = %payload.kind.qtype(), "Question saved");
                self.form.reset();
                self.refresh_after_change().await;
                Notice::success("Saved")
            }
            Err(e) => {
                let mut context = ErrorContext::new("save", "question");
                if let Some(id) = self.form.editing_id() {
                    context = context.with_id(&id.to_string());
                }
                e.to_notice_with_context(context)
            }
        }
    }

    /// Delete a question; the caller is responsible for asking for confirmation first
    pub async fn delete(&mut self, id: i64) -> Notice {
        match self.gateway.delete_question(id).await {
            Ok(()) => {
                self.refresh_after_change().await;
                Notice::success("Deleted")
            }
            Err(e) => e.to_notice_with_context(ErrorContext::new("delete", "question").with_id(&id.to_string())),
        }
    }

    /// Drop any edit in progress and go back to new-entry mode
    pub fn cancel_edit(&mut self) {
        self.form.reset();
    }

    async fn refresh_after_change(&mut self) {
        if let Err(notice) = self.refresh_list().await {
            warn!(message = %notice.message, "List refresh after change failed");
        }
        if let Err(notice) = self.refresh_categories().await {
            warn!(message = %notice.message, "Category refresh after change failed");
        }
    }
}

/// Admin view listing users and the questions each one owns
pub struct AdminUserBrowser<G: QuizGateway> {
    gateway: G,
    users: Vec<UserSummary>,
    selected: Option<String>,
    questions: Vec<Question>,
}

impl<G: QuizGateway> AdminUserBrowser<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            users: Vec::new(),
            selected: None,
            questions: Vec::new(),
        }
    }

    pub fn users(&self) -> &[UserSummary] {
        &self.users
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub async fn load_users(&mut self) -> Result<(), Notice> {
        self.users = self
            .gateway
            .list_users()
            .await
            .map_err(|e| e.to_notice_with_context(ErrorContext::new("load", "users")))?;
        Ok(())
    }

    /// Show the questions owned by `username`; the previous selection stays on failure
    pub async fn show_questions(&mut self, username: &str) -> Result<(), Notice> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ClientError::validation("Pick a user first")
                .to_notice_with_context(ErrorContext::new("load", "user questions")));
        }
        let questions = self.gateway.list_user_questions(username).await.map_err(|e| {
            e.to_notice_with_context(ErrorContext::new("load", "user questions").with_id(username))
        })?;
        self.selected = Some(username.to_string());
        self.questions = questions;
        Ok(())
    }
}
