use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::config::ApiConfig;
use crate::errors::ClientError;
use crate::models::{
    CategoriesResponse, Question, QuestionPayload, QuestionRecord, QuestionsResponse,
    SaveResponse, UserSummary, UsersResponse, questions_from_values,
};
use crate::{log_api_error, log_api_start, log_api_success};

/// The REST API the client talks to. Controllers only see this seam, so tests can
/// swap in an in-memory implementation.
#[async_trait]
pub trait QuizGateway: Send + Sync {
    /// Raw category list, sentinels included
    async fn list_categories(&self) -> Result<Vec<String>, ClientError>;

    /// Questions, optionally narrowed server-side by `category`
    async fn list_questions(&self, category: Option<&str>) -> Result<Vec<Question>, ClientError>;

    async fn get_question(&self, id: i64) -> Result<Question, ClientError>;

    /// Returns the new id when the server reports one
    async fn create_question(&self, payload: &QuestionPayload) -> Result<Option<i64>, ClientError>;

    async fn update_question(&self, id: i64, payload: &QuestionPayload) -> Result<(), ClientError>;

    async fn delete_question(&self, id: i64) -> Result<(), ClientError>;

    async fn list_users(&self) -> Result<Vec<UserSummary>, ClientError>;

    async fn list_user_questions(&self, username: &str) -> Result<Vec<Question>, ClientError>;
}

/// `reqwest`-backed gateway
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session_cookie: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_cookie: None,
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        let mut client = Self::new(config.base_url.clone());
        client.session_cookie = config.session_cookie.clone();
        client
    }

    pub fn with_session_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.session_cookie = Some(cookie.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.session_cookie {
            Some(cookie) => request.header(reqwest::header::COOKIE, cookie),
            None => request,
        }
    }

    /// Send a request and turn transport errors and non-success statuses into `ClientError`
    async fn send(&self, operation: &str, request: RequestBuilder) -> Result<Response, ClientError> {
        let response = self.authorize(request).send().await.map_err(|e| {
            log_api_error!(operation, error = e, "transport failure");
            ClientError::Transport(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            log_api_error!(operation, status = status, "non-success status");
            return Err(ClientError::Status(status));
        }
        Ok(response)
    }

    async fn read_json<T: DeserializeOwned>(operation: &str, response: Response) -> Result<T, ClientError> {
        let body = response.text().await.map_err(|e| {
            log_api_error!(operation, error = e, "failed to read body");
            ClientError::Transport(e)
        })?;
        serde_json::from_str(&body).map_err(|e| {
            log_api_error!(operation, error = e, "malformed JSON body");
            ClientError::Decode(e.to_string())
        })
    }
}

#[async_trait]
impl QuizGateway for ApiClient {
    async fn list_categories(&self) -> Result<Vec<String>, ClientError> {
        log_api_start!("list_categories", path = "/api/categories");
        let response = self
            .send("list_categories", self.client.get(self.url("/api/categories")))
            .await?;
        let body: CategoriesResponse = Self::read_json("list_categories", response).await?;
        log_api_success!("list_categories", count = body.categories.len(), "categories loaded");
        Ok(body.categories)
    }

    async fn list_questions(&self, category: Option<&str>) -> Result<Vec<Question>, ClientError> {
        log_api_start!("list_questions", path = "/api/questions");
        let mut request = self.client.get(self.url("/api/questions"));
        if let Some(category) = category.filter(|c| !c.is_empty()) {
            request = request.query(&[("category", category)]);
        }
        let response = self.send("list_questions", request).await?;
        let body: QuestionsResponse = Self::read_json("list_questions", response).await?;
        let questions = questions_from_values(body.questions);
        log_api_success!("list_questions", count = questions.len(), "questions loaded");
        Ok(questions)
    }

    async fn get_question(&self, id: i64) -> Result<Question, ClientError> {
        log_api_start!("get_question", question_id = id);
        let response = self
            .send("get_question", self.client.get(self.url(&format!("/api/questions/{}", id))))
            .await?;
        let record: QuestionRecord = Self::read_json("get_question", response).await?;
        log_api_success!("get_question", question_id = id, "question loaded");
        Ok(Question::from(record))
    }

    async fn create_question(&self, payload: &QuestionPayload) -> Result<Option<i64>, ClientError> {
        log_api_start!("create_question", path = "/api/questions");
        let response = self
            .send("create_question", self.client.post(self.url("/api/questions")).json(payload))
            .await?;
        // The status alone means success; the body only tells us the new id.
        let body = response.text().await.unwrap_or_default();
        let saved: SaveResponse = serde_json::from_str(&body).unwrap_or_default();
        log_api_success!("create_question", "question created");
        Ok(saved.id)
    }

    async fn update_question(&self, id: i64, payload: &QuestionPayload) -> Result<(), ClientError> {
        log_api_start!("update_question", question_id = id);
        self.send(
            "update_question",
            self.client
                .put(self.url(&format!("/api/questions/{}", id)))
                .json(payload),
        )
        .await?;
        log_api_success!("update_question", question_id = id, "question updated");
        Ok(())
    }

    async fn delete_question(&self, id: i64) -> Result<(), ClientError> {
        log_api_start!("delete_question", question_id = id);
        self.send(
            "delete_question",
            self.client.delete(self.url(&format!("/api/questions/{}", id))),
        )
        .await?;
        log_api_success!("delete_question", question_id = id, "question deleted");
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<UserSummary>, ClientError> {
        log_api_start!("list_users", path = "/api/admin/users");
        let response = self
            .send("list_users", self.client.get(self.url("/api/admin/users")))
            .await?;
        let body: UsersResponse = Self::read_json("list_users", response).await?;
        log_api_success!("list_users", count = body.users.len(), "users loaded");
        Ok(body.users)
    }

    async fn list_user_questions(&self, username: &str) -> Result<Vec<Question>, ClientError> {
        log_api_start!("list_user_questions", path = "/api/admin/questions");
        let request = self
            .client
            .get(self.url("/api/admin/questions"))
            .query(&[("username", username)]);
        let response = self.send("list_user_questions", request).await?;
        let body: QuestionsResponse = Self::read_json("list_user_questions", response).await?;
        let questions = questions_from_values(body.questions);
        log_api_success!("list_user_questions", count = questions.len(), "user questions loaded");
        Ok(questions)
    }
}
