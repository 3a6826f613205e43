use reqwest::StatusCode;
use tracing::{error, warn};

use crate::models::Notice;

/// Centralized error type for everything the client core can reject or fail at
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No questions in the selected folder")]
    EmptyScope,

    #[error("Invalid quiz state: {0}")]
    InvalidState(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Request failed with status {0}")]
    Status(StatusCode),

    #[error("Malformed response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        ClientError::Validation(message.into())
    }

    /// True for failures that happened before anything was sent to the server
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ClientError::Validation(_) | ClientError::EmptyScope | ClientError::InvalidState(_)
        )
    }
}

/// Error context for structured logging
#[derive(Debug)]
pub struct ErrorContext {
    pub operation: String,
    pub resource_id: Option<String>,
    pub resource_type: String,
    pub user_friendly_message: Option<String>,
}

impl ErrorContext {
    pub fn new(operation: &str, resource_type: &str) -> Self {
        Self {
            operation: operation.to_string(),
            resource_id: None,
            resource_type: resource_type.to_string(),
            user_friendly_message: None,
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.resource_id = Some(id.to_string());
        self
    }

    pub fn with_user_message(mut self, message: &str) -> Self {
        self.user_friendly_message = Some(message.to_string());
        self
    }
}

impl ClientError {
    /// Convert the error into a user-visible notice, logging it with the given context.
    ///
    /// Local rejections keep their own message so the user learns what to fix; network
    /// and server failures collapse to a generic message (status codes are not told apart).
    pub fn to_notice_with_context(&self, context: ErrorContext) -> Notice {
        match self {
            ClientError::Validation(message) => {
                warn!(
                    operation = %context.operation,
                    resource_type = %context.resource_type,
                    resource_id = ?context.resource_id,
                    error = %self,
                    "Validation error"
                );
                Notice::error(message.clone())
            }
            ClientError::EmptyScope | ClientError::InvalidState(_) => {
                warn!(
                    operation = %context.operation,
                    resource_type = %context.resource_type,
                    error = %self,
                    "Operation rejected"
                );
                Notice::error(
                    context
                        .user_friendly_message
                        .unwrap_or_else(|| self.to_string()),
                )
            }
            ClientError::Transport(_) => {
                error!(
                    operation = %context.operation,
                    resource_type = %context.resource_type,
                    resource_id = ?context.resource_id,
                    error = %self,
                    "Transport error"
                );
                Notice::error(
                    context
                        .user_friendly_message
                        .unwrap_or_else(|| "A network error occurred. Please try again.".to_string()),
                )
            }
            ClientError::Status(status) => {
                error!(
                    operation = %context.operation,
                    resource_type = %context.resource_type,
                    resource_id = ?context.resource_id,
                    status = %status,
                    "Server rejected request"
                );
                Notice::error(context.user_friendly_message.unwrap_or_else(|| {
                    format!("Failed to {} {}", context.operation.replace('_', " "), context.resource_type)
                }))
            }
            ClientError::Decode(_) => {
                error!(
                    operation = %context.operation,
                    resource_type = %context.resource_type,
                    error = %self,
                    "Malformed server response"
                );
                Notice::error(
                    context
                        .user_friendly_message
                        .unwrap_or_else(|| "The server sent an unexpected response.".to_string()),
                )
            }
        }
    }

    pub fn to_notice(&self) -> Notice {
        self.to_notice_with_context(ErrorContext::new("unknown", "resource"))
    }
}
