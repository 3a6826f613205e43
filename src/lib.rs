pub mod api_client;
pub mod category;
pub mod config;
pub mod controllers;
pub mod errors;
pub mod grading;
pub mod logging;
pub mod models;
pub mod normalizer;
pub mod question_form;
pub mod quiz_runner;
pub mod shuffler;

pub use api_client::{ApiClient, QuizGateway};
pub use category::{CategoryFilterOptions, CategoryTree, FolderScope, FolderSelector, Level1Choice};
pub use config::Config;
pub use controllers::{AdminEditor, AdminUserBrowser, QuizController};
pub use errors::*;
pub use grading::{GradeOutcome, Response};
pub use models::*;
pub use question_form::QuestionForm;
pub use quiz_runner::{QuizRunner, QuizState, QuizSummary};
