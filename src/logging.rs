// Macros file - tracing macros are imported within the macro definitions

/// Standardized logging macros for consistent field names across the client core
///
/// These macros ensure:
/// - Consistent field naming conventions
/// - Appropriate logging levels for different scenarios
/// - Structured logging with context

// ============================================================================
// API Gateway Logging Macros
// ============================================================================

/// Log the start of a gateway call
#[macro_export]
macro_rules! log_api_start {
    ($operation:expr, question_id = $id:expr) => {
        tracing::debug!(
            operation = $operation,
            question_id = $id,
            "API request started"
        )
    };
    ($operation:expr, path = $path:expr) => {
        tracing::debug!(
            operation = $operation,
            path = %$path,
            "API request started"
        )
    };
    ($operation:expr) => {
        tracing::debug!(operation = $operation, "API request started")
    };
}

/// Log successful completion of a gateway call
#[macro_export]
macro_rules! log_api_success {
    ($operation:expr, question_id = $id:expr, $msg:expr) => {
        tracing::info!(
            operation = $operation,
            question_id = $id,
            "API request completed: {}", $msg
        )
    };
    ($operation:expr, count = $count:expr, $msg:expr) => {
        tracing::debug!(
            operation = $operation,
            count = $count,
            "API request completed: {}", $msg
        )
    };
    ($operation:expr, $msg:expr) => {
        tracing::info!(operation = $operation, "API request completed: {}", $msg)
    };
}

/// Log gateway failures with consistent structure
#[macro_export]
macro_rules! log_api_error {
    ($operation:expr, status = $status:expr, $msg:expr) => {
        tracing::error!(
            operation = $operation,
            status = %$status,
            "API request failed: {}", $msg
        )
    };
    ($operation:expr, error = $error:expr, $msg:expr) => {
        tracing::error!(
            operation = $operation,
            error = %$error,
            "API request failed: {}", $msg
        )
    };
}

// ============================================================================
// Quiz Session Logging Macros
// ============================================================================

/// Log quiz runner transitions
#[macro_export]
macro_rules! log_quiz_event {
    (start, session_id = $session_id:expr, scope = $scope:expr, question_count = $count:expr) => {
        tracing::info!(
            component = "quiz_runner",
            event = "start",
            session_id = %$session_id,
            scope = %$scope,
            question_count = $count,
            "Quiz session started"
        )
    };
    (answer, session_id = $session_id:expr, cursor = $cursor:expr, correct = $correct:expr) => {
        tracing::debug!(
            component = "quiz_runner",
            event = "answer",
            session_id = %$session_id,
            cursor = $cursor,
            correct = $correct,
            "Answer graded"
        )
    };
    (finish, session_id = $session_id:expr, score = $score:expr, total = $total:expr) => {
        tracing::info!(
            component = "quiz_runner",
            event = "finish",
            session_id = %$session_id,
            score = $score,
            total = $total,
            "Quiz session finished"
        )
    };
    ($event:ident, session_id = $session_id:expr) => {
        tracing::info!(
            component = "quiz_runner",
            event = stringify!($event),
            session_id = %$session_id,
            "Quiz session event"
        )
    };
}

// ============================================================================
// Admin Form Logging Macros
// ============================================================================

/// Log question form activity
#[macro_export]
macro_rules! log_form_event {
    ($operation:expr, qtype = $qtype:expr, $msg:expr) => {
        tracing::debug!(
            component = "question_form",
            operation = $operation,
            qtype = %$qtype,
            "Form event: {}", $msg
        )
    };
    ($operation:expr, $msg:expr) => {
        tracing::debug!(
            component = "question_form",
            operation = $operation,
            "Form event: {}", $msg
        )
    };
}

// ============================================================================
// System Event Logging Macros
// ============================================================================

/// Log system startup and shutdown events
#[macro_export]
macro_rules! log_system_event {
    (startup, component = $component:expr, $msg:expr) => {
        tracing::info!(
            event_type = "startup",
            component = $component,
            "System event: {}",
            $msg
        )
    };
    (shutdown, component = $component:expr, $msg:expr) => {
        tracing::info!(
            event_type = "shutdown",
            component = $component,
            "System event: {}",
            $msg
        )
    };
    (config, $msg:expr) => {
        tracing::info!(event_type = "configuration", "System event: {}", $msg)
    };
}

// ============================================================================
// Validation Logging Macros
// ============================================================================

/// Log validation results consistently
#[macro_export]
macro_rules! log_validation {
    (success, $component:expr, $msg:expr) => {
        tracing::debug!(
            event_type = "validation",
            component = $component,
            result = "success",
            "Validation completed: {}", $msg
        )
    };
    (failure, $component:expr, error = $error:expr) => {
        tracing::warn!(
            event_type = "validation",
            component = $component,
            result = "failure",
            error = %$error,
            "Validation failed"
        )
    };
}
