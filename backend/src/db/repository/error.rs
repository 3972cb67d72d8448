//! Errors raised by the inventory, donor and history stores.
//!
//! Every error carries an [`ErrorContext`] naming the store operation and,
//! where one exists, the record it touched:
//!
//! ```ignore
//! RepositoryError::validation("current_units out of range: 4294967295").with_context(
//!     ErrorContext::new("upsert_inventory").on("inventory", "H001/O+"),
//! )
//! // Data validation error: current_units out of range: 4294967295
//! //     (upsert_inventory on inventory H001/O+)
//! ```

use std::fmt;

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Where a store error happened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Store operation, e.g. `list_inventory` or `find_available_donors`.
    pub operation: Option<String>,
    /// Record kind: `inventory`, `donor`, `usage`, `movement`, ...
    pub record: Option<String>,
    /// Record key, `hospital/type` for stock rows or a donor id.
    pub key: Option<String>,
    pub details: Option<String>,
    pub retryable: bool,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    /// Name the record the operation was working on.
    pub fn on(mut self, record: impl Into<String>, key: impl ToString) -> Self {
        self.record = Some(record.into());
        self.key = Some(key.to_string());
        self
    }

    /// Name the record kind when no single key applies (aggregates, row decoding).
    pub fn on_kind(mut self, record: impl Into<String>) -> Self {
        self.record = Some(record.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = self.operation.clone().unwrap_or_default();
        match (&self.record, &self.key) {
            (Some(record), Some(key)) => out.push_str(&format!(" on {} {}", record, key)),
            (Some(record), None) => out.push_str(&format!(" on {}", record)),
            _ => {}
        }
        if let Some(details) = &self.details {
            out.push_str(&format!("; {}", details));
        }
        if self.retryable {
            out.push_str("; retryable");
        }
        let out = out.trim_start_matches("; ").trim();
        if out.is_empty() {
            Ok(())
        } else {
            write!(f, "({})", out)
        }
    }
}

/// Store failure, classified by how the HTTP layer and retry loop treat it.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Store unreachable or reported unhealthy.
    #[error("Connection error: {message} {context}")]
    ConnectionError { message: String, context: ErrorContext },

    /// No pooled connection became free in time.
    #[error("Timeout error: {message} {context}")]
    TimeoutError { message: String, context: ErrorContext },

    #[error("Query error: {message} {context}")]
    QueryError { message: String, context: ErrorContext },

    /// Maps to 404 at the HTTP boundary.
    #[error("Not found: {message} {context}")]
    NotFound { message: String, context: ErrorContext },

    /// Bad input or a stored row that does not decode (unknown blood type,
    /// negative units). Maps to 400 at the HTTP boundary.
    #[error("Data validation error: {message} {context}")]
    ValidationError { message: String, context: ErrorContext },

    /// Missing or invalid repository configuration.
    #[error("Configuration error: {message} {context}")]
    ConfigurationError { message: String, context: ErrorContext },

    #[error("Internal error: {message} {context}")]
    InternalError { message: String, context: ErrorContext },
}

impl RepositoryError {
    /// Connection errors start out retryable.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::ConnectionError {
            message: message.into(),
            context: ErrorContext::default().retryable(),
        }
    }

    /// Timeouts start out retryable.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::TimeoutError {
            message: message.into(),
            context: ErrorContext::default().retryable(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::QueryError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Replace the context. A retryable error stays retryable.
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        let current = self.context_mut();
        let retryable = current.retryable || context.retryable;
        *current = ErrorContext { retryable, ..context };
        self
    }

    /// Set the operation, keeping the rest of the context.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context_mut().operation = Some(operation.into());
        self
    }

    /// Whether the Postgres retry loop may try again.
    pub fn is_retryable(&self) -> bool {
        self.context().retryable
    }

    pub fn context(&self) -> &ErrorContext {
        self.parts().1
    }

    /// The bare message, without the variant prefix or context.
    pub fn message(&self) -> &str {
        self.parts().0
    }

    fn parts(&self) -> (&str, &ErrorContext) {
        match self {
            Self::ConnectionError { message, context }
            | Self::TimeoutError { message, context }
            | Self::QueryError { message, context }
            | Self::NotFound { message, context }
            | Self::ValidationError { message, context }
            | Self::ConfigurationError { message, context }
            | Self::InternalError { message, context } => (message, context),
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::ConnectionError { context, .. }
            | Self::TimeoutError { context, .. }
            | Self::QueryError { context, .. }
            | Self::NotFound { context, .. }
            | Self::ValidationError { context, .. }
            | Self::ConfigurationError { context, .. }
            | Self::InternalError { context, .. } => context,
        }
    }
}

impl From<String> for RepositoryError {
    fn from(s: String) -> Self {
        RepositoryError::internal(s)
    }
}

impl From<&str> for RepositoryError {
    fn from(s: &str) -> Self {
        RepositoryError::internal(s)
    }
}

#[cfg(feature = "postgres-repo")]
impl From<diesel::result::Error> for RepositoryError {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};

        match err {
            Error::NotFound => RepositoryError::not_found("Record not found"),
            // Stock rows are guarded by CHECK constraints; a violation is bad input.
            Error::DatabaseError(DatabaseErrorKind::CheckViolation, info) => {
                RepositoryError::validation(info.message())
            }
            Error::DatabaseError(kind, info) => {
                let mut context = ErrorContext::default().with_details(format!("{:?}", kind));
                if matches!(kind, DatabaseErrorKind::SerializationFailure) {
                    context = context.retryable();
                }
                RepositoryError::query(info.message()).with_context(context)
            }
            Error::DeserializationError(e) => {
                RepositoryError::internal(format!("Row decoding failed: {}", e))
            }
            other => RepositoryError::query(other.to_string()),
        }
    }
}

/// r2d2 only fails a checkout when `connection_timeout` elapses.
#[cfg(feature = "postgres-repo")]
impl From<diesel::r2d2::PoolError> for RepositoryError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        RepositoryError::timeout(err.to_string())
    }
}
