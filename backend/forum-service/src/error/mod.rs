use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForumError {
    /// Content rejected by moderation; the author can fix it and resubmit
    #[error("Invalid content: {0}")]
    InvalidContent(String),

    /// A dependency outside this service failed, timed out or answered garbage
    #[error("External service error ({service}): {reason}")]
    ExternalService {
        service: &'static str,
        reason: String,
    },

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ForumError {
    pub fn external(service: &'static str, reason: impl Into<String>) -> Self {
        ForumError::ExternalService {
            service,
            reason: reason.into(),
        }
    }

    /// Whether a caller may reasonably retry the same request later.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ForumError::ExternalService { .. } | ForumError::RateLimited(_)
        )
    }
}

impl ResponseError for ForumError {
    fn status_code(&self) -> StatusCode {
        match self {
            ForumError::InvalidContent(_) | ForumError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ForumError::ExternalService { .. } => StatusCode::FAILED_DEPENDENCY,
            ForumError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            ForumError::Database(_) | ForumError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ForumError::InvalidContent(reason) => {
                tracing::warn!(reason = %reason, "Content rejected by moderation");
            }
            ForumError::ExternalService { service, reason } => {
                tracing::error!(service = %service, reason = %reason, "External dependency failed");
            }
            ForumError::RateLimited(reason) => {
                tracing::debug!(reason = %reason, "Request rate limited");
            }
            ForumError::InvalidInput(_) => {}
            ForumError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
            }
            ForumError::Config(e) => {
                tracing::error!("Configuration error: {}", e);
            }
        }

        let status = self.status_code();
        let message = match self {
            // Driver errors can carry connection strings and SQL
            ForumError::Database(_) => "Database error".to_string(),
            other => other.to_string(),
        };

        HttpResponse::build(status).json(serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        }))
    }
}

pub type Result<T> = std::result::Result<T, ForumError>;
