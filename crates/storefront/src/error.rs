//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::pages::PageError;
use crate::services::{CartError, ContextError};

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// A page failed to load.
    #[error("Page error: {0}")]
    Page(#[from] PageError),

    /// The request context could not be created.
    #[error("Context error: {0}")]
    Context(#[from] ContextError),

    /// Session storage failed.
    #[error("Session error: {0}")]
    Session(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Page(PageError::SalesChannelNotFound(_)) | Self::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::Page(PageError::Cart(CartError::InvalidToken)) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Context(
                ContextError::SalesChannelNotFound(_) | ContextError::SalesChannelInactive(_),
            ) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Page(_) | Self::Context(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match status {
            StatusCode::SERVICE_UNAVAILABLE => "Shop temporarily unavailable".to_string(),
            StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST => self.to_string(),
            _ => "Internal server error".to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use shopfloor_core::SalesChannelId;

    use super::*;
    use crate::db::RepositoryError;
    use crate::pages::HookError;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("cart".to_string());
        assert_eq!(err.to_string(), "Not found: cart");

        let err = AppError::from(PageError::Hook(HookError::new("audit", "boom")));
        assert_eq!(err.to_string(), "Page error: hook `audit` failed: boom");
    }

    #[test]
    fn test_page_error_status_codes() {
        assert_eq!(
            get_status(PageError::SalesChannelNotFound(SalesChannelId::random()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(PageError::Cart(CartError::InvalidToken).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(
                PageError::Repository(RepositoryError::Unavailable("down".to_string())).into()
            ),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(PageError::Hook(HookError::new("audit", "boom")).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_context_error_status_codes() {
        assert_eq!(
            get_status(ContextError::SalesChannelInactive(SalesChannelId::random()).into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            get_status(
                ContextError::Repository(RepositoryError::Unavailable("down".to_string())).into()
            ),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_other_status_codes() {
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Session("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
