//! Sales channel context extractor.
//!
//! Resolves the visitor's context token and builds the
//! [`SalesChannelContext`] for the request. The token comes from the
//! `sw-context-token` header when a headless client sends one, otherwise
//! from the session. Visitors without either get a fresh token that is
//! stored in their session.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use shopfloor_core::SalesChannelContext;
use tower_sessions::Session;
use tracing::debug;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the context token for API clients.
pub const CONTEXT_TOKEN_HEADER: &str = "sw-context-token";

/// Session key holding the context token.
pub const CONTEXT_TOKEN_KEY: &str = "context_token";

/// Longest accepted context token.
const MAX_TOKEN_LEN: usize = 64;

/// Extractor yielding the request's sales channel context.
#[derive(Debug, Clone)]
pub struct StorefrontContext(pub SalesChannelContext);

impl FromRequestParts<AppState> for StorefrontContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = match header_token(parts)? {
            Some(token) => token,
            None => session_token(parts, state).await?,
        };

        let context = state.contexts().create(token).await?;
        Ok(Self(context))
    }
}

/// Token from the context token header, if sent.
fn header_token(parts: &Parts) -> Result<Option<String>, AppError> {
    let Some(value) = parts.headers.get(CONTEXT_TOKEN_HEADER) else {
        return Ok(None);
    };

    let token = value
        .to_str()
        .ok()
        .filter(|token| is_valid_token(token))
        .ok_or_else(|| AppError::BadRequest(format!("invalid {CONTEXT_TOKEN_HEADER} header")))?;

    Ok(Some(token.to_string()))
}

/// Token remembered in the session, created on first visit.
async fn session_token(parts: &mut Parts, state: &AppState) -> Result<String, AppError> {
    let session = Session::from_request_parts(parts, state)
        .await
        .map_err(|(_, message)| AppError::Session(message.to_string()))?;

    if let Some(token) = session
        .get::<String>(CONTEXT_TOKEN_KEY)
        .await
        .map_err(|e| AppError::Session(e.to_string()))?
    {
        return Ok(token);
    }

    let token = new_token();
    session
        .insert(CONTEXT_TOKEN_KEY, &token)
        .await
        .map_err(|e| AppError::Session(e.to_string()))?;
    debug!("issued new context token");

    Ok(token)
}

/// A fresh random token.
fn new_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Tokens are short and limited to ASCII letters, digits, `-` and `_`.
fn is_valid_token(token: &str) -> bool {
    !token.is_empty()
        && token.len() <= MAX_TOKEN_LEN
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
