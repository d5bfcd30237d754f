//! Cookie sessions, flash messages and the guards for protected routes.
//!
//! Session records live in the `tower_sessions` table of the application
//! database; the cookie only carries the session id. A guard resolves the
//! caller's session before the handler runs and hands the handler a
//! [`CurrentUser`] through the request extensions. Page routes bounce
//! anonymous callers to the login form, API routes answer 401.

use crate::auth;
use crate::config::MAX_SESSION_TTL_HOURS;
use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use time::Duration;
use tower_sessions::cookie::SameSite;
use tower_sessions::{Expiry, Session, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;
use tracing::{debug, info};

pub const SESSION_COOKIE: &str = "golf_session";

const FLASH_KEY: &str = "flash";

/// The authenticated user of the current request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Session middleware: `HttpOnly`, `SameSite=Lax` cookie that expires after
/// the configured period of inactivity.
pub fn layer(state: &AppState) -> SessionManagerLayer<SqliteStore> {
    let ttl_hours = state
        .config
        .session_ttl_hours
        .clamp(1, MAX_SESSION_TTL_HOURS);

    SessionManagerLayer::new(state.sessions.clone())
        .with_name(SESSION_COOKIE)
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_secure(state.config.cookie_secure)
        .with_expiry(Expiry::OnInactivity(Duration::hours(ttl_hours)))
}

/// Leaves a one-shot message for the next page rendered in this session.
pub async fn set_flash(session: &Session, message: &str) -> Result<(), AppError> {
    session.insert(FLASH_KEY, message).await?;
    Ok(())
}

/// Pending flash message, removed from the session once read.
pub async fn take_flash(session: &Session) -> Result<Option<String>, AppError> {
    Ok(session.remove::<String>(FLASH_KEY).await?)
}

/// Redirect that carries a one-shot message to the next page.
pub async fn redirect_with_flash(session: &Session, to: &str, message: &str) -> Response {
    match set_flash(session, message).await {
        Ok(()) => Redirect::to(to).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Resolves the caller's session without rejecting anonymous requests.
pub async fn current_user(state: &AppState, session: &Session) -> Result<Option<User>, AppError> {
    auth::resolve_session(&state.database, session).await
}

/// Guard for HTML routes: anonymous callers are sent to the login page.
pub async fn require_page_user(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    match current_user(&state, &session).await {
        Ok(Some(user)) => {
            request.extensions_mut().insert(CurrentUser(user));
            next.run(request).await
        }
        Ok(None) => {
            info!("Anonymous request to {}, redirecting to login", request.uri().path());
            redirect_with_flash(&session, "/login", "Please log in to access this page.").await
        }
        Err(e) => e.into_response(),
    }
}

/// Guard for JSON routes: anonymous callers get 401.
pub async fn require_api_user(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    match current_user(&state, &session).await {
        Ok(Some(user)) => {
            request.extensions_mut().insert(CurrentUser(user));
            next.run(request).await
        }
        Ok(None) => {
            debug!("Rejecting anonymous API request to {}", request.uri().path());
            AppError::Unauthorized.into_response()
        }
        Err(e) => e.into_response(),
    }
}
