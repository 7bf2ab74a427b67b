//! Cookie-backed session extractor.

use axum::extract::FromRequestParts;
use axum::http::HeaderValue;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use cottage_protocol::{SessionId, SessionState};
use tracing::{debug, error};

use crate::{ApiError, ApiResult, AppState};

/// The caller's session, loaded before the handler runs.
///
/// Handlers mutate `state` and hand their response to [`WebSession::commit`],
/// which persists the state and (re)issues the signed cookie.
pub struct WebSession {
    pub id: SessionId,
    pub state: SessionState,
    fresh: bool,
}

impl FromRequestParts<AppState> for WebSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, app: &AppState) -> Result<Self, Self::Rejection> {
        let existing = parts
            .headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(|header| app.signer.session_from_cookie_header(header));

        let Some(id) = existing else {
            return Ok(Self {
                id: SessionId::new_uuid(),
                state: SessionState::new(),
                fresh: true,
            });
        };

        let state = app.inspector.load_session(&id).await.map_err(|error| {
            error!(session_id = %id, error = %format!("{error:#}"), "failed loading session");
            ApiError::internal(format!("{error:#}"))
        })?;
        debug!(session_id = %id, history_len = state.history().len(), "session loaded");
        Ok(Self {
            id,
            state,
            fresh: false,
        })
    }
}

impl WebSession {
    /// Persist the state and attach the session cookie. A brand-new session
    /// that never stored anything is dropped without a cookie, and an
    /// existing session left empty has its stored record removed.
    pub async fn commit(self, app: &AppState, response: impl IntoResponse) -> ApiResult<Response> {
        let mut response = response.into_response();
        if self.state.is_empty() {
            if !self.fresh {
                app.inspector
                    .discard_session(&self.id)
                    .await
                    .map_err(|error| {
                        error!(session_id = %self.id, error = %format!("{error:#}"), "failed discarding session");
                        ApiError::internal(format!("{error:#}"))
                    })?;
            }
            return Ok(response);
        }

        app.inspector
            .save_session(&self.id, &self.state)
            .await
            .map_err(|error| {
                error!(session_id = %self.id, error = %format!("{error:#}"), "failed saving session");
                ApiError::internal(format!("{error:#}"))
            })?;

        let max_age = app.inspector.session_ttl().as_secs();
        let cookie = HeaderValue::from_str(&app.signer.set_cookie(&self.id, max_age))
            .map_err(ApiError::internal)?;
        response.headers_mut().append(SET_COOKIE, cookie);
        Ok(response)
    }
}
