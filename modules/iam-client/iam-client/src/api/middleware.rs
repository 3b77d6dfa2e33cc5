use std::ops::Deref;
use std::sync::Arc;

use axum::Json;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::X_CONTENT_TYPE_OPTIONS;
use axum::http::request::Parts;
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use iam_client_sdk::{IamError, PrincipalContext};
use serde::Serialize;

use crate::config::EnforcementMode;
use crate::domain::AUDIT_TARGET;
use crate::domain::chain::AuthenticatorChain;

const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// Shared state for the authentication middleware.
#[derive(Clone)]
pub struct AuthnState {
    pub chain: Arc<AuthenticatorChain>,
    pub enforcement: EnforcementMode,
}

/// JSON error envelope of rejected requests.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
}

/// Authentication middleware backed by the [`AuthenticatorChain`].
///
/// For each request:
/// 1. With enforcement disabled: binds [`PrincipalContext::anonymous`] and passes the request through
/// 2. Runs the chain over the request headers
/// 3. On success: inserts the [`PrincipalContext`] into the request extensions
/// 4. On failure: 401 for credential problems, 500 for anything else
pub async fn authn_middleware(
    State(state): State<AuthnState>,
    mut req: Request,
    next: Next,
) -> Response {
    if !state.enforcement.is_enabled() {
        tracing::warn!(
            target: AUDIT_TARGET,
            method = %req.method(),
            path = %req.uri().path(),
            "enforcement disabled, request not authenticated"
        );
        req.extensions_mut().insert(PrincipalContext::anonymous());
        return next.run(req).await;
    }

    match state.chain.authenticate(req.headers()).await {
        Ok(ctx) => {
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        Err(err) => authn_error_to_response(&err),
    }
}

/// Convert an authentication failure into a JSON error response.
fn authn_error_to_response(err: &IamError) -> Response {
    log_authn_error(err);
    match err {
        IamError::Unauthenticated(msg) | IamError::InvalidCredentialFormat(msg) => {
            error_response(StatusCode::UNAUTHORIZED, msg)
        }
        _ => error_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE),
    }
}

/// Cognitive complexity is inflated by tracing macro expansion.
#[allow(clippy::cognitive_complexity)]
fn log_authn_error(err: &IamError) {
    match err {
        IamError::Unauthenticated(msg) => tracing::debug!("AuthN rejected: {msg}"),
        IamError::InvalidCredentialFormat(msg) => {
            tracing::debug!("AuthN rejected malformed credential: {msg}");
        }
        other => tracing::error!(error = %other, "AuthN failed"),
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    let mut response = (status, Json(ErrorBody { message })).into_response();
    response
        .headers_mut()
        .insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    response
}

/// Extractor for the authenticated principal of a request.
///
/// Rejects with a 500 if the route is not behind [`authn_middleware`].
#[derive(Debug, Clone)]
pub struct Principal(pub PrincipalContext);

impl Principal {
    #[must_use]
    pub fn into_inner(self) -> PrincipalContext {
        self.0
    }
}

impl Deref for Principal {
    type Target = PrincipalContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Principal {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        PrincipalContext::from_extensions(&parts.extensions)
            .cloned()
            .map(Principal)
            .map_err(|err| {
                tracing::error!(error = %err, path = %parts.uri.path(), "principal requested on an unauthenticated route");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
            })
    }
}
