//! Credential-resolution strategies.

use std::sync::Arc;

use async_trait::async_trait;
use http::HeaderMap;
use http::header::AUTHORIZATION;
use iam_client_sdk::{API_KEY_HEADER, AuthorizationHeader, IamError, PrincipalContext};

use crate::domain::authority::RemoteAuthority;

const BEARER_SCHEME: &str = "bearer";

/// A single strategy of the [`AuthenticatorChain`](crate::AuthenticatorChain).
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Resolve the request's credential into a principal.
    ///
    /// Returns `Ok(None)` when this strategy's credential is absent, so the
    /// chain moves on to the next one.
    ///
    /// # Errors
    ///
    /// - [`IamError::InvalidCredentialFormat`] if the credential is present but malformed
    /// - any error of the remote authority while resolving the credential
    async fn authenticate(&self, headers: &HeaderMap)
    -> Result<Option<PrincipalContext>, IamError>;
}

async fn resolve(
    authority: &dyn RemoteAuthority,
    name: &'static str,
    header: AuthorizationHeader,
) -> Result<Option<PrincipalContext>, IamError> {
    let principal = authority.principal_irn(&header).await?;
    tracing::debug!(authenticator = name, principal = %principal, "principal resolved");
    Ok(Some(PrincipalContext::new(principal, header)))
}

/// `Authorization: Bearer <token>`, forwarded verbatim.
pub struct BearerToken {
    authority: Arc<dyn RemoteAuthority>,
}

impl BearerToken {
    #[must_use]
    pub fn new(authority: Arc<dyn RemoteAuthority>) -> Self {
        Self { authority }
    }
}

#[async_trait]
impl Authenticator for BearerToken {
    fn name(&self) -> &'static str {
        "bearer"
    }

    async fn authenticate(
        &self,
        headers: &HeaderMap,
    ) -> Result<Option<PrincipalContext>, IamError> {
        let Some(value) = headers.get(AUTHORIZATION).filter(|v| !v.is_empty()) else {
            tracing::debug!(authenticator = self.name(), "no Authorization header");
            return Ok(None);
        };

        let raw = value.to_str().map_err(|_| {
            IamError::InvalidCredentialFormat("Authorization header is not valid text".to_owned())
        })?;
        let parts: Vec<&str> = raw.split(' ').collect();
        let [scheme, token] = parts.as_slice() else {
            return Err(IamError::InvalidCredentialFormat(
                "Authorization header must be '<scheme> <token>'".to_owned(),
            ));
        };
        if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) || token.is_empty() {
            return Err(IamError::InvalidCredentialFormat(format!(
                "unsupported authorization scheme '{scheme}'"
            )));
        }

        resolve(
            self.authority.as_ref(),
            self.name(),
            AuthorizationHeader::bearer(value.clone()),
        )
        .await
    }
}

/// `X-iamcore-API-Key: <key>`.
pub struct ApiKey {
    authority: Arc<dyn RemoteAuthority>,
}

impl ApiKey {
    #[must_use]
    pub fn new(authority: Arc<dyn RemoteAuthority>) -> Self {
        Self { authority }
    }
}

#[async_trait]
impl Authenticator for ApiKey {
    fn name(&self) -> &'static str {
        "api_key"
    }

    async fn authenticate(
        &self,
        headers: &HeaderMap,
    ) -> Result<Option<PrincipalContext>, IamError> {
        let Some(value) = headers.get(&API_KEY_HEADER).filter(|v| !v.is_empty()) else {
            tracing::debug!(authenticator = self.name(), "no API key header");
            return Ok(None);
        };

        resolve(
            self.authority.as_ref(),
            self.name(),
            AuthorizationHeader::api_key(value.clone()),
        )
        .await
    }
}

/// Resolves the ambient identity of the process with an empty credential.
///
/// Never abstains. Place it last in a chain.
pub struct AmbientCredential {
    authority: Arc<dyn RemoteAuthority>,
}

impl AmbientCredential {
    #[must_use]
    pub fn new(authority: Arc<dyn RemoteAuthority>) -> Self {
        Self { authority }
    }
}

#[async_trait]
impl Authenticator for AmbientCredential {
    fn name(&self) -> &'static str {
        "ambient_credential"
    }

    async fn authenticate(
        &self,
        _headers: &HeaderMap,
    ) -> Result<Option<PrincipalContext>, IamError> {
        resolve(
            self.authority.as_ref(),
            self.name(),
            AuthorizationHeader::empty(),
        )
        .await
    }
}
