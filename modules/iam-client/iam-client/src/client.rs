//! Entry point wiring configuration, transport and services together.

use std::sync::Arc;

use axum::Router;
use http::HeaderMap;
use iam_client_sdk::{
    AuthorizationClient, AuthorizationHeader, IamError, PrincipalContext, ResourceManagerClient,
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::api::middleware::{AuthnState, authn_middleware};
use crate::config::{ConfigError, IamClientConfig};
use crate::domain::AUDIT_TARGET;
use crate::domain::authenticator::{ApiKey, BearerToken};
use crate::domain::authority::RemoteAuthority;
use crate::domain::authorization::AuthorizationService;
use crate::domain::chain::AuthenticatorChain;
use crate::domain::resource_manager::ResourceManagerService;
use crate::infra::http_authority::HttpAuthority;

/// Errors of the [`IamClient`] facade.
#[derive(Debug, Error)]
pub enum IamClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("API key is not configured")]
    MissingApiKey,

    #[error(transparent)]
    Iam(#[from] IamError),
}

/// IAM client.
///
/// Holds the validated configuration and the services built on one shared
/// [`RemoteAuthority`]. Read-only after construction.
///
/// ```ignore
/// let client = IamClient::new(IamClientConfig::load(None)?)?;
///
/// let app = client.router_layer(Router::new().route("/devices", get(list_devices)));
/// ```
pub struct IamClient {
    config: Arc<IamClientConfig>,
    authority: Arc<dyn RemoteAuthority>,
    chain: Arc<AuthenticatorChain>,
    authorization: Arc<AuthorizationService>,
    resource_manager: Arc<ResourceManagerService>,
}

impl IamClient {
    /// Build a client talking HTTP to the configured IAM server, authenticating
    /// requests with `[BearerToken, ApiKey]`.
    ///
    /// # Errors
    ///
    /// Returns [`IamClientError::Config`] if the configuration is invalid.
    pub fn new(config: IamClientConfig) -> Result<Self, IamClientError> {
        config.validate()?;
        let authority: Arc<dyn RemoteAuthority> = Arc::new(HttpAuthority::new(&config));
        let chain = AuthenticatorChain::new(vec![
            Arc::new(BearerToken::new(authority.clone())),
            Arc::new(ApiKey::new(authority.clone())),
        ]);
        Self::with_authority(config, authority, chain)
    }

    /// Build a client over a custom authority and authenticator chain.
    ///
    /// # Errors
    ///
    /// Returns [`IamClientError::Config`] if the configuration is invalid.
    pub fn with_authority(
        config: IamClientConfig,
        authority: Arc<dyn RemoteAuthority>,
        chain: AuthenticatorChain,
    ) -> Result<Self, IamClientError> {
        config.validate()?;

        if !config.enforcement.is_enabled() {
            tracing::warn!(
                target: AUDIT_TARGET,
                server_url = %config.server_url,
                "IAM enforcement disabled: requests are not authenticated and authorization checks are skipped"
            );
        }

        let authorization = Arc::new(AuthorizationService::new(
            authority.clone(),
            config.enforcement,
        ));
        let resource_manager = Arc::new(ResourceManagerService::new(
            authority.clone(),
            config.enforcement,
            config.resource_types_page_size,
        ));

        tracing::info!(
            server_url = %config.server_url,
            authenticators = ?chain,
            timeout = %humantime::format_duration(config.request_timeout),
            "IAM client initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            authority,
            chain: Arc::new(chain),
            authorization,
            resource_manager,
        })
    }

    #[must_use]
    pub fn config(&self) -> &IamClientConfig {
        &self.config
    }

    #[must_use]
    pub fn authenticator_chain(&self) -> Arc<AuthenticatorChain> {
        self.chain.clone()
    }

    #[must_use]
    pub fn authorization(&self) -> Arc<dyn AuthorizationClient> {
        self.authorization.clone()
    }

    #[must_use]
    pub fn resource_manager(&self) -> Arc<dyn ResourceManagerClient> {
        self.resource_manager.clone()
    }

    /// Credential built from the configured service API key.
    ///
    /// # Errors
    ///
    /// - [`IamClientError::MissingApiKey`] if no key is configured
    /// - [`IamClientError::Iam`] if the key is not a valid header value
    pub fn api_key_authorization_header(&self) -> Result<AuthorizationHeader, IamClientError> {
        let key = self
            .config
            .api_key
            .as_ref()
            .ok_or(IamClientError::MissingApiKey)?;
        Ok(AuthorizationHeader::api_key_from_str(key.expose_secret())?)
    }

    /// Add the service API key to outbound request headers.
    ///
    /// # Errors
    ///
    /// Same as [`IamClient::api_key_authorization_header`].
    pub fn set_api_key_authorization_header(
        &self,
        headers: &mut HeaderMap,
    ) -> Result<(), IamClientError> {
        self.api_key_authorization_header()?.apply_to(headers);
        Ok(())
    }

    /// Principal of the configured service API key, for service-to-service calls.
    ///
    /// # Errors
    ///
    /// - [`IamClientError::MissingApiKey`] if no key is configured
    /// - [`IamClientError::Iam`] if the IAM server cannot resolve the key
    pub async fn service_principal(&self) -> Result<PrincipalContext, IamClientError> {
        let header = self.api_key_authorization_header()?;
        let principal = self.authority.principal_irn(&header).await?;
        tracing::debug!(principal = %principal, "service principal resolved");
        Ok(PrincipalContext::new(principal, header))
    }

    /// State for mounting [`authn_middleware`] manually.
    #[must_use]
    pub fn authn_state(&self) -> AuthnState {
        AuthnState {
            chain: self.chain.clone(),
            enforcement: self.config.enforcement,
        }
    }

    /// Put every route of `router` behind the authentication middleware.
    pub fn router_layer<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.layer(axum::middleware::from_fn_with_state(
            self.authn_state(),
            authn_middleware,
        ))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use secrecy::SecretString;
    use tracing_test::traced_test;

    use super::*;
    use crate::config::EnforcementMode;
    use crate::domain::test_support::MockAuthority;

    fn client(config: IamClientConfig, authority: Arc<MockAuthority>) -> IamClient {
        let chain = AuthenticatorChain::new(vec![Arc::new(ApiKey::new(authority.clone()))]);
        IamClient::with_authority(config, authority, chain).unwrap()
    }

    fn with_key(key: &str) -> IamClientConfig {
        IamClientConfig {
            api_key: Some(SecretString::from(key.to_owned())),
            ..IamClientConfig::default()
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = IamClientConfig {
            server_url: "iam.local".to_owned(),
            ..IamClientConfig::default()
        };
        assert!(matches!(
            IamClient::new(config),
            Err(IamClientError::Config(ConfigError::InvalidServerUrl { .. }))
        ));
    }

    #[test]
    fn api_key_header_requires_configured_key() {
        let c = client(IamClientConfig::default(), Arc::new(MockAuthority::default()));
        assert!(matches!(
            c.api_key_authorization_header(),
            Err(IamClientError::MissingApiKey)
        ));
    }

    #[test]
    fn api_key_header_is_applied_to_outbound_headers() {
        let c = client(with_key("svc-key"), Arc::new(MockAuthority::default()));
        let mut headers = HeaderMap::new();
        c.set_api_key_authorization_header(&mut headers).unwrap();
        assert_eq!(headers[iam_client_sdk::API_KEY_HEADER], "svc-key");
    }

    #[tokio::test]
    async fn service_principal_uses_configured_key() {
        let authority = Arc::new(MockAuthority::default());
        let c = client(with_key("svc-key"), authority.clone());

        let ctx = c.service_principal().await.unwrap();

        assert_eq!(ctx.principal(), &authority.principal);
        assert_eq!(
            authority.seen_headers(),
            vec![AuthorizationHeader::api_key_from_str("svc-key").unwrap()]
        );
    }

    #[test]
    #[traced_test]
    fn disabled_enforcement_is_announced() {
        let config = IamClientConfig {
            enforcement: EnforcementMode::Disabled,
            ..IamClientConfig::default()
        };
        let _client = client(config, Arc::new(MockAuthority::default()));
        assert!(logs_contain("IAM enforcement disabled"));
    }
}
