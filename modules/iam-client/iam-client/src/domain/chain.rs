use std::fmt;
use std::sync::Arc;

use http::HeaderMap;
use iam_client_sdk::{IamError, PrincipalContext};

use crate::domain::authenticator::Authenticator;

/// Message of the error returned when every authenticator abstains.
pub const NO_AUTHENTICATOR_MATCHED: &str =
    "failed to authenticate request with any of available authenticators";

/// Ordered list of authenticators. The first one that resolves a principal wins.
#[derive(Clone)]
pub struct AuthenticatorChain {
    authenticators: Vec<Arc<dyn Authenticator>>,
}

impl AuthenticatorChain {
    #[must_use]
    pub fn new(authenticators: Vec<Arc<dyn Authenticator>>) -> Self {
        Self { authenticators }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.authenticators.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.authenticators.is_empty()
    }

    /// Authenticate a request from its headers.
    ///
    /// Stops at the first authenticator that errors or resolves a principal;
    /// abstaining authenticators are skipped.
    ///
    /// # Errors
    ///
    /// - the first authenticator error, unchanged
    /// - [`IamError::Unauthenticated`] if every authenticator abstained
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<PrincipalContext, IamError> {
        for authenticator in &self.authenticators {
            if let Some(ctx) = authenticator.authenticate(headers).await? {
                return Ok(ctx);
            }
        }
        Err(IamError::Unauthenticated(NO_AUTHENTICATOR_MATCHED.to_owned()))
    }
}

impl fmt::Debug for AuthenticatorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.authenticators.iter().map(|a| a.name()))
            .finish()
    }
}
