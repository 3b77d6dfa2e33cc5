use iam_irn::Irn;

use crate::error::IamError;
use crate::header::AuthorizationHeader;

/// `PrincipalContext` is the request-scoped identity of the caller.
///
/// Built by the authenticator chain once per request and read-only afterwards.
/// Authorization operations take it by reference and forward its
/// [`AuthorizationHeader`] to the IAM server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    /// IRN of the authenticated user or service.
    principal: Irn,
    /// Credential that resolved `principal`.
    authorization_header: AuthorizationHeader,
}

impl PrincipalContext {
    #[must_use]
    pub fn new(principal: Irn, authorization_header: AuthorizationHeader) -> Self {
        Self {
            principal,
            authorization_header,
        }
    }

    /// Context bound to requests while enforcement is disabled: the
    /// [`Irn::anonymous`] principal with no credential.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::new(Irn::anonymous(), AuthorizationHeader::empty())
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.principal == Irn::anonymous() && self.authorization_header.is_empty()
    }

    /// Look up the context bound to a request.
    ///
    /// # Errors
    ///
    /// Returns [`IamError::NoAuthContext`] if the request was not authenticated.
    pub fn from_extensions(extensions: &http::Extensions) -> Result<&Self, IamError> {
        extensions.get::<Self>().ok_or(IamError::NoAuthContext)
    }

    #[must_use]
    pub fn principal(&self) -> &Irn {
        &self.principal
    }

    #[must_use]
    pub fn authorization_header(&self) -> &AuthorizationHeader {
        &self.authorization_header
    }

    #[must_use]
    pub fn account_id(&self) -> &str {
        self.principal.account_id()
    }

    #[must_use]
    pub fn tenant_id(&self) -> Option<&str> {
        self.principal.tenant_id()
    }

    /// Principal's path as a rooted string.
    #[must_use]
    pub fn path(&self) -> String {
        self.principal.path_string()
    }
}
