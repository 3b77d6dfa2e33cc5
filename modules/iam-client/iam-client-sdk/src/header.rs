//! Credential carrier forwarded to the IAM server.

use std::fmt;

use http::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};

use crate::error::IamError;

/// Header carrying an IAM API key.
pub const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-iamcore-api-key");

/// Credential headers presented on every IAM server call made on behalf of a principal.
///
/// Captured once (from the inbound request, or synthesized for API-key and
/// service flows) and never mutated afterwards. Values are flagged sensitive
/// and `Debug` prints header names only.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthorizationHeader {
    headers: HeaderMap,
}

impl AuthorizationHeader {
    /// No credential. The IAM server falls back to the caller's ambient identity.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// `Authorization` header, forwarded verbatim (scheme included).
    #[must_use]
    pub fn bearer(value: HeaderValue) -> Self {
        Self::single(AUTHORIZATION, value)
    }

    /// API key header.
    #[must_use]
    pub fn api_key(value: HeaderValue) -> Self {
        Self::single(API_KEY_HEADER, value)
    }

    /// API key header from a configured key.
    ///
    /// # Errors
    ///
    /// Returns [`IamError::InvalidCredentialFormat`] if the key is empty or
    /// not a valid header value.
    pub fn api_key_from_str(key: &str) -> Result<Self, IamError> {
        if key.is_empty() {
            return Err(IamError::InvalidCredentialFormat(
                "API key is empty".to_owned(),
            ));
        }
        let value = HeaderValue::from_str(key).map_err(|_| {
            IamError::InvalidCredentialFormat("API key is not a valid header value".to_owned())
        })?;
        Ok(Self::api_key(value))
    }

    fn single(name: HeaderName, mut value: HeaderValue) -> Self {
        value.set_sensitive(true);
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert(name, value);
        Self { headers }
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[must_use]
    pub fn get(&self, name: &HeaderName) -> Option<&HeaderValue> {
        self.headers.get(name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Copy the credential into an outbound request's headers, replacing existing values.
    pub fn apply_to(&self, target: &mut HeaderMap) {
        for (name, value) in &self.headers {
            target.insert(name.clone(), value.clone());
        }
    }
}

impl fmt::Debug for AuthorizationHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.headers.keys()).finish()
    }
}
