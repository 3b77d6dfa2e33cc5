//! Error types for the IAM client.

use http::StatusCode;
use iam_irn::IrnError;
use thiserror::Error;

/// Closed set of semantic error kinds.
///
/// Every authentication or authorization failure maps to exactly one kind.
/// Unrecognized IAM server statuses map to [`ErrorKind::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Unauthenticated,
    Forbidden,
    Conflict,
    BadRequest,
    Unknown,
}

impl ErrorKind {
    /// Classify an IAM server response status.
    #[must_use]
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthenticated,
            StatusCode::FORBIDDEN => Self::Forbidden,
            StatusCode::CONFLICT => Self::Conflict,
            StatusCode::BAD_REQUEST => Self::BadRequest,
            _ => Self::Unknown,
        }
    }
}

/// Errors returned by the IAM client API.
#[derive(Debug, Clone, Error)]
pub enum IamError {
    /// IRN inputs failed local validation. Never reaches the IAM server.
    #[error("invalid IRN: {0}")]
    InvalidIrn(#[from] IrnError),

    /// A credential header is present but malformed.
    #[error("invalid credential format: {0}")]
    InvalidCredentialFormat(String),

    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("conflict: {0}")]
    Conflict(String),

    /// Rejected as invalid, either locally (wildcards, missing actions) or by the IAM server.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Unrecognized IAM server status or a transport failure.
    #[error("unknown error: {0}")]
    Unknown(String),

    /// An operation that needs an authenticated principal was called without one.
    #[error("no auth context")]
    NoAuthContext,

    /// Enforcement is disabled by configuration; the check was not performed.
    #[error("SDK disabled")]
    SdkDisabled,
}

impl IamError {
    /// Build the error for a non-success IAM server response.
    #[must_use]
    pub fn from_status(status: StatusCode, message: impl Into<String>) -> Self {
        let message = message.into();
        match ErrorKind::from_status(status) {
            ErrorKind::Unauthenticated => Self::Unauthenticated(message),
            ErrorKind::Forbidden => Self::Forbidden(message),
            ErrorKind::Conflict => Self::Conflict(message),
            ErrorKind::BadRequest => Self::BadRequest(message),
            ErrorKind::Unknown => Self::Unknown(message),
        }
    }

    /// Semantic kind of this failure.
    ///
    /// `None` for [`IamError::NoAuthContext`] and [`IamError::SdkDisabled`],
    /// which are local conditions rather than protocol failures.
    #[must_use]
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::InvalidCredentialFormat(_) | Self::Unauthenticated(_) => {
                Some(ErrorKind::Unauthenticated)
            }
            Self::Forbidden(_) => Some(ErrorKind::Forbidden),
            Self::Conflict(_) => Some(ErrorKind::Conflict),
            Self::InvalidIrn(_) | Self::BadRequest(_) => Some(ErrorKind::BadRequest),
            Self::Unknown(_) => Some(ErrorKind::Unknown),
            Self::NoAuthContext | Self::SdkDisabled => None,
        }
    }

    /// Whether the result comes from disabled enforcement rather than a decision.
    #[must_use]
    pub fn is_enforcement_bypass(&self) -> bool {
        matches!(self, Self::SdkDisabled)
    }

    #[must_use]
    pub fn is_unauthenticated(&self) -> bool {
        self.kind() == Some(ErrorKind::Unauthenticated)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        let cases = [
            (StatusCode::UNAUTHORIZED, ErrorKind::Unauthenticated),
            (StatusCode::FORBIDDEN, ErrorKind::Forbidden),
            (StatusCode::CONFLICT, ErrorKind::Conflict),
            (StatusCode::BAD_REQUEST, ErrorKind::BadRequest),
            (StatusCode::NOT_FOUND, ErrorKind::Unknown),
            (StatusCode::INTERNAL_SERVER_ERROR, ErrorKind::Unknown),
            (StatusCode::IM_A_TEAPOT, ErrorKind::Unknown),
        ];
        for (status, kind) in cases {
            assert_eq!(ErrorKind::from_status(status), kind, "{status}");
            assert_eq!(IamError::from_status(status, "msg").kind(), Some(kind));
        }
    }

    #[test]
    fn remote_message_is_preserved() {
        let err = IamError::from_status(StatusCode::FORBIDDEN, "no grant for fleet:device:read");
        assert_eq!(err.to_string(), "forbidden: no grant for fleet:device:read");
    }

    #[test]
    fn credential_format_is_unauthenticated_class() {
        let err = IamError::InvalidCredentialFormat("Basic".to_owned());
        assert!(err.is_unauthenticated());
    }

    #[test]
    fn local_conditions_have_no_kind() {
        assert_eq!(IamError::NoAuthContext.kind(), None);
        assert_eq!(IamError::SdkDisabled.kind(), None);
        assert!(IamError::SdkDisabled.is_enforcement_bypass());
        assert!(!IamError::NoAuthContext.is_enforcement_bypass());
    }

    #[test]
    fn irn_validation_is_bad_request() {
        let err: IamError = IrnError::EmptyField {
            field: "resource_id",
        }
        .into();
        assert_eq!(err.kind(), Some(ErrorKind::BadRequest));
    }
}
