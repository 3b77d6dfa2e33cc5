pub mod authenticator;
pub mod authority;
pub mod authorization;
pub mod chain;
pub mod resource_manager;

#[cfg(test)]
pub(crate) mod test_support;

use iam_client_sdk::{IamError, PrincipalContext, ResourceSelector, WILDCARD};
use iam_irn::{Irn, split_path};

use crate::config::EnforcementMode;

/// Tracing target of enforcement-bypass records.
pub const AUDIT_TARGET: &str = "iam_client::audit";

/// Fail with [`IamError::SdkDisabled`] when enforcement is off, leaving an audit record.
pub(crate) fn ensure_enforced(
    enforcement: EnforcementMode,
    operation: &'static str,
) -> Result<(), IamError> {
    if enforcement.is_enabled() {
        return Ok(());
    }
    tracing::warn!(target: AUDIT_TARGET, operation, "enforcement disabled, check skipped");
    Err(IamError::SdkDisabled)
}

pub(crate) fn reject_wildcard(what: &str, value: &str) -> Result<(), IamError> {
    if value.contains(WILDCARD) {
        return Err(IamError::BadRequest(format!(
            "{what} must not contain '{WILDCARD}': {value}"
        )));
    }
    Ok(())
}

pub(crate) fn require_non_empty(what: &str, value: &str) -> Result<(), IamError> {
    if value.is_empty() {
        return Err(IamError::BadRequest(format!("{what} is required")));
    }
    Ok(())
}

/// One resource IRN per ID, sharing the selector's account, tenant, type and path.
///
/// The account defaults to the principal's.
pub(crate) fn resource_irns(
    ctx: &PrincipalContext,
    selector: &ResourceSelector,
) -> Result<Vec<Irn>, IamError> {
    let account_id = selector
        .account_id
        .as_deref()
        .unwrap_or_else(|| ctx.account_id());
    let path = split_path(&selector.resource_path);

    selector
        .resource_ids
        .iter()
        .map(|id| {
            Irn::new(
                account_id,
                &selector.application,
                selector.tenant_id.as_deref(),
                &path,
                &selector.resource_type,
                id,
            )
            .map_err(IamError::from)
        })
        .collect()
}
