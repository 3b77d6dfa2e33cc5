//! Resource, resource type and policy lifecycle.

use std::sync::Arc;

use async_trait::async_trait;
use iam_client_sdk::{
    IamError, Irn, PrincipalContext, ResourceLocator, ResourceManagerClient, ResourceTypeInfo,
    ResourceTypeSpec,
};
use iam_irn::{join_path, split_path};

use crate::config::EnforcementMode;
use crate::domain::authority::RemoteAuthority;
use crate::domain::{ensure_enforced, require_non_empty};

/// Application that owns application IRNs.
const IAM_APPLICATION: &str = "iamcore";
const APPLICATION_RESOURCE_TYPE: &str = "application";

/// [`ResourceManagerClient`] backed by a [`RemoteAuthority`].
pub struct ResourceManagerService {
    authority: Arc<dyn RemoteAuthority>,
    enforcement: EnforcementMode,
    page_size: u32,
}

impl ResourceManagerService {
    #[must_use]
    pub fn new(
        authority: Arc<dyn RemoteAuthority>,
        enforcement: EnforcementMode,
        page_size: u32,
    ) -> Self {
        Self {
            authority,
            enforcement,
            page_size: page_size.max(1),
        }
    }
}

fn resource_irn(account_id: &str, resource: &ResourceLocator) -> Result<Irn, IamError> {
    Irn::new(
        account_id,
        &resource.application,
        resource.tenant_id.as_deref(),
        &split_path(&resource.resource_path),
        &resource.resource_type,
        &resource.resource_id,
    )
    .map_err(IamError::from)
}

fn application_irn(account_id: &str, application: &str) -> Result<Irn, IamError> {
    Irn::new::<&str>(
        account_id,
        IAM_APPLICATION,
        None,
        &[],
        APPLICATION_RESOURCE_TYPE,
        application,
    )
    .map_err(IamError::from)
}

#[async_trait]
impl ResourceManagerClient for ResourceManagerService {
    async fn create_resource(
        &self,
        ctx: &PrincipalContext,
        resource: &ResourceLocator,
    ) -> Result<(), IamError> {
        ensure_enforced(self.enforcement, "create_resource")?;
        let irn = resource_irn(ctx.account_id(), resource)?;

        let normalized = ResourceLocator {
            resource_path: join_path(irn.path()),
            tenant_id: irn.tenant_id().map(ToOwned::to_owned),
            ..resource.clone()
        };
        self.authority
            .create_resource(ctx.authorization_header(), &normalized)
            .await?;
        tracing::debug!(resource = %irn, "resource created");
        Ok(())
    }

    async fn delete_resource(
        &self,
        ctx: &PrincipalContext,
        resource: &ResourceLocator,
    ) -> Result<(), IamError> {
        ensure_enforced(self.enforcement, "delete_resource")?;
        let header = ctx.authorization_header();

        // the account comes from the identity the server sees for this credential
        let principal = self.authority.principal_irn(header).await?;
        let irn = resource_irn(principal.account_id(), resource)?;

        self.authority.delete_resource(header, &irn).await?;
        tracing::debug!(resource = %irn, "resource deleted");
        Ok(())
    }

    async fn create_resource_type(
        &self,
        ctx: &PrincipalContext,
        account_id: &str,
        application: &str,
        spec: &ResourceTypeSpec,
    ) -> Result<(), IamError> {
        ensure_enforced(self.enforcement, "create_resource_type")?;
        require_non_empty("resource type", &spec.resource_type)?;
        let application = application_irn(account_id, application)?;

        let spec = ResourceTypeSpec {
            operations: spec
                .operations
                .iter()
                .filter(|op| !op.is_empty())
                .cloned()
                .collect(),
            ..spec.clone()
        };
        self.authority
            .create_resource_type(ctx.authorization_header(), &application, &spec)
            .await
    }

    async fn resource_types(
        &self,
        ctx: &PrincipalContext,
        account_id: &str,
        application: &str,
    ) -> Result<Vec<ResourceTypeInfo>, IamError> {
        ensure_enforced(self.enforcement, "resource_types")?;
        let application = application_irn(account_id, application)?;
        let header = ctx.authorization_header();

        let mut collected = Vec::new();
        let mut page = 1;
        loop {
            let batch = self
                .authority
                .resource_types_page(header, &application, page, self.page_size)
                .await?;
            if batch.items.is_empty() {
                break;
            }
            collected.extend(batch.items);
            // without a reported total, only an empty page ends the listing
            if batch
                .total
                .is_some_and(|total| collected.len() as u64 >= total)
            {
                break;
            }
            page += 1;
        }
        Ok(collected)
    }

    async fn attach_user_to_policy(
        &self,
        ctx: &PrincipalContext,
        application: &str,
        tenant_id: Option<&str>,
        resource_type: &str,
        policy_id: &str,
        user_irn: &Irn,
    ) -> Result<(), IamError> {
        ensure_enforced(self.enforcement, "attach_user_to_policy")?;
        let policy = Irn::new::<&str>(
            user_irn.account_id(),
            application,
            tenant_id,
            &[],
            resource_type,
            policy_id,
        )?;

        self.authority
            .attach_policy(
                ctx.authorization_header(),
                &policy,
                std::slice::from_ref(user_irn),
            )
            .await
    }
}
