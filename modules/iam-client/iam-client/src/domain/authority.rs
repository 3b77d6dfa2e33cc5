//! Seam between the protocol logic and the IAM server transport.

use std::collections::HashMap;

use async_trait::async_trait;
use iam_client_sdk::{
    AllowedAndDeniedIrns, AuthorizationHeader, IamError, Irn, ResourceLocator, ResourceTypeInfo,
    ResourceTypeSpec,
};

/// Page size used for resource-type-wide discovery.
pub const DISCOVERY_PAGE_SIZE: u32 = 100_000;

/// Resource-type-wide grant lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeGrantQuery<'a> {
    pub action: &'a str,
    pub application: &'a str,
    pub resource_type: &'a str,
    pub tenant_id: Option<&'a str>,
}

/// One page of resource types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceTypePage {
    pub items: Vec<ResourceTypeInfo>,
    /// Total number of resource types across all pages, when the server reports it.
    pub total: Option<u64>,
}

/// Calls the remote IAM server makes available.
///
/// Every call carries the caller's [`AuthorizationHeader`] unchanged. Any
/// non-success answer is mapped through [`IamError::from_status`]; transport
/// failures and timeouts become [`IamError::Unknown`].
#[async_trait]
pub trait RemoteAuthority: Send + Sync {
    /// Resolve the identity behind a credential.
    async fn principal_irn(&self, header: &AuthorizationHeader) -> Result<Irn, IamError>;

    /// Succeeds only if `action` is granted on every resource.
    async fn evaluate_on_resources(
        &self,
        header: &AuthorizationHeader,
        action: &str,
        resources: &[Irn],
    ) -> Result<(), IamError>;

    /// Resources of a type on which the action is granted.
    async fn authorized_on_resource_type(
        &self,
        header: &AuthorizationHeader,
        query: TypeGrantQuery<'_>,
        page_size: u32,
    ) -> Result<Vec<Irn>, IamError>;

    /// Per-action allow/deny partition, as answered by the server.
    async fn evaluate_actions_on_irns(
        &self,
        header: &AuthorizationHeader,
        actions: &[String],
        irns: &[Irn],
    ) -> Result<HashMap<String, AllowedAndDeniedIrns>, IamError>;

    async fn database_query_filter(
        &self,
        header: &AuthorizationHeader,
        action: &str,
        database: &str,
    ) -> Result<String, IamError>;

    async fn create_resource(
        &self,
        header: &AuthorizationHeader,
        resource: &ResourceLocator,
    ) -> Result<(), IamError>;

    async fn delete_resource(&self, header: &AuthorizationHeader, irn: &Irn)
    -> Result<(), IamError>;

    async fn create_resource_type(
        &self,
        header: &AuthorizationHeader,
        application: &Irn,
        spec: &ResourceTypeSpec,
    ) -> Result<(), IamError>;

    /// One page of an application's resource types. Pages are 1-based.
    async fn resource_types_page(
        &self,
        header: &AuthorizationHeader,
        application: &Irn,
        page: u32,
        page_size: u32,
    ) -> Result<ResourceTypePage, IamError>;

    async fn attach_policy(
        &self,
        header: &AuthorizationHeader,
        policy: &Irn,
        principals: &[Irn],
    ) -> Result<(), IamError>;
}
