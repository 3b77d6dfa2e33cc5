//! Public API traits of the IAM client.

use std::collections::HashMap;

use async_trait::async_trait;
use iam_irn::Irn;

use crate::context::PrincipalContext;
use crate::error::IamError;
use crate::models::{
    AllowedAndDeniedIrns, ResourceLocator, ResourceSelector, ResourceTypeInfo, ResourceTypeSpec,
};

/// Authorization decisions delegated to the IAM server.
///
/// Every call is made with the credential of the given [`PrincipalContext`].
/// When enforcement is disabled every method returns [`IamError::SdkDisabled`]
/// without contacting the server.
///
/// ```ignore
/// let authz: Arc<dyn AuthorizationClient> = client.authorization();
///
/// let selector = ResourceSelector::new("fleet", "device").resource_ids(["dev-1"]);
/// authz.authorize(&ctx, &selector, &["fleet:device:update".to_owned()]).await?;
/// ```
#[async_trait]
pub trait AuthorizationClient: Send + Sync {
    /// Resource IDs on which the principal holds the requested actions.
    ///
    /// - With `selector.resource_ids` set: succeeds only if every action is
    ///   granted on every resource and echoes the IDs back.
    /// - Without IDs: discovers resources of the type granted for each action
    ///   and returns their union, deduplicated in first-seen order.
    ///
    /// # Errors
    ///
    /// - `BadRequest` if `actions` is empty or any action, ID or the resource type contains `*`
    /// - `Forbidden` if any resource is denied for any action
    /// - `Unauthenticated` if the IAM server rejects the credential
    /// - `InvalidIrn` if the selector does not form valid IRNs
    async fn authorize(
        &self,
        ctx: &PrincipalContext,
        selector: &ResourceSelector,
        actions: &[String],
    ) -> Result<Vec<String>, IamError>;

    /// Same contract as [`AuthorizationClient::authorize`], restricted to
    /// resources registered on the IAM server.
    ///
    /// # Errors
    ///
    /// See [`AuthorizationClient::authorize`].
    async fn authorize_resources(
        &self,
        ctx: &PrincipalContext,
        selector: &ResourceSelector,
        actions: &[String],
    ) -> Result<Vec<String>, IamError>;

    /// Subset of `selector.resource_ids` on which `action` is granted, in input order.
    ///
    /// # Errors
    ///
    /// - `BadRequest` on wildcards
    /// - `Unauthenticated` if the IAM server rejects the credential
    async fn filter_authorized_resources(
        &self,
        ctx: &PrincipalContext,
        selector: &ResourceSelector,
        action: &str,
    ) -> Result<Vec<String>, IamError>;

    /// Per-action allow/deny partition of `irns`.
    ///
    /// # Errors
    ///
    /// - `BadRequest` if the request is rejected
    /// - `Unauthenticated` if the IAM server rejects the credential
    async fn evaluate_actions_on_irns(
        &self,
        ctx: &PrincipalContext,
        actions: &[String],
        irns: &[Irn],
    ) -> Result<HashMap<String, AllowedAndDeniedIrns>, IamError>;

    /// Opaque query predicate selecting rows the principal may act on.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if the principal has no grant for `action` at all
    /// - `BadRequest` for an unsupported `database`
    async fn authorization_db_query_filter(
        &self,
        ctx: &PrincipalContext,
        action: &str,
        database: &str,
    ) -> Result<String, IamError>;
}

/// Resource, resource type and policy lifecycle on the IAM server.
#[async_trait]
pub trait ResourceManagerClient: Send + Sync {
    /// Register a resource.
    ///
    /// # Errors
    ///
    /// `Conflict` if it already exists; `Forbidden`, `Unauthenticated`,
    /// `BadRequest`, `Unknown` as reported by the IAM server.
    async fn create_resource(
        &self,
        ctx: &PrincipalContext,
        resource: &ResourceLocator,
    ) -> Result<(), IamError>;

    /// Delete a resource owned by the principal's account.
    ///
    /// # Errors
    ///
    /// `Forbidden`, `Unauthenticated`, `BadRequest`, `Unknown` as reported by
    /// the IAM server; `InvalidIrn` for malformed input.
    async fn delete_resource(
        &self,
        ctx: &PrincipalContext,
        resource: &ResourceLocator,
    ) -> Result<(), IamError>;

    /// Create a resource type for an application.
    ///
    /// # Errors
    ///
    /// `Forbidden`, `Unauthenticated`, `BadRequest`, `Unknown` as reported by the IAM server.
    async fn create_resource_type(
        &self,
        ctx: &PrincipalContext,
        account_id: &str,
        application: &str,
        spec: &ResourceTypeSpec,
    ) -> Result<(), IamError>;

    /// All resource types of an application.
    ///
    /// # Errors
    ///
    /// `Forbidden`, `Unauthenticated`, `BadRequest`, `Unknown` as reported by the IAM server.
    async fn resource_types(
        &self,
        ctx: &PrincipalContext,
        account_id: &str,
        application: &str,
    ) -> Result<Vec<ResourceTypeInfo>, IamError>;

    /// Attach a user to a policy.
    ///
    /// # Errors
    ///
    /// `Forbidden`, `Unauthenticated`, `BadRequest`, `Unknown` as reported by the IAM server.
    async fn attach_user_to_policy(
        &self,
        ctx: &PrincipalContext,
        application: &str,
        tenant_id: Option<&str>,
        resource_type: &str,
        policy_id: &str,
        user_irn: &Irn,
    ) -> Result<(), IamError>;
}
