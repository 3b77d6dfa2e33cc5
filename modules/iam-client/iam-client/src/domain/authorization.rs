//! Authorization protocol on top of the remote authority.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use iam_client_sdk::{
    AllowedAndDeniedIrns, AuthorizationClient, IamError, Irn, PrincipalContext, ResourceSelector,
};

use crate::config::EnforcementMode;
use crate::domain::authority::{DISCOVERY_PAGE_SIZE, RemoteAuthority, TypeGrantQuery};
use crate::domain::{ensure_enforced, reject_wildcard, require_non_empty, resource_irns};

/// [`AuthorizationClient`] backed by a [`RemoteAuthority`].
pub struct AuthorizationService {
    authority: Arc<dyn RemoteAuthority>,
    enforcement: EnforcementMode,
}

impl AuthorizationService {
    #[must_use]
    pub fn new(authority: Arc<dyn RemoteAuthority>, enforcement: EnforcementMode) -> Self {
        Self {
            authority,
            enforcement,
        }
    }

    async fn authorize_flow(
        &self,
        ctx: &PrincipalContext,
        selector: &ResourceSelector,
        actions: &[String],
        operation: &'static str,
    ) -> Result<Vec<String>, IamError> {
        ensure_enforced(self.enforcement, operation)?;
        validate_actions(actions)?;
        validate_selector(selector)?;

        if selector.resource_ids.is_empty() {
            return self.discover(ctx, selector, actions).await;
        }

        let irns = resource_irns(ctx, selector)?;
        for action in actions {
            self.authority
                .evaluate_on_resources(ctx.authorization_header(), action, &irns)
                .await
                .inspect_err(|e| {
                    tracing::debug!(action = %action, error = %e, "authorization denied");
                })?;
        }
        Ok(selector.resource_ids.clone())
    }

    /// Union of the resources granted for each action, deduplicated in first-seen order.
    async fn discover(
        &self,
        ctx: &PrincipalContext,
        selector: &ResourceSelector,
        actions: &[String],
    ) -> Result<Vec<String>, IamError> {
        let lookups = actions.iter().map(|action| {
            self.authority.authorized_on_resource_type(
                ctx.authorization_header(),
                TypeGrantQuery {
                    action,
                    application: &selector.application,
                    resource_type: &selector.resource_type,
                    tenant_id: selector.tenant_id.as_deref(),
                },
                DISCOVERY_PAGE_SIZE,
            )
        });
        let per_action = try_join_all(lookups).await?;

        let mut seen = HashSet::new();
        let ids: Vec<String> = per_action
            .into_iter()
            .flatten()
            .map(|irn| irn.resource_id().to_owned())
            .filter(|id| seen.insert(id.clone()))
            .collect();

        tracing::debug!(
            resource_type = %selector.resource_type,
            actions = actions.len(),
            granted = ids.len(),
            "resource type discovery"
        );
        Ok(ids)
    }

    async fn evaluate_partitioned(
        &self,
        ctx: &PrincipalContext,
        actions: &[String],
        irns: &[Irn],
    ) -> Result<HashMap<String, AllowedAndDeniedIrns>, IamError> {
        let actions = dedup(actions);
        let irns = dedup(irns);
        if irns.is_empty() {
            return Ok(actions
                .into_iter()
                .map(|action| (action, AllowedAndDeniedIrns::default()))
                .collect());
        }

        let mut answer = self
            .authority
            .evaluate_actions_on_irns(ctx.authorization_header(), &actions, &irns)
            .await?;

        Ok(actions
            .into_iter()
            .map(|action| {
                let partition = partition(&irns, answer.remove(&action));
                (action, partition)
            })
            .collect())
    }
}

#[async_trait]
impl AuthorizationClient for AuthorizationService {
    async fn authorize(
        &self,
        ctx: &PrincipalContext,
        selector: &ResourceSelector,
        actions: &[String],
    ) -> Result<Vec<String>, IamError> {
        self.authorize_flow(ctx, selector, actions, "authorize")
            .await
    }

    async fn authorize_resources(
        &self,
        ctx: &PrincipalContext,
        selector: &ResourceSelector,
        actions: &[String],
    ) -> Result<Vec<String>, IamError> {
        self.authorize_flow(ctx, selector, actions, "authorize_resources")
            .await
    }

    async fn filter_authorized_resources(
        &self,
        ctx: &PrincipalContext,
        selector: &ResourceSelector,
        action: &str,
    ) -> Result<Vec<String>, IamError> {
        ensure_enforced(self.enforcement, "filter_authorized_resources")?;
        validate_action(action)?;
        validate_selector(selector)?;
        if selector.resource_ids.is_empty() {
            return Ok(Vec::new());
        }

        let irns = resource_irns(ctx, selector)?;
        let mut result = self
            .evaluate_partitioned(ctx, &[action.to_owned()], &irns)
            .await?;
        let allowed: HashSet<Irn> = result
            .remove(action)
            .map(|p| p.allowed.into_iter().collect())
            .unwrap_or_default();

        Ok(selector
            .resource_ids
            .iter()
            .zip(&irns)
            .filter(|(_, irn)| allowed.contains(*irn))
            .map(|(id, _)| id.clone())
            .collect())
    }

    async fn evaluate_actions_on_irns(
        &self,
        ctx: &PrincipalContext,
        actions: &[String],
        irns: &[Irn],
    ) -> Result<HashMap<String, AllowedAndDeniedIrns>, IamError> {
        ensure_enforced(self.enforcement, "evaluate_actions_on_irns")?;
        validate_actions(actions)?;
        self.evaluate_partitioned(ctx, actions, irns).await
    }

    async fn authorization_db_query_filter(
        &self,
        ctx: &PrincipalContext,
        action: &str,
        database: &str,
    ) -> Result<String, IamError> {
        ensure_enforced(self.enforcement, "authorization_db_query_filter")?;
        validate_action(action)?;
        require_non_empty("database", database)?;
        self.authority
            .database_query_filter(ctx.authorization_header(), action, database)
            .await
    }
}

fn validate_action(action: &str) -> Result<(), IamError> {
    require_non_empty("action", action)?;
    reject_wildcard("action", action)
}

fn validate_actions(actions: &[String]) -> Result<(), IamError> {
    if actions.is_empty() {
        return Err(IamError::BadRequest("at least one action is required".to_owned()));
    }
    actions.iter().try_for_each(|action| validate_action(action))
}

fn validate_selector(selector: &ResourceSelector) -> Result<(), IamError> {
    require_non_empty("application", &selector.application)?;
    require_non_empty("resource type", &selector.resource_type)?;
    reject_wildcard("resource type", &selector.resource_type)?;
    selector
        .resource_ids
        .iter()
        .try_for_each(|id| reject_wildcard("resource id", id))
}

fn dedup<T: Clone + Eq + std::hash::Hash>(items: &[T]) -> Vec<T> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .iter()
        .filter(|item| seen.insert(*item))
        .cloned()
        .collect()
}

/// Split `requested` by the server's answer. Anything the server did not
/// explicitly allow, or also listed as denied, is denied.
fn partition(requested: &[Irn], answer: Option<AllowedAndDeniedIrns>) -> AllowedAndDeniedIrns {
    let answer = answer.unwrap_or_default();
    let denied: HashSet<&Irn> = answer.denied.iter().collect();
    let allowed: HashSet<&Irn> = answer
        .allowed
        .iter()
        .filter(|irn| !denied.contains(irn))
        .collect();

    let (allowed, denied) = requested
        .iter()
        .cloned()
        .partition(|irn| allowed.contains(irn));
    AllowedAndDeniedIrns { allowed, denied }
}
