//! Domain models for the IAM client.

use iam_irn::Irn;
use serde::{Deserialize, Serialize};

/// Marker the IAM server interprets as "any". Callers must never pass it.
pub const WILDCARD: char = '*';

/// Resources an authorization query is about.
///
/// All resources share the same account, application, tenant, type and path;
/// only the resource ID varies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceSelector {
    /// Application that owns the resource type.
    pub application: String,
    /// Resource type (e.g. `"device"`).
    pub resource_type: String,
    /// Owning account. Defaults to the principal's account.
    pub account_id: Option<String>,
    /// Tenant scope, if any.
    pub tenant_id: Option<String>,
    /// Slash-delimited resource path; empty or `"/"` for the root.
    pub resource_path: String,
    /// Specific resources. Empty means "every resource of this type".
    pub resource_ids: Vec<String>,
}

impl ResourceSelector {
    #[must_use]
    pub fn new(application: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self {
            application: application.into(),
            resource_type: resource_type.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    /// Set the tenant scope. An empty tenant means "no tenant".
    #[must_use]
    pub fn tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        let tenant_id = tenant_id.into();
        self.tenant_id = (!tenant_id.is_empty()).then_some(tenant_id);
        self
    }

    #[must_use]
    pub fn resource_path(mut self, resource_path: impl Into<String>) -> Self {
        self.resource_path = resource_path.into();
        self
    }

    #[must_use]
    pub fn resource_ids<I, S>(mut self, resource_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resource_ids = resource_ids.into_iter().map(Into::into).collect();
        self
    }
}

/// Partition of a requested IRN set for a single action.
///
/// Every requested IRN appears in exactly one of `allowed` / `denied`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedAndDeniedIrns {
    #[serde(default, alias = "Allowed")]
    pub allowed: Vec<Irn>,
    #[serde(default, alias = "Denied")]
    pub denied: Vec<Irn>,
}

/// A single resource managed on the IAM server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceLocator {
    pub application: String,
    pub tenant_id: Option<String>,
    pub resource_type: String,
    /// Slash-delimited path; empty means the root.
    pub resource_path: String,
    pub resource_id: String,
}

/// Definition of a new resource type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceTypeSpec {
    pub resource_type: String,
    pub action_prefix: String,
    /// Operation names; empty entries are ignored.
    pub operations: Vec<String>,
}

/// Resource type as reported by the IAM server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTypeInfo {
    #[serde(default)]
    pub id: String,
    pub irn: Irn,
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub action_prefix: String,
    #[serde(default)]
    pub operations: Vec<String>,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub updated: String,
}
