//! Wire DTOs of the IAM server HTTP API.

use iam_client_sdk::Irn;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub struct PagedEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub count: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct EvaluateRequest<'a> {
    pub resources: &'a [Irn],
    pub action: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateOnResourceTypeRequest<'a> {
    pub action: &'a str,
    pub resource_type: &'a str,
    pub application: &'a str,
    #[serde(rename = "tenantID", skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct EvaluateActionsRequest<'a> {
    pub irns: &'a [Irn],
    pub actions: &'a [String],
}

#[derive(Debug, Serialize)]
pub struct DatabaseQueryFilterRequest<'a> {
    pub action: &'a str,
    pub database: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResourceRequest<'a> {
    pub name: &'a str,
    pub application: &'a str,
    pub path: &'a str,
    pub resource_type: &'a str,
    pub enabled: bool,
    #[serde(rename = "tenantID", skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResourceTypeRequest<'a> {
    #[serde(rename = "type")]
    pub resource_type: &'a str,
    pub action_prefix: &'a str,
    pub operations: &'a [String],
}

#[derive(Debug, Serialize)]
pub struct AttachPrincipalsRequest<'a> {
    #[serde(rename = "principalIRNs")]
    pub principal_irns: &'a [Irn],
}
