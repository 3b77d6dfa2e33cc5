#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! IAM Client SDK
//!
//! This crate provides the public contract of the IAM client:
//!
//! - [`AuthorizationClient`] - authorization decisions against the IAM server
//! - [`ResourceManagerClient`] - resource, resource type and policy lifecycle
//! - [`PrincipalContext`] - request-scoped identity produced by authentication
//! - [`AuthorizationHeader`] - credential forwarded on every IAM server call
//! - [`IamError`], [`ErrorKind`] - error taxonomy
//!
//! ## Usage
//!
//! ```ignore
//! use iam_client_sdk::{AuthorizationClient, ResourceSelector};
//!
//! // `ctx` is the PrincipalContext bound by the authentication middleware
//! let selector = ResourceSelector::new("fleet", "device")
//!     .tenant_id(ctx.tenant_id().unwrap_or_default())
//!     .resource_path("/eu/berlin");
//!
//! // Every device the caller may read
//! let ids = authz.authorize(&ctx, &selector, &["fleet:device:read".to_owned()]).await?;
//! ```

pub mod api;
pub mod context;
pub mod error;
pub mod header;
pub mod models;

pub use api::{AuthorizationClient, ResourceManagerClient};
pub use context::PrincipalContext;
pub use error::{ErrorKind, IamError};
pub use header::{API_KEY_HEADER, AuthorizationHeader};
pub use models::{
    AllowedAndDeniedIrns, ResourceLocator, ResourceSelector, ResourceTypeInfo, ResourceTypeSpec,
    WILDCARD,
};

pub use iam_irn::Irn;
