//! IAM Client
//!
//! Authenticates inbound HTTP requests against a remote IAM server and asks it
//! for resource/action authorization decisions.
//!
//! - [`IamClient`] - facade wiring configuration, transport and services
//! - [`AuthenticatorChain`] with [`BearerToken`], [`ApiKey`] and [`AmbientCredential`]
//! - [`authn_middleware`] and the [`Principal`] extractor for axum
//! - [`RemoteAuthority`] - transport seam, implemented over HTTP by [`HttpAuthority`]
//!
//! Enforcement can be disabled through [`EnforcementMode`]; every skipped check
//! is then logged under the [`AUDIT_TARGET`] tracing target.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod client;
pub mod config;
pub mod domain;
pub mod infra;

pub use api::middleware::{AuthnState, Principal, authn_middleware};
pub use client::{IamClient, IamClientError};
pub use config::{ConfigError, EnforcementMode, IamClientConfig};
pub use domain::AUDIT_TARGET;
pub use domain::authenticator::{AmbientCredential, ApiKey, Authenticator, BearerToken};
pub use domain::authority::{RemoteAuthority, ResourceTypePage, TypeGrantQuery};
pub use domain::authorization::AuthorizationService;
pub use domain::chain::AuthenticatorChain;
pub use domain::resource_manager::ResourceManagerService;
pub use infra::http_authority::HttpAuthority;
