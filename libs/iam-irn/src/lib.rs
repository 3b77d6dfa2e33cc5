#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Identity/Resource Names.
//!
//! - [`Irn`] - immutable value object naming a principal or a resource
//! - [`split_path`] / [`join_path`] - resource path helpers
//! - [`IrnError`] - construction, parse and decode failures

pub mod codec;
pub mod error;
pub mod irn;
pub mod path;

pub use error::IrnError;
pub use irn::{FIELD_SEPARATOR, IRN_SCHEME, Irn, IrnBuilder};
pub use path::{PATH_SEPARATOR, join_path, split_path};
