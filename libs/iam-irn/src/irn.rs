use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IrnError;
use crate::path::{PATH_SEPARATOR, join_path};

/// Scheme prefix of the canonical form.
pub const IRN_SCHEME: &str = "irn";

/// Separator between the header fields of the canonical form.
pub const FIELD_SEPARATOR: char = ':';

const ANONYMOUS: &str = "anonymous";

/// Identity/Resource Name.
///
/// Names a principal or a resource managed by the IAM server. Canonical form:
///
/// ```text
/// irn:<account>:<application>:<tenant>:<reserved>:<resource-type>/<path...>/<resource-id>
/// ```
///
/// `<tenant>` is empty when the IRN is not tenant-scoped. `<reserved>` is a
/// header slot the IAM server keeps between tenant and resource type; it is
/// empty in IRNs built here and preserved as-is when parsed. The path part is
/// omitted for resources at the root:
///
/// ```
/// use iam_irn::Irn;
///
/// let irn: Irn = "irn:acme:fleet:::device/eu/berlin/dev-1".parse().unwrap();
/// assert_eq!(irn.account_id(), "acme");
/// assert_eq!(irn.tenant_id(), None);
/// assert_eq!(irn.reserved(), None);
/// assert_eq!(irn.path(), ["eu", "berlin"]);
/// assert_eq!(irn.resource_id(), "dev-1");
/// ```
///
/// IRNs are immutable; equality is structural over all fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Irn {
    account_id: String,
    application: String,
    tenant_id: Option<String>,
    reserved: Option<String>,
    resource_type: String,
    path: Vec<String>,
    resource_id: String,
}

impl Irn {
    /// Build an IRN from its parts.
    ///
    /// An empty `tenant_id` is treated as absent. The reserved slot is left empty.
    ///
    /// # Errors
    ///
    /// Returns [`IrnError`] if a required field is empty, a header field
    /// contains `':'`, the resource type or ID contains `'/'`, or a path
    /// segment is empty or contains `'/'`.
    pub fn new<S: AsRef<str>>(
        account_id: &str,
        application: &str,
        tenant_id: Option<&str>,
        path: &[S],
        resource_type: &str,
        resource_id: &str,
    ) -> Result<Self, IrnError> {
        Self::with_header(
            account_id,
            application,
            tenant_id,
            None,
            path,
            resource_type,
            resource_id,
        )
    }

    fn with_header<S: AsRef<str>>(
        account_id: &str,
        application: &str,
        tenant_id: Option<&str>,
        reserved: Option<&str>,
        path: &[S],
        resource_type: &str,
        resource_id: &str,
    ) -> Result<Self, IrnError> {
        require_non_empty("account_id", account_id)?;
        require_non_empty("application", application)?;
        require_non_empty("resource_type", resource_type)?;
        require_non_empty("resource_id", resource_id)?;

        reject_char("account_id", account_id, FIELD_SEPARATOR)?;
        reject_char("application", application, FIELD_SEPARATOR)?;
        reject_char("resource_type", resource_type, FIELD_SEPARATOR)?;
        reject_char("resource_type", resource_type, PATH_SEPARATOR)?;
        reject_char("resource_id", resource_id, PATH_SEPARATOR)?;

        let tenant_id = tenant_id.filter(|t| !t.is_empty());
        if let Some(tenant) = tenant_id {
            reject_char("tenant_id", tenant, FIELD_SEPARATOR)?;
        }
        let reserved = reserved.filter(|r| !r.is_empty());
        if let Some(reserved) = reserved {
            reject_char("reserved", reserved, FIELD_SEPARATOR)?;
        }

        let path = path
            .iter()
            .map(|segment| {
                let segment = segment.as_ref();
                if segment.is_empty() || segment.contains(PATH_SEPARATOR) {
                    Err(IrnError::InvalidPathSegment {
                        segment: segment.to_owned(),
                    })
                } else {
                    Ok(segment.to_owned())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            account_id: account_id.to_owned(),
            application: application.to_owned(),
            tenant_id: tenant_id.map(ToOwned::to_owned),
            reserved: reserved.map(ToOwned::to_owned),
            resource_type: resource_type.to_owned(),
            path,
            resource_id: resource_id.to_owned(),
        })
    }

    /// Principal standing in for callers whose requests are not authenticated:
    /// `irn:anonymous:iamcore:::user/anonymous`.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            account_id: ANONYMOUS.to_owned(),
            application: "iamcore".to_owned(),
            tenant_id: None,
            reserved: None,
            resource_type: "user".to_owned(),
            path: Vec::new(),
            resource_id: ANONYMOUS.to_owned(),
        }
    }

    /// Create a new IRN builder.
    #[must_use]
    pub fn builder() -> IrnBuilder {
        IrnBuilder::default()
    }

    #[must_use]
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    #[must_use]
    pub fn application(&self) -> &str {
        &self.application
    }

    #[must_use]
    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }

    /// Header slot between tenant and resource type, if the IRN carries one.
    #[must_use]
    pub fn reserved(&self) -> Option<&str> {
        self.reserved.as_deref()
    }

    #[must_use]
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Path segments between the resource type and the resource ID. Empty for the root.
    #[must_use]
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Path rendered as a rooted string (`"/"` for the root).
    #[must_use]
    pub fn path_string(&self) -> String {
        join_path(&self.path)
    }

    #[must_use]
    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }
}

impl fmt::Display for Irn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{IRN_SCHEME}:{}:{}:{}:{}:{}",
            self.account_id,
            self.application,
            self.tenant_id.as_deref().unwrap_or_default(),
            self.reserved.as_deref().unwrap_or_default(),
            self.resource_type,
        )?;
        for segment in &self.path {
            write!(f, "/{segment}")?;
        }
        write!(f, "/{}", self.resource_id)
    }
}

impl FromStr for Irn {
    type Err = IrnError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let malformed = |reason| IrnError::Malformed {
            input: input.to_owned(),
            reason,
        };

        let rest = input
            .strip_prefix(IRN_SCHEME)
            .and_then(|r| r.strip_prefix(FIELD_SEPARATOR))
            .ok_or_else(|| malformed("missing 'irn:' prefix"))?;

        let mut fields = rest.splitn(5, FIELD_SEPARATOR);
        let (
            Some(account_id),
            Some(application),
            Some(tenant_id),
            Some(reserved),
            Some(locator),
        ) = (
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
        )
        else {
            return Err(malformed(
                "expected account, application, tenant, reserved and resource fields",
            ));
        };

        let mut parts: Vec<&str> = locator.split(PATH_SEPARATOR).collect();
        if parts.len() < 2 {
            return Err(malformed("missing resource id"));
        }
        let resource_id = parts.pop().unwrap_or_default();
        let resource_type = parts.remove(0);

        Self::with_header(
            account_id,
            application,
            Some(tenant_id),
            Some(reserved),
            &parts,
            resource_type,
            resource_id,
        )
    }
}

impl TryFrom<String> for Irn {
    type Error = IrnError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Irn> for String {
    fn from(irn: Irn) -> Self {
        irn.to_string()
    }
}

fn require_non_empty(field: &'static str, value: &str) -> Result<(), IrnError> {
    if value.is_empty() {
        return Err(IrnError::EmptyField { field });
    }
    Ok(())
}

fn reject_char(field: &'static str, value: &str, delimiter: char) -> Result<(), IrnError> {
    if value.contains(delimiter) {
        return Err(IrnError::ReservedCharacter {
            field,
            delimiter,
            value: value.to_owned(),
        });
    }
    Ok(())
}

/// Builder for [`Irn`]. Validation happens in [`IrnBuilder::build`].
#[derive(Debug, Default)]
pub struct IrnBuilder {
    account_id: String,
    application: String,
    tenant_id: Option<String>,
    reserved: Option<String>,
    resource_type: String,
    path: Vec<String>,
    resource_id: String,
}

impl IrnBuilder {
    #[must_use]
    pub fn account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = account_id.into();
        self
    }

    #[must_use]
    pub fn application(mut self, application: impl Into<String>) -> Self {
        self.application = application.into();
        self
    }

    #[must_use]
    pub fn tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    #[must_use]
    pub fn reserved(mut self, reserved: impl Into<String>) -> Self {
        self.reserved = Some(reserved.into());
        self
    }

    #[must_use]
    pub fn resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = resource_type.into();
        self
    }

    /// Set the path from a slash-delimited string (see [`split_path`](crate::split_path)).
    #[must_use]
    pub fn path(mut self, path: &str) -> Self {
        self.path = crate::split_path(path);
        self
    }

    #[must_use]
    pub fn path_segments(mut self, segments: Vec<String>) -> Self {
        self.path = segments;
        self
    }

    #[must_use]
    pub fn resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = resource_id.into();
        self
    }

    /// Validate and build the IRN.
    ///
    /// # Errors
    ///
    /// Same as [`Irn::new`].
    pub fn build(self) -> Result<Irn, IrnError> {
        Irn::with_header(
            &self.account_id,
            &self.application,
            self.tenant_id.as_deref(),
            self.reserved.as_deref(),
            &self.path,
            &self.resource_type,
            &self.resource_id,
        )
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn device() -> Irn {
        Irn::new(
            "acme",
            "fleet",
            Some("tenant-1"),
            &["eu", "berlin"],
            "device",
            "dev-1",
        )
        .unwrap()
    }

    #[test]
    fn display_renders_canonical_form() {
        assert_eq!(
            device().to_string(),
            "irn:acme:fleet:tenant-1::device/eu/berlin/dev-1"
        );
    }

    #[test]
    fn display_omits_root_path_and_absent_tenant() {
        let irn = Irn::new::<&str>("acme", "fleet", None, &[], "device", "dev-1").unwrap();
        assert_eq!(irn.to_string(), "irn:acme:fleet:::device/dev-1");
        assert_eq!(irn.path_string(), "/");
    }

    #[test]
    fn empty_tenant_is_absent() {
        let a = Irn::new::<&str>("acme", "fleet", Some(""), &[], "device", "d").unwrap();
        let b = Irn::new::<&str>("acme", "fleet", None, &[], "device", "d").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.tenant_id(), None);
    }

    #[test]
    fn required_fields_are_validated() {
        let cases = [
            ("", "fleet", "device", "d", "account_id"),
            ("acme", "", "device", "d", "application"),
            ("acme", "fleet", "", "d", "resource_type"),
            ("acme", "fleet", "device", "", "resource_id"),
        ];
        for (account, app, ty, id, field) in cases {
            let err = Irn::new::<&str>(account, app, None, &[], ty, id).unwrap_err();
            assert_eq!(err, IrnError::EmptyField { field });
        }
    }

    #[test]
    fn path_segment_with_separator_is_rejected() {
        let err = Irn::new("acme", "fleet", None, &["eu/west"], "device", "d").unwrap_err();
        assert!(matches!(err, IrnError::InvalidPathSegment { .. }));

        let err = Irn::new("acme", "fleet", None, &[""], "device", "d").unwrap_err();
        assert!(matches!(err, IrnError::InvalidPathSegment { .. }));
    }

    #[test]
    fn reserved_characters_in_header_fields_are_rejected() {
        let err = Irn::new::<&str>("ac:me", "fleet", None, &[], "device", "d").unwrap_err();
        assert!(matches!(
            err,
            IrnError::ReservedCharacter {
                field: "account_id",
                ..
            }
        ));

        let err = Irn::new::<&str>("acme", "fleet", None, &[], "dev/ice", "d").unwrap_err();
        assert!(matches!(
            err,
            IrnError::ReservedCharacter {
                field: "resource_type",
                ..
            }
        ));
    }

    #[test]
    fn resource_id_may_contain_field_separator() {
        let irn = Irn::new::<&str>("acme", "fleet", None, &[], "device", "urn:x").unwrap();
        assert_eq!(irn.to_string().parse::<Irn>().unwrap(), irn);
    }

    #[test]
    fn parse_rejects_malformed_input() {
        for input in [
            "",
            "arn:acme:fleet:::device/d",
            "irn:acme:fleet",
            "irn:acme:fleet:::device",
            "irn:acme:fleet::device/d",
            "irn:acme:fleet:::device/",
            "irn::fleet:::device/d",
            "irn:acme:fleet:::device//d",
        ] {
            assert!(input.parse::<Irn>().is_err(), "{input:?} should not parse");
        }
    }

    #[test]
    fn server_issued_irn_round_trips() {
        let raw = "irn:rc73dbh7q0:iamcore:4atcicnisg::user/johndoe";
        let irn: Irn = raw.parse().unwrap();

        assert_eq!(irn.account_id(), "rc73dbh7q0");
        assert_eq!(irn.application(), "iamcore");
        assert_eq!(irn.tenant_id(), Some("4atcicnisg"));
        assert_eq!(irn.reserved(), None);
        assert_eq!(irn.resource_type(), "user");
        assert!(irn.path().is_empty());
        assert_eq!(irn.resource_id(), "johndoe");
        assert_eq!(irn.to_string(), raw);
    }

    #[test]
    fn reserved_slot_is_preserved() {
        let raw = "irn:acme:fleet:t-1:eu-1:device/dev-1";
        let irn: Irn = raw.parse().unwrap();
        assert_eq!(irn.reserved(), Some("eu-1"));
        assert_eq!(irn.resource_type(), "device");
        assert_eq!(irn.to_string(), raw);

        let built = Irn::builder()
            .account_id("acme")
            .application("fleet")
            .tenant_id("t-1")
            .reserved("eu-1")
            .resource_type("device")
            .resource_id("dev-1")
            .build()
            .unwrap();
        assert_eq!(built, irn);
    }

    #[test]
    fn anonymous_is_a_valid_irn() {
        let anonymous = Irn::anonymous();
        assert_eq!(anonymous.to_string(), "irn:anonymous:iamcore:::user/anonymous");
        assert_eq!(anonymous.to_string().parse::<Irn>().unwrap(), anonymous);
    }

    #[test]
    fn builder_matches_constructor() {
        let built = Irn::builder()
            .account_id("acme")
            .application("fleet")
            .tenant_id("tenant-1")
            .path("/eu/berlin/")
            .resource_type("device")
            .resource_id("dev-1")
            .build()
            .unwrap();
        assert_eq!(built, device());
    }

    #[test]
    fn serde_uses_canonical_string() {
        let json = serde_json::to_string(&device()).unwrap();
        assert_eq!(json, "\"irn:acme:fleet:tenant-1::device/eu/berlin/dev-1\"");

        let back: Irn = serde_json::from_str(&json).unwrap();
        assert_eq!(back, device());

        assert!(serde_json::from_str::<Irn>("\"not-an-irn\"").is_err());
    }
}
