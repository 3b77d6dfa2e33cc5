//! Compact, URL-safe encoding of IRNs.
//!
//! The IAM server addresses individual resources by the IRN in the URL path,
//! so the canonical form (which contains `/` and `:`) is wrapped in unpadded
//! URL-safe base64.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::error::IrnError;
use crate::irn::Irn;

impl Irn {
    /// Encode as a single URL path segment.
    #[must_use]
    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.to_string())
    }

    /// Decode a value produced by [`Irn::encode`].
    ///
    /// # Errors
    ///
    /// Returns [`IrnError::Encoding`] if the input is not unpadded URL-safe
    /// base64 of a UTF-8 string, or any parse error of the decoded canonical form.
    pub fn decode(encoded: &str) -> Result<Self, IrnError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|e| IrnError::Encoding(e.to_string()))?;
        let canonical = String::from_utf8(bytes).map_err(|e| IrnError::Encoding(e.to_string()))?;
        canonical.parse()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn encoded_form_is_path_safe() {
        let irn = Irn::new(
            "acme",
            "fleet",
            Some("t1"),
            &["eu", "berlin"],
            "device",
            "dev?1",
        )
        .unwrap();
        let encoded = irn.encode();
        assert!(
            encoded
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
            "unexpected character in {encoded}"
        );
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            Irn::decode("***").unwrap_err(),
            IrnError::Encoding(_)
        ));
        // valid base64, but not an IRN
        let not_irn = URL_SAFE_NO_PAD.encode("hello");
        assert!(matches!(
            Irn::decode(&not_irn).unwrap_err(),
            IrnError::Malformed { .. }
        ));
    }
}
