//! Canonical string construction for request signatures

use std::collections::BTreeSet;

use crate::params::ParameterSet;

/// Parameters that never contribute to the signed payload
pub const DEFAULT_IGNORED_PARAMS: [&str; 3] = ["action", "controller", "signature"];

/// Serializes a parameter set into the string fed to the MAC
///
/// Names are sorted by byte value, ignored names are skipped, and each
/// remaining pair is appended as `name` immediately followed by `value`
/// with no delimiters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canonicalizer {
    ignored: BTreeSet<String>,
}

impl Canonicalizer {
    /// Create a canonicalizer with a custom ignored-name set
    pub fn with_ignored<I, S>(ignored: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ignored: ignored.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `name` is excluded from the canonical string
    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignored.contains(name)
    }

    /// Names excluded from the canonical string
    pub fn ignored(&self) -> impl Iterator<Item = &str> {
        self.ignored.iter().map(String::as_str)
    }

    /// Build the canonical string for `params`
    pub fn canonicalize(&self, params: &ParameterSet) -> String {
        let mut pairs: Vec<_> = params
            .iter()
            .filter(|(name, _)| !self.is_ignored(name))
            .collect();
        // Ordinal byte order, never locale order.
        pairs.sort_by(|(a, _), (b, _)| a.as_bytes().cmp(b.as_bytes()));

        let mut canonical = String::new();
        for (name, value) in pairs {
            canonical.push_str(name);
            canonical.push_str(&value.render());
        }
        canonical
    }
}

impl Default for Canonicalizer {
    fn default() -> Self {
        Self::with_ignored(DEFAULT_IGNORED_PARAMS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_set_is_empty_string() {
        assert_eq!(Canonicalizer::default().canonicalize(&ParameterSet::new()), "");
    }

    #[test]
    fn test_sorted_concatenation() {
        let params = ParameterSet::new()
            .with("timestamp", 1_350_000_000_u64)
            .with("service_id", "svc1")
            .with("code", "12 34");

        assert_eq!(
            Canonicalizer::default().canonicalize(&params),
            "code12 34service_idsvc1timestamp1350000000"
        );
    }

    #[test]
    fn test_ignored_params_are_skipped() {
        let params = ParameterSet::new()
            .with("action", "show")
            .with("controller", "api")
            .with("signature", "deadbeef")
            .with("email", "a@b.c");

        assert_eq!(Canonicalizer::default().canonicalize(&params), "emaila@b.c");
    }

    #[test]
    fn test_byte_order_not_locale_order() {
        let params = ParameterSet::new().with("b", "2").with("B", "1").with("a", "3");
        assert_eq!(Canonicalizer::default().canonicalize(&params), "B1a3b2");
    }

    #[test]
    fn test_custom_ignored_set() {
        let canonicalizer = Canonicalizer::with_ignored(["nonce"]);
        let params = ParameterSet::new().with("nonce", "x").with("signature", "y");

        assert!(canonicalizer.is_ignored("nonce"));
        assert!(!canonicalizer.is_ignored("signature"));
        assert_eq!(canonicalizer.canonicalize(&params), "signaturey");
    }

    #[test]
    fn test_typed_values_render_once() {
        let params = ParameterSet::new()
            .with("fail_on_dui", false)
            .with("count", 7_i64);
        assert_eq!(Canonicalizer::default().canonicalize(&params), "count7fail_on_duifalse");
    }
}
