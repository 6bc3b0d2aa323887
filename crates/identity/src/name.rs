use std::{fmt, ops::Deref, sync::LazyLock};

use regex::Regex;
use serde::Serialize;
use snafu::ensure;

use crate::error::{Error, Field, InvalidIdentitySnafu, Reason};

const DNS_LABEL_FMT: &str = "[a-z0-9]([-a-z0-9]*[a-z0-9])?";
const DNS_LABEL_EXPECTED: &str = "lowercase alphanumeric characters or '-', starting and ending \
                                  with an alphanumeric character";

static DNS_LABEL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{DNS_LABEL_FMT}$")).expect("failed to compile DNS label regex")
});

/// A validated RFC 1123 DNS label: the shape Kubernetes requires of object
/// names and the shape every name in a resolved identity takes.
///
/// Instances can only be created inside this crate, through validation. It
/// implements [`Deref`] to `str` for read-only access.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct DnsLabel(String);

impl DnsLabel {
    /// Validates `value` as is.
    pub(crate) fn parse(field: Field, value: &str, max_length: usize) -> Result<Self, Error> {
        ensure!(!value.is_empty(), InvalidIdentitySnafu { field, value, reason: Reason::Empty });
        ensure!(
            value.len() <= max_length,
            InvalidIdentitySnafu {
                field,
                value,
                reason: Reason::TooLong { length: value.len(), max_length }
            }
        );
        ensure!(
            DNS_LABEL_REGEX.is_match(value),
            InvalidIdentitySnafu {
                field,
                value,
                reason: Reason::InvalidFormat { expected: DNS_LABEL_EXPECTED }
            }
        );
        Ok(Self(value.to_string()))
    }

    /// Normalizes `value` (trim, lowercase, `_` to `-`), truncates it to
    /// `max_length` and trims trailing `-` before validating it.
    pub(crate) fn normalize(field: Field, value: &str, max_length: usize) -> Result<Self, Error> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        ensure!(
            normalized.is_ascii(),
            InvalidIdentitySnafu {
                field,
                value,
                reason: Reason::InvalidFormat { expected: DNS_LABEL_EXPECTED }
            }
        );
        let truncated = truncate(&normalized, max_length);
        ensure!(!truncated.is_empty(), InvalidIdentitySnafu { field, value, reason: Reason::Empty });
        Self::parse(field, truncated, max_length).map_err(|err| match err {
            Error::InvalidIdentity { reason, .. } => {
                Error::InvalidIdentity { field, value: value.to_string(), reason }
            }
        })
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str { &self.0 }
}

impl Deref for DnsLabel {
    type Target = str;

    fn deref(&self) -> &Self::Target { &self.0 }
}

impl AsRef<str> for DnsLabel {
    fn as_ref(&self) -> &str { &self.0 }
}

impl fmt::Display for DnsLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// Cuts an ASCII name down to `max_length` bytes and drops any trailing `-`
/// the cut exposed.
pub(crate) fn truncate(value: &str, max_length: usize) -> &str {
    let end = value.len().min(max_length);
    value.get(..end).unwrap_or(value).trim_end_matches('-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_dns_label() {
        let label = DnsLabel::parse(Field::ReleaseName, "app1", 53).unwrap();
        assert_eq!(label.as_str(), "app1");
    }

    #[test]
    fn test_parse_rejects_empty() {
        let err = DnsLabel::parse(Field::ReleaseName, "", 53).unwrap_err();
        assert!(matches!(err, Error::InvalidIdentity { reason: Reason::Empty, .. }));
    }

    #[test]
    fn test_parse_rejects_uppercase_and_dots() {
        for value in ["App1", "app.1", "-app", "app-", "app_1"] {
            let err = DnsLabel::parse(Field::ReleaseName, value, 53).unwrap_err();
            assert!(
                matches!(err, Error::InvalidIdentity { reason: Reason::InvalidFormat { .. }, .. }),
                "{value} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_rejects_too_long() {
        let value = "a".repeat(54);
        let err = DnsLabel::parse(Field::ReleaseName, &value, 53).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidIdentity {
                field: Field::ReleaseName,
                value,
                reason: Reason::TooLong { length: 54, max_length: 53 }
            }
        );
    }

    #[test]
    fn test_normalize_lowercases_and_maps_underscores() {
        let label = DnsLabel::normalize(Field::ChartName, " Springboot_OCDemo ", 63).unwrap();
        assert_eq!(label.as_str(), "springboot-ocdemo");
    }

    #[test]
    fn test_normalize_truncates_and_trims() {
        let value = format!("{}-tail", "a".repeat(62));
        let label = DnsLabel::normalize(Field::ChartName, &value, 63).unwrap();
        assert_eq!(label.as_str(), "a".repeat(62));
    }

    #[test]
    fn test_normalize_reports_original_value() {
        let err = DnsLabel::normalize(Field::ChartName, "spring boot", 63).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidIdentity { field: Field::ChartName, ref value, .. } if value == "spring boot"
        ));
    }

    #[test]
    fn test_normalize_rejects_non_ascii() {
        assert!(DnsLabel::normalize(Field::ChartName, "spring\u{e9}", 63).is_err());
    }

    #[test]
    fn test_normalize_rejects_only_separators() {
        let err = DnsLabel::normalize(Field::ChartName, "---", 63).unwrap_err();
        assert!(matches!(err, Error::InvalidIdentity { reason: Reason::Empty, .. }));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("springboot-ocdemo", 11), "springboot");
        assert_eq!(truncate("springboot-ocdemo", 63), "springboot-ocdemo");
        assert_eq!(truncate("ab", 0), "");
    }
}
