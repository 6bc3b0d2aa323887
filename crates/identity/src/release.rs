use stamp_base::consts::k8s::{MAX_NAME_LENGTH, MAX_RELEASE_NAME_LENGTH};

use crate::{
    error::{Error, Field},
    name::DnsLabel,
};

/// One named installation of a chart into a namespace.
///
/// The release name is the instance discriminator of every label set derived
/// from it, so it is validated but never rewritten: two distinct release
/// names always stay distinct.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReleaseIdentity {
    release_name: DnsLabel,
    namespace: DnsLabel,
    full_name_override: Option<DnsLabel>,
}

impl ReleaseIdentity {
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentity`] if the release name is empty, longer
    /// than 53 characters or not a DNS label, or if the namespace is not a DNS
    /// label.
    pub fn new(release_name: &str, namespace: &str) -> Result<Self, Error> {
        Ok(Self {
            release_name: DnsLabel::parse(Field::ReleaseName, release_name, MAX_RELEASE_NAME_LENGTH)?,
            namespace: DnsLabel::parse(Field::Namespace, namespace, MAX_NAME_LENGTH)?,
            full_name_override: None,
        })
    }

    /// Replaces the derived `{release}-{app}` name of every resource. An
    /// empty override leaves the identity unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentity`] if `full_name` cannot be normalized
    /// to a DNS label.
    pub fn with_full_name_override(mut self, full_name: &str) -> Result<Self, Error> {
        if !full_name.trim().is_empty() {
            self.full_name_override =
                Some(DnsLabel::normalize(Field::FullnameOverride, full_name, MAX_NAME_LENGTH)?);
        }
        Ok(self)
    }

    #[inline]
    #[must_use]
    pub fn release_name(&self) -> &DnsLabel { &self.release_name }

    #[inline]
    #[must_use]
    pub fn namespace(&self) -> &DnsLabel { &self.namespace }

    #[inline]
    #[must_use]
    pub const fn full_name_override(&self) -> Option<&DnsLabel> { self.full_name_override.as_ref() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Reason;

    #[test]
    fn test_new() {
        let release = ReleaseIdentity::new("app1", "ns1").unwrap();
        assert_eq!(release.release_name().as_str(), "app1");
        assert_eq!(release.namespace().as_str(), "ns1");
        assert!(release.full_name_override().is_none());
    }

    #[test]
    fn test_release_name_is_not_normalized() {
        let err = ReleaseIdentity::new("App1", "ns1").unwrap_err();
        assert!(matches!(err, Error::InvalidIdentity { field: Field::ReleaseName, .. }));
    }

    #[test]
    fn test_release_name_length_limit() {
        assert!(ReleaseIdentity::new(&"r".repeat(53), "ns1").is_ok());
        let err = ReleaseIdentity::new(&"r".repeat(54), "ns1").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidIdentity {
                field: Field::ReleaseName,
                reason: Reason::TooLong { length: 54, max_length: 53 },
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_namespace() {
        let err = ReleaseIdentity::new("app1", "").unwrap_err();
        assert!(matches!(err, Error::InvalidIdentity { field: Field::Namespace, .. }));
    }

    #[test]
    fn test_full_name_override() {
        let release =
            ReleaseIdentity::new("app1", "ns1").unwrap().with_full_name_override("My_App").unwrap();
        assert_eq!(release.full_name_override().map(DnsLabel::as_str), Some("my-app"));
    }
}
