use std::sync::LazyLock;

use regex::Regex;
use semver::Version;
use snafu::ensure;
use stamp_base::consts::k8s::MAX_NAME_LENGTH;

use crate::{
    error::{Error, Field, InvalidIdentitySnafu, Reason},
    name::{self, DnsLabel},
};

const LABEL_VALUE_EXPECTED: &str = "alphanumeric characters, '-', '_' or '.', starting and ending \
                                    with an alphanumeric character";

static LABEL_VALUE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9]([-a-zA-Z0-9_.]*[a-zA-Z0-9])?$")
        .expect("failed to compile label value regex")
});

/// The identity of a chart package.
///
/// `app_name` starts out as the normalized chart name and can be replaced
/// with [`ChartIdentity::with_name_override`]. Either way it is a DNS label of
/// at most 63 characters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChartIdentity {
    chart_name: DnsLabel,
    app_name: DnsLabel,
    version: Option<Version>,
    app_version: Option<String>,
}

impl ChartIdentity {
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentity`] if `chart_name` is empty or contains
    /// characters outside the DNS label set after normalization.
    pub fn new(chart_name: &str) -> Result<Self, Error> {
        let chart_name = DnsLabel::normalize(Field::ChartName, chart_name, MAX_NAME_LENGTH)?;
        Ok(Self { app_name: chart_name.clone(), chart_name, version: None, app_version: None })
    }

    /// Derives the application name from `name` instead of the chart name.
    /// An empty override leaves the identity unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentity`] if `name` cannot be normalized to a
    /// DNS label.
    pub fn with_name_override(mut self, name: &str) -> Result<Self, Error> {
        if !name.trim().is_empty() {
            self.app_name = DnsLabel::normalize(Field::NameOverride, name, MAX_NAME_LENGTH)?;
        }
        Ok(self)
    }

    #[must_use]
    pub fn with_version(mut self, version: Version) -> Self {
        self.version = Some(version);
        self
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentity`] if `app_version` is not a valid
    /// Kubernetes label value.
    pub fn with_app_version(mut self, app_version: &str) -> Result<Self, Error> {
        ensure!(
            app_version.len() <= MAX_NAME_LENGTH,
            InvalidIdentitySnafu {
                field: Field::AppVersion,
                value: app_version,
                reason: Reason::TooLong { length: app_version.len(), max_length: MAX_NAME_LENGTH }
            }
        );
        ensure!(
            app_version.is_empty() || LABEL_VALUE_REGEX.is_match(app_version),
            InvalidIdentitySnafu {
                field: Field::AppVersion,
                value: app_version,
                reason: Reason::InvalidFormat { expected: LABEL_VALUE_EXPECTED }
            }
        );
        self.app_version = (!app_version.is_empty()).then(|| app_version.to_string());
        Ok(self)
    }

    #[inline]
    #[must_use]
    pub fn chart_name(&self) -> &DnsLabel { &self.chart_name }

    #[inline]
    #[must_use]
    pub fn app_name(&self) -> &DnsLabel { &self.app_name }

    #[inline]
    #[must_use]
    pub const fn version(&self) -> Option<&Version> { self.version.as_ref() }

    #[inline]
    #[must_use]
    pub fn app_version(&self) -> Option<&str> { self.app_version.as_deref() }

    /// The `helm.sh/chart` label value: `{chart}-{version}` with `+` replaced
    /// by `_`, bounded to 63 characters. `None` without a chart version.
    #[must_use]
    pub fn chart_label(&self) -> Option<String> {
        let version = self.version.as_ref()?;
        let label = format!("{}-{version}", self.chart_name).replace('+', "_");
        Some(
            name::truncate(&label, MAX_NAME_LENGTH)
                .trim_end_matches(|c: char| !c.is_ascii_alphanumeric())
                .to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_name_defaults_to_chart_name() {
        let chart = ChartIdentity::new("springboot-ocdemo").unwrap();
        assert_eq!(chart.app_name().as_str(), "springboot-ocdemo");
        assert_eq!(chart.chart_name().as_str(), "springboot-ocdemo");
    }

    #[test]
    fn test_app_name_is_bounded() {
        let chart = ChartIdentity::new(&format!("{}-x", "c".repeat(62))).unwrap();
        assert_eq!(chart.app_name().len(), 62);
    }

    #[test]
    fn test_empty_chart_name_is_rejected() {
        let err = ChartIdentity::new("").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidIdentity { field: Field::ChartName, reason: Reason::Empty, .. }
        ));
    }

    #[test]
    fn test_name_override() {
        let chart =
            ChartIdentity::new("springboot-ocdemo").unwrap().with_name_override("demo").unwrap();
        assert_eq!(chart.app_name().as_str(), "demo");
        assert_eq!(chart.chart_name().as_str(), "springboot-ocdemo");

        let chart =
            ChartIdentity::new("springboot-ocdemo").unwrap().with_name_override("  ").unwrap();
        assert_eq!(chart.app_name().as_str(), "springboot-ocdemo");
    }

    #[test]
    fn test_app_version_validation() {
        let chart = ChartIdentity::new("demo").unwrap();
        assert_eq!(chart.clone().with_app_version("1.0.0").unwrap().app_version(), Some("1.0.0"));
        assert_eq!(chart.clone().with_app_version("").unwrap().app_version(), None);
        assert!(chart.with_app_version("1.0.0+build 7").is_err());
    }

    #[test]
    fn test_chart_label() {
        let chart = ChartIdentity::new("springboot-ocdemo").unwrap();
        assert_eq!(chart.chart_label(), None);

        let chart = chart.with_version(Version::parse("0.1.0+build.7").unwrap());
        assert_eq!(chart.chart_label().as_deref(), Some("springboot-ocdemo-0.1.0_build.7"));
    }
}
