use std::path::Path;

use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use stamp_base::consts::{DEFAULT_APP_VERSION, DEFAULT_CHART_NAME, DEFAULT_CHART_VERSION};
use stamp_identity::ChartIdentity;

use crate::config::{Error, error};

/// The chart a release is rendered from, in the shape of a `Chart.yaml`.
/// Unknown `Chart.yaml` keys are ignored.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    #[serde(default = "ChartConfig::default_name")]
    pub name: String,

    #[serde(default = "ChartConfig::default_version")]
    pub version: semver::Version,

    #[serde(default = "ChartConfig::default_app_version")]
    pub app_version: Option<String>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            name: Self::default_name(),
            version: Self::default_version(),
            app_version: Self::default_app_version(),
        }
    }
}

impl ChartConfig {
    fn default_name() -> String { DEFAULT_CHART_NAME.to_string() }

    fn default_version() -> semver::Version {
        semver::Version::parse(DEFAULT_CHART_VERSION).unwrap_or(semver::Version::new(0, 1, 0))
    }

    fn default_app_version() -> Option<String> { Some(DEFAULT_APP_VERSION.to_string()) }

    /// Reads a `Chart.yaml`.
    pub fn from_chart_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        let data =
            std::fs::read(&path).context(error::OpenChartFileSnafu { filename: path.clone() })?;
        serde_yaml::from_slice(&data).context(error::ParseChartFileSnafu { filename: path })
    }

    /// Builds the chart identity, applying the `nameOverride` value.
    pub fn to_identity(&self, name_override: &str) -> Result<ChartIdentity, Error> {
        let Self { name, version, app_version } = self;
        ChartIdentity::new(name)
            .and_then(|chart| chart.with_name_override(name_override))
            .map(|chart| chart.with_version(version.clone()))
            .and_then(|chart| chart.with_app_version(app_version.as_deref().unwrap_or_default()))
            .context(error::InvalidChartSnafu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chart_yaml() {
        let chart: ChartConfig = serde_yaml::from_str(
            "apiVersion: v2\nname: springboot-ocdemo\ndescription: demo\ntype: \
             application\nversion: 0.2.1\nappVersion: \"2.0.0\"\n",
        )
        .unwrap();
        assert_eq!(chart.name, "springboot-ocdemo");
        assert_eq!(chart.version, semver::Version::new(0, 2, 1));
        assert_eq!(chart.app_version.as_deref(), Some("2.0.0"));
    }

    #[test]
    fn test_to_identity() {
        let identity = ChartConfig::default().to_identity("").unwrap();
        assert_eq!(identity.app_name().as_str(), "springboot-ocdemo");
        assert_eq!(identity.chart_label().as_deref(), Some("springboot-ocdemo-0.1.0"));
        assert_eq!(identity.app_version(), Some("1.0.0"));

        let identity = ChartConfig::default().to_identity("demo").unwrap();
        assert_eq!(identity.app_name().as_str(), "demo");
    }

    #[test]
    fn test_invalid_chart_name() {
        let chart = ChartConfig { name: "spring boot".to_string(), ..ChartConfig::default() };
        assert!(matches!(chart.to_identity(""), Err(Error::InvalidChart { .. })));
    }
}
