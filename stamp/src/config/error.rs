use std::path::PathBuf;

use snafu::Snafu;

/// Represents the possible errors that can occur when handling configuration
/// files.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    /// Error returned when the configuration file specified by `filename`
    /// fails to open.
    #[snafu(display("Failed to open config from {}, error: {source}", filename.display()))]
    OpenConfig { filename: PathBuf, source: std::io::Error },

    /// Error returned when the content of the configuration file specified by
    /// `filename` fails to be parsed (e.g., due to invalid YAML syntax).
    #[snafu(display("Failed to parse config from {}, error: {source}", filename.display()))]
    ParseConfig { filename: PathBuf, source: serde_yaml::Error },

    /// Error returned when a file path cannot be resolved to its canonical
    /// form.
    #[snafu(display("Failed to resolve file path {}, error: {source}", file_path.display()))]
    ResolveFilePath { file_path: PathBuf, source: std::io::Error },

    #[snafu(display("Failed to open chart file {}, error: {source}", filename.display()))]
    OpenChartFile { filename: PathBuf, source: std::io::Error },

    #[snafu(display("Failed to parse chart file {}, error: {source}", filename.display()))]
    ParseChartFile { filename: PathBuf, source: serde_yaml::Error },

    /// Error returned when the chart name, name override or app version
    /// cannot form a chart identity.
    #[snafu(display("{source}"))]
    InvalidChart { source: stamp_identity::Error },
}
