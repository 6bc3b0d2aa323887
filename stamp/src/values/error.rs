use std::path::PathBuf;

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Failed to open values file {}, error: {source}", filename.display()))]
    OpenValues { filename: PathBuf, source: std::io::Error },

    #[snafu(display("Failed to parse values file {}, error: {source}", filename.display()))]
    ParseValues { filename: PathBuf, source: serde_yaml::Error },

    #[snafu(display("Invalid --set expression '{expression}': expected KEY=VALUE"))]
    ParseOverride { expression: String },

    #[snafu(display("Failed to apply values, error: {source}"))]
    ApplyValues { source: serde_yaml::Error },

    #[snafu(display("Invalid value for '{path}': {message}"))]
    InvalidValue { path: &'static str, message: String },
}
