use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Failed to serialize {kind} as YAML, error: {source}"))]
    SerializeYaml { kind: &'static str, source: serde_yaml::Error },

    #[snafu(display("Failed to serialize manifests as JSON, error: {source}"))]
    SerializeJson { source: serde_json::Error },
}
