use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("{source}"))]
    Configuration { source: crate::config::Error },

    #[snafu(display("{source}"))]
    Values { source: crate::values::Error },

    #[snafu(display("{source}"))]
    Identity { source: stamp_identity::Error },

    #[snafu(display("{source}"))]
    Render { source: crate::render::Error },

    #[snafu(display("{source}"))]
    Audit { source: crate::audit::Error },

    #[snafu(display("Failed to write to stdout, error: {source}"))]
    WriteStdout { source: std::io::Error },

    #[snafu(display("Failed to serialize output as YAML, error: {source}"))]
    SerializeYaml { source: serde_yaml::Error },

    #[snafu(display("Failed to serialize output as JSON, error: {source}"))]
    SerializeJson { source: serde_json::Error },

    #[snafu(display("Failed to initialize Kubernetes client configuration, error: {source}"))]
    KubeConfig {
        #[snafu(source(from(kube::Error, Box::new)))]
        source: Box<kube::Error>,
    },

    #[snafu(display("Failed to create tokio runtime, error: {source}"))]
    InitializeTokioRuntime { source: std::io::Error },
}

impl From<crate::config::Error> for Error {
    fn from(source: crate::config::Error) -> Self { Self::Configuration { source } }
}

impl From<crate::values::Error> for Error {
    fn from(source: crate::values::Error) -> Self { Self::Values { source } }
}

impl From<stamp_identity::Error> for Error {
    fn from(source: stamp_identity::Error) -> Self { Self::Identity { source } }
}

impl From<crate::render::Error> for Error {
    fn from(source: crate::render::Error) -> Self { Self::Render { source } }
}

impl From<crate::audit::Error> for Error {
    fn from(source: crate::audit::Error) -> Self { Self::Audit { source } }
}
