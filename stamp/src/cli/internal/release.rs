use std::path::PathBuf;

use clap::Args;
use stamp_identity::{ReleaseIdentity, ResolvedIdentity};

use crate::{
    cli::Error,
    config::{ChartConfig, Config},
    values::{SetOverride, Values},
};

/// Where a release's chart, namespace and values come from.
#[derive(Args, Clone)]
pub struct ChartArgs {
    #[arg(
        short = 'n',
        long = "namespace",
        help = "Namespace of the release. Defaults to defaultNamespace from the configuration."
    )]
    pub namespace: Option<String>,

    #[arg(
        long = "chart-file",
        help = "Read the chart name, version and appVersion from this Chart.yaml instead of the \
                configuration."
    )]
    pub chart_file: Option<PathBuf>,

    #[arg(
        short = 'f',
        long = "values",
        help = "Values file to merge over the defaults. May be given multiple times; later files \
                take precedence."
    )]
    pub values_files: Vec<PathBuf>,

    #[arg(
        long = "set",
        help = "Set a value on the command line (e.g. service.port=9090). May be given multiple \
                times."
    )]
    pub set: Vec<SetOverride>,

    #[arg(
        long = "set-string",
        value_parser = SetOverride::parse_string,
        help = "Set a string value on the command line, without YAML parsing of the value."
    )]
    pub set_string: Vec<SetOverride>,
}

/// Resolves release names of one chart, with one set of values, in one
/// namespace.
pub struct ReleaseResolver {
    chart: ChartConfig,
    values: Values,
    namespace: String,
    config: Config,
}

impl ReleaseResolver {
    /// Loads the chart and the values `args` name.
    ///
    /// # Errors
    ///
    /// Returns an error if the chart file or a values file cannot be read, or
    /// if the merged values are invalid.
    pub fn new(config: Config, args: ChartArgs) -> Result<Self, Error> {
        let ChartArgs { namespace, chart_file, values_files, set, set_string } = args;

        let chart = match chart_file {
            Some(path) => ChartConfig::from_chart_file(path)?,
            None => config.chart.clone(),
        };
        let overrides = set.into_iter().chain(set_string).collect::<Vec<_>>();
        let values = Values::load(&values_files, &overrides)?;
        let namespace = namespace
            .filter(|namespace| !namespace.is_empty())
            .unwrap_or_else(|| config.default_namespace.clone());

        Ok(Self { chart, values, namespace, config })
    }

    pub const fn values(&self) -> &Values { &self.values }

    /// Derives the identity of `release_name`.
    ///
    /// # Errors
    ///
    /// Returns an error if a name does not form a valid identity.
    pub fn resolve(&self, release_name: &str) -> Result<ResolvedIdentity, Error> {
        let Self { chart, values, namespace, config } = self;

        let chart = chart.to_identity(&values.name_override)?;
        let release = ReleaseIdentity::new(release_name, namespace)
            .and_then(|release| release.with_full_name_override(&values.fullname_override))?;
        let identity =
            stamp_identity::resolve(&chart, &release, &values.image_config(&config.registry))?;

        tracing::debug!(
            "Resolved release {release_name} in {namespace} as {}",
            identity.full_name()
        );
        Ok(identity)
    }
}
