use clap::Args;
use snafu::ResultExt;

use crate::{
    cli::{
        Error, error,
        internal::{self, ChartArgs, OutputFormat, ReleaseResolver},
    },
    config::Config,
    ui::table::IdentityExt,
};

#[derive(Args, Clone)]
pub struct ResolveCommand {
    #[arg(help = "Names of the releases to resolve", required = true)]
    pub release_names: Vec<String>,

    #[command(flatten)]
    pub chart: ChartArgs,

    #[arg(
        short = 'o',
        long = "output",
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Output format"
    )]
    pub output: OutputFormat,
}

impl ResolveCommand {
    pub fn run(self, config: Config) -> Result<(), Error> {
        let Self { release_names, chart, output } = self;
        let resolver = ReleaseResolver::new(config, chart)?;
        let identities = release_names
            .iter()
            .map(|release_name| resolver.resolve(release_name))
            .collect::<Result<Vec<_>, _>>()?;

        let output = match output {
            OutputFormat::Table => identities.render_table(),
            OutputFormat::Yaml => {
                serde_yaml::to_string(&identities).context(error::SerializeYamlSnafu)?
            }
            OutputFormat::Json => {
                serde_json::to_string_pretty(&identities).context(error::SerializeJsonSnafu)?
            }
        };
        internal::write_stdout(&output)
    }
}
