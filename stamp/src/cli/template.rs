use clap::Args;

use crate::{
    cli::{
        Error,
        internal::{self, ChartArgs, ReleaseResolver},
    },
    config::Config,
    render::{self, Format},
};

#[derive(Args, Clone)]
pub struct TemplateCommand {
    #[arg(help = "Name of the release to render")]
    pub release_name: String,

    #[command(flatten)]
    pub chart: ChartArgs,

    #[arg(
        short = 'o',
        long = "output",
        value_enum,
        default_value_t = Format::Yaml,
        help = "Output format: YAML documents or a JSON List"
    )]
    pub output: Format,
}

impl TemplateCommand {
    pub fn run(self, config: Config) -> Result<(), Error> {
        let Self { release_name, chart, output } = self;
        let resolver = ReleaseResolver::new(config, chart)?;
        let identity = resolver.resolve(&release_name)?;

        let manifests = render::render(&identity, resolver.values());
        tracing::info!(
            "Rendered {} manifests for release {release_name} in {}",
            manifests.len(),
            identity.namespace()
        );
        internal::write_stdout(&render::serialize(&manifests, output)?)
    }
}
