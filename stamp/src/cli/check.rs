use clap::Args;

use crate::{
    audit,
    cli::{
        Error,
        internal::{self, ChartArgs, ReleaseResolver},
    },
    config::Config,
    render,
    ui::table::FindingExt,
};

/// Renders several releases of one chart side by side and checks that none
/// of them can reach another's pods.
#[derive(Args, Clone)]
pub struct CheckCommand {
    #[arg(help = "Names of the releases installed together", required = true)]
    pub release_names: Vec<String>,

    #[command(flatten)]
    pub chart: ChartArgs,
}

impl CheckCommand {
    /// Returns the exit code: 1 when an error-severity finding exists.
    pub fn run(self, config: Config) -> Result<i32, Error> {
        let Self { release_names, chart } = self;
        let resolver = ReleaseResolver::new(config, chart)?;
        let identities = release_names
            .iter()
            .map(|release_name| resolver.resolve(release_name))
            .collect::<Result<Vec<_>, _>>()?;

        let manifests = identities
            .iter()
            .flat_map(|identity| render::render(identity, resolver.values()))
            .collect::<Vec<_>>();
        let (services, pods) = audit::targets(&manifests);

        let mut findings = audit::analyze_identities(&identities);
        findings.extend(audit::analyze(&services, &pods));

        if findings.is_empty() {
            tracing::info!("{} releases are isolated from each other", identities.len());
            return Ok(0);
        }
        internal::write_stdout(&findings.render_table())?;
        Ok(i32::from(audit::has_errors(&findings)))
    }
}
