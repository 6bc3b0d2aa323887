use clap::Args;
use snafu::ResultExt;

use crate::{
    audit,
    cli::{Error, error, internal},
    ui::table::FindingExt,
};

/// Reads the Services and Pods of a live cluster and reports selectors that
/// reach more than one release. Nothing is modified.
#[derive(Args, Clone)]
pub struct AuditCommand {
    #[arg(
        short = 'n',
        long = "namespace",
        help = "Namespace to audit. Defaults to the current Kubernetes context's namespace."
    )]
    pub namespace: Option<String>,

    #[arg(short = 'A', long = "all-namespaces", help = "Audit every namespace.")]
    pub all_namespaces: bool,

    #[arg(long = "json", help = "Print the findings as JSON instead of a table.")]
    pub json: bool,
}

impl AuditCommand {
    /// Returns the exit code: 1 when an error-severity finding exists.
    pub async fn run(self, kube_client: kube::Client) -> Result<i32, Error> {
        let Self { namespace, all_namespaces, json } = self;
        let namespace = if all_namespaces {
            None
        } else {
            Some(
                namespace
                    .filter(|namespace| !namespace.is_empty())
                    .unwrap_or_else(|| kube_client.default_namespace().to_string()),
            )
        };

        let (services, pods) = audit::fetch(kube_client, namespace.as_deref()).await?;
        let findings = audit::analyze(&services, &pods);
        tracing::info!(
            "Audited {} services and {} pods, {} findings",
            services.len(),
            pods.len(),
            findings.len()
        );

        if json {
            let output = serde_json::to_string_pretty(&findings).context(error::SerializeJsonSnafu)?;
            internal::write_stdout(&output)?;
        } else if !findings.is_empty() {
            internal::write_stdout(&findings.render_table())?;
        }
        Ok(i32::from(audit::has_errors(&findings)))
    }
}
