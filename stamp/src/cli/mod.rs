//! The `stamp` command line.
//!
//! Every release command resolves the identity of the release first and
//! renders from it, so names, labels, selectors and images always agree.
//!
//! # Examples
//!
//! ```bash
//! # Show the name, selector and image release app1 would get
//! stamp resolve app1 -n ns1
//!
//! # Render the manifests of release app1
//! stamp template app1 -n ns1 -f values.yaml --set route.host=app1.apps.example.com
//!
//! # Verify that two releases installed side by side stay apart
//! stamp check app1 app2 -n ns1
//!
//! # Look for Services selecting pods of more than one release
//! stamp audit --all-namespaces
//! ```

mod audit;
mod check;
pub mod error;
mod internal;
mod resolve;
mod template;

use std::{io::Write, path::PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use snafu::ResultExt;
use stamp_base::CLI_PROGRAM_NAME;
use tokio::runtime::Runtime;

pub use self::error::Error;
use self::{
    audit::AuditCommand, check::CheckCommand, resolve::ResolveCommand, template::TemplateCommand,
};
use crate::{config::Config, shadow, values::Values};

#[derive(Parser)]
#[command(
    name = CLI_PROGRAM_NAME,
    author,
    version,
    long_version = shadow::CLAP_LONG_VERSION,
    about = "Stamp: release-scoped identities and manifests for OpenShift application charts.",
    long_about = "Stamp derives the name, labels, selector and image of every release of a \
                  chart from the release name, so several releases of the same chart can run \
                  side by side in one namespace. It renders the release's OpenShift \
                  manifests, checks releases for overlapping selectors offline and audits \
                  live clusters for Services that select pods of more than one release.",
    color = clap::ColorChoice::Always
)]
pub struct Cli {
    #[clap(subcommand)]
    commands: Option<Commands>,

    /// Defaults to `~/.config/stamp/config.yaml`.
    #[clap(
        long = "config",
        short = 'c',
        env = "STAMP_CONFIG_FILE_PATH",
        help = "Specify a configuration file. Defaults to ~/.config/stamp/config.yaml or \
                STAMP_CONFIG_FILE_PATH env var."
    )]
    config_file: Option<PathBuf>,

    #[clap(
        long = "log-level",
        env = "STAMP_LOG_LEVEL",
        help = "Set the logging level (e.g., info, debug, trace)."
    )]
    log_level: Option<tracing::Level>,
}

#[derive(Clone, Subcommand)]
pub enum Commands {
    #[command(about = "Display client and server version information")]
    Version {
        #[clap(long = "client", help = "If true, shows client version only (no server required).")]
        client: bool,
    },

    #[command(about = "Generate shell completion script for the specified shell (bash, zsh, fish)")]
    Completions { shell: clap_complete::Shell },

    #[command(about = "Output the default configuration in YAML format")]
    DefaultConfig,

    #[command(about = "Output the default chart values in YAML format")]
    DefaultValues,

    #[command(
        alias = "r",
        about = "Show the full name, labels, selector and image of one or more releases"
    )]
    Resolve(ResolveCommand),

    #[command(alias = "t", about = "Render the manifests of a release")]
    Template(TemplateCommand),

    #[command(
        about = "Render several releases of one chart and report names, labels or selectors \
                 they share"
    )]
    Check(CheckCommand),

    #[command(
        about = "Report Services in a cluster whose selectors reach pods of more than one \
                 release (read-only)"
    )]
    Audit(AuditCommand),
}

impl Default for Cli {
    fn default() -> Self { Self::parse() }
}

impl Cli {
    /// Loads the configuration. `--log-level` overrides the configured
    /// level.
    fn load_config(&self) -> Result<Config, Error> {
        let mut config = Config::load_or_default(self.config_file.clone())?;

        if let Some(log_level) = self.log_level {
            config.log.level = log_level;
        }

        Ok(config)
    }

    /// Runs the parsed command and returns the process exit code.
    ///
    /// Only `audit` and the server part of `version` talk to a cluster; every
    /// other command works offline.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration, the chart or the values cannot
    /// be loaded, if a release name does not form a valid identity, or if the
    /// cluster cannot be reached.
    ///
    /// # Panics
    ///
    /// Panics if writing the version or the configuration templates to
    /// stdout fails.
    pub fn run(self) -> Result<i32, Error> {
        let client_version = Self::command().get_version().unwrap_or_default().to_string();
        match self.commands {
            Some(Commands::Version { client }) if client => {
                std::io::stdout()
                    .write_all(Self::command().render_long_version().as_bytes())
                    .expect("Failed to write to stdout");
                std::io::stdout()
                    .write_all(format!("Client Version: {client_version}\n").as_bytes())
                    .expect("Failed to write to stdout");
                return Ok(0);
            }
            Some(Commands::Completions { shell }) => {
                let mut app = Self::command();
                let bin_name = app.get_name().to_string();
                clap_complete::generate(shell, &mut app, bin_name, &mut std::io::stdout());
                return Ok(0);
            }
            Some(Commands::DefaultConfig) => {
                std::io::stdout()
                    .write_all(Config::template_basic().as_slice())
                    .expect("Failed to write to stdout");
                return Ok(0);
            }
            Some(Commands::DefaultValues) => {
                std::io::stdout()
                    .write_all(Values::template_basic().as_slice())
                    .expect("Failed to write to stdout");
                return Ok(0);
            }
            None => {
                let help = Self::command().render_long_help().ansi().to_string();
                std::io::stderr().write_all(help.as_bytes()).expect("Failed to write to stderr");
                return Ok(-1);
            }
            _ => {}
        }

        let config = self.load_config()?;
        config.log.registry();

        match self.commands {
            Some(Commands::Resolve(cmd)) => cmd.run(config).map(|()| 0),
            Some(Commands::Template(cmd)) => cmd.run(config).map(|()| 0),
            Some(Commands::Check(cmd)) => cmd.run(config),
            Some(Commands::Audit(cmd)) => {
                let fut = async move {
                    let kube_client =
                        kube::Client::try_default().await.context(error::KubeConfigSnafu)?;
                    cmd.run(kube_client).await
                };
                Runtime::new().context(error::InitializeTokioRuntimeSnafu)?.block_on(fut)
            }
            Some(Commands::Version { .. }) => {
                let fut = async move {
                    let server_version = match kube::Client::try_default().await {
                        Ok(kube_client) => kube_client.apiserver_version().await.map_or_else(
                            |_| "unknown".to_string(),
                            |info| format!("{}.{}", info.major, info.minor),
                        ),
                        Err(err) => {
                            tracing::debug!("No Kubernetes client available: {err}");
                            "unknown".to_string()
                        }
                    };
                    let info = format!(
                        "Client Version: {client_version}\nServer Version: {server_version}\n",
                    );
                    std::io::stdout()
                        .write_all(Self::command().render_long_version().as_bytes())
                        .expect("Failed to write to stdout");
                    std::io::stdout().write_all(info.as_bytes()).expect("Failed to write to stdout");
                    Ok(0)
                };
                Runtime::new().context(error::InitializeTokioRuntimeSnafu)?.block_on(fut)
            }
            Some(
                Commands::Completions { .. } | Commands::DefaultConfig | Commands::DefaultValues,
            )
            | None => Ok(0),
        }
    }
}
