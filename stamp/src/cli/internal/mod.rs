//! Arguments and helpers shared by the release commands.

mod release;

use std::io::Write;

use snafu::ResultExt;

pub use self::release::{ChartArgs, ReleaseResolver};
use crate::cli::{Error, error};

/// Output encodings of the `resolve` command.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Yaml,
    Json,
}

pub fn write_stdout(output: &str) -> Result<(), Error> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes()).context(error::WriteStdoutSnafu)?;
    if !output.ends_with('\n') {
        stdout.write_all(b"\n").context(error::WriteStdoutSnafu)?;
    }
    stdout.flush().context(error::WriteStdoutSnafu)
}
