//! Configuration and initialization for application logging.
//!
//! `LogConfig` chooses the log level and the outputs (stdout, stderr,
//! journald, file). Rendered manifests are written to stdout, so logs go to
//! stderr unless configured otherwise.
use std::{fs::OpenOptions, path::PathBuf};

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use tracing_subscriber::{
    Layer, Registry, layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt,
};

#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogConfig {
    /// Optional path to a file where logs should be written.
    #[serde(default = "LogConfig::default_file_path")]
    pub file_path: Option<PathBuf>,

    #[serde(default = "LogConfig::default_emit_journald")]
    pub emit_journald: bool,

    #[serde(default = "LogConfig::default_emit_stdout")]
    pub emit_stdout: bool,

    #[serde(default = "LogConfig::default_emit_stderr")]
    pub emit_stderr: bool,

    /// The minimum log level to be recorded.
    #[serde(default = "LogConfig::default_log_level")]
    #[serde_as(as = "DisplayFromStr")]
    pub level: tracing::Level,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file_path: Self::default_file_path(),
            emit_journald: Self::default_emit_journald(),
            emit_stdout: Self::default_emit_stdout(),
            emit_stderr: Self::default_emit_stderr(),
            level: Self::default_log_level(),
        }
    }
}

impl LogConfig {
    #[inline]
    #[must_use]
    pub const fn default_log_level() -> tracing::Level { tracing::Level::INFO }

    #[inline]
    #[must_use]
    pub const fn default_file_path() -> Option<PathBuf> { None }

    #[inline]
    #[must_use]
    pub const fn default_emit_journald() -> bool { false }

    #[inline]
    #[must_use]
    pub const fn default_emit_stdout() -> bool { false }

    #[inline]
    #[must_use]
    pub const fn default_emit_stderr() -> bool { true }

    /// Initializes the global `tracing` subscriber.
    ///
    /// # Panics
    ///
    /// Panics if a global subscriber is already set.
    pub fn registry(&self) {
        let layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> =
            self.drivers().into_iter().filter_map(LogDriver::layer).collect();

        tracing_subscriber::registry()
            .with(layers)
            .with(tracing_subscriber::filter::LevelFilter::from_level(self.level))
            .init();
    }

    /// The outputs enabled by this configuration.
    fn drivers(&self) -> Vec<LogDriver> {
        let mut drivers = Vec::new();
        if self.emit_stderr {
            drivers.push(LogDriver::Stderr);
        }
        if self.emit_stdout {
            drivers.push(LogDriver::Stdout);
        }
        if self.emit_journald {
            drivers.push(LogDriver::Journald);
        }
        if let Some(path) = &self.file_path {
            drivers.push(LogDriver::File(path.clone()));
        }
        drivers
    }
}

/// Where log messages can be sent.
#[derive(Clone, Debug, PartialEq, Eq)]
enum LogDriver {
    Stdout,
    Stderr,
    Journald,
    File(PathBuf),
}

impl LogDriver {
    /// Creates the `tracing` layer for this output, or `None` if the output
    /// cannot be opened.
    #[allow(clippy::type_repetition_in_bounds)]
    fn layer<S>(self) -> Option<Box<dyn Layer<S> + Send + Sync + 'static>>
    where
        S: tracing::Subscriber,
        for<'a> S: LookupSpan<'a>,
    {
        let fmt = tracing_subscriber::fmt::layer().with_target(false);

        match self {
            Self::Stdout => Some(Box::new(fmt.with_writer(std::io::stdout))),
            Self::Stderr => Some(Box::new(fmt.with_writer(std::io::stderr))),
            Self::File(path) => {
                let file = OpenOptions::new().create(true).append(true).open(path).ok()?;
                Some(Box::new(fmt.with_ansi(false).with_writer(file)))
            }
            Self::Journald => Some(Box::new(tracing_journald::layer().ok()?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_logs_to_stderr_only() {
        let config = LogConfig::default();
        assert!(config.emit_stderr);
        assert!(!config.emit_stdout);
        assert!(!config.emit_journald);
        assert!(config.file_path.is_none());
        assert_eq!(config.level, tracing::Level::INFO);
    }

    #[test]
    fn test_parse_level() {
        let config: LogConfig = serde_yaml::from_str("level: debug\nemitStdout: true\n").unwrap();
        assert_eq!(config.level, tracing::Level::DEBUG);
        assert!(config.emit_stdout);
        assert!(config.emit_stderr);
    }

    #[test]
    fn test_drivers() {
        assert_eq!(LogConfig::default().drivers(), [LogDriver::Stderr]);

        let config = LogConfig {
            emit_stderr: false,
            emit_journald: true,
            file_path: Some(PathBuf::from("/tmp/stamp.log")),
            ..LogConfig::default()
        };
        assert_eq!(
            config.drivers(),
            [LogDriver::Journald, LogDriver::File(PathBuf::from("/tmp/stamp.log"))]
        );
    }
}
