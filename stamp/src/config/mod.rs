mod chart;
mod error;
mod image_pull_policy;
mod log;

use std::path::{Path, PathBuf};

use resolve_path::PathResolveExt;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use stamp_base::consts::DEFAULT_NAMESPACE;
use stamp_identity::Registry;

pub use self::{chart::ChartConfig, error::Error, image_pull_policy::ImagePullPolicy, log::LogConfig};

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_namespace")]
    pub default_namespace: String,

    #[serde(default = "Registry::default")]
    pub registry: Registry,

    #[serde(default = "ChartConfig::default")]
    pub chart: ChartConfig,

    #[serde(default = "LogConfig::default")]
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_namespace: default_namespace(),
            registry: Registry::default(),
            chart: ChartConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Config {
    /// The first existing file of the search path, or the default path when
    /// there is none.
    pub fn search_config_file_path() -> PathBuf {
        stamp_base::config_file_candidates()
            .into_iter()
            .find(|path| path.try_exists().unwrap_or(false))
            .unwrap_or_else(Self::default_path)
    }

    #[inline]
    pub fn default_path() -> PathBuf { stamp_base::PROJECT_CONFIG_DIR.join(stamp_base::CLI_CONFIG_NAME) }

    #[inline]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let mut config: Self = {
            let path = resolve_file_path(path.as_ref())?;
            let data =
                std::fs::read(&path).context(error::OpenConfigSnafu { filename: path.clone() })?;
            serde_yaml::from_slice(&data).context(error::ParseConfigSnafu { filename: path })?
        };

        config.log.file_path = config.log.file_path.as_deref().map(resolve_file_path).transpose()?;

        Ok(config)
    }

    /// Loads the file at `path` when given. Otherwise loads the first
    /// configuration file found in the search path, falling back to the
    /// built-in defaults when there is none.
    pub fn load_or_default(path: Option<PathBuf>) -> Result<Self, Error> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let path = Self::search_config_file_path();
        if path.try_exists().unwrap_or(false) {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn template_basic() -> Vec<u8> {
        serde_yaml::to_string(&Self::default()).unwrap_or_default().into_bytes()
    }
}

fn default_namespace() -> String { DEFAULT_NAMESPACE.to_string() }

fn resolve_file_path(path: &Path) -> Result<PathBuf, Error> {
    path.try_resolve()
        .map(|path| path.to_path_buf())
        .with_context(|_| error::ResolveFilePathSnafu { file_path: path.to_path_buf() })
}
