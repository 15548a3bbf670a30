mod error;
mod log;

use std::path::{Path, PathBuf};

use resolve_path::PathResolveExt;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

pub use self::{error::Error, log::LogConfig};

/// Commented template emitted by the `default-config` subcommand.
const CONFIG_TEMPLATE: &str = r"# Skiff configuration.
registry:
  # Registry account owning the pushed repositories.
  username: ''
  # Pre-encoded docker auth string (base64 of user:password).
  authToken: ''
# Where the deployment record is checkpointed between invocations.
# stateFilePath: .skiff/state.json
log:
  emitJournald: false
  emitStdout: false
  emitStderr: true
  level: INFO
";

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Overrides the default per-project state file location.
    pub state_file_path: Option<PathBuf>,

    #[serde(default)]
    pub log: LogConfig,
}

/// Container registry coordinates used to push built images.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryConfig {
    #[serde(default)]
    pub username: String,

    /// Pre-encoded docker auth string for the registry endpoint.
    #[serde(default)]
    pub auth_token: String,
}

impl Config {
    pub fn search_config_file_path() -> PathBuf {
        let paths = vec![Self::default_path()]
            .into_iter()
            .chain(skiff_base::fallback_project_config_directories().into_iter().map(|mut path| {
                path.push(skiff_base::CLI_CONFIG_NAME);
                path
            }))
            .collect::<Vec<_>>();
        for path in paths {
            let Ok(exists) = path.try_exists() else {
                continue;
            };
            if exists {
                return path;
            }
        }
        Self::default_path()
    }

    #[inline]
    pub fn default_path() -> PathBuf {
        [skiff_base::PROJECT_CONFIG_DIR.to_path_buf(), PathBuf::from(skiff_base::CLI_CONFIG_NAME)]
            .into_iter()
            .collect()
    }

    #[inline]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let mut config: Self = {
            let path =
                path.as_ref().try_resolve().map(|path| path.to_path_buf()).with_context(|_| {
                    error::ResolveFilePathSnafu { file_path: path.as_ref().to_path_buf() }
                })?;
            let data =
                std::fs::read(&path).context(error::OpenConfigSnafu { filename: path.clone() })?;
            serde_yaml::from_slice(&data).context(error::ParseConfigSnafu { filename: path })?
        };

        config.log.file_path = match config.log.file_path.map(|path| {
            path.try_resolve()
                .map(|path| path.to_path_buf())
                .with_context(|_| error::ResolveFilePathSnafu { file_path: path.clone() })
        }) {
            Some(Ok(path)) => Some(path),
            Some(Err(err)) => return Err(err),
            None => None,
        };

        Ok(config)
    }

    #[must_use]
    pub const fn template_basic() -> &'static str { CONFIG_TEMPLATE }
}
