//! Persistence of the deployment record between invocations.
//!
//! The record is checkpointed after every provisioning step so that a later
//! invocation can resume with the resource names it already established.

mod error;
#[cfg(test)]
pub mod testing;

use std::path::{Path, PathBuf};

use snafu::ResultExt;

pub use self::error::Error;
use crate::deployer::DeploymentRecord;

/// Round-trips the deployment record between invocations.
pub trait StateStore {
    /// Loads the previously checkpointed record, if any.
    fn load(&self) -> Result<Option<DeploymentRecord>, Error>;

    /// Checkpoints the full record, replacing any previous checkpoint.
    fn save(&self, record: &DeploymentRecord) -> Result<(), Error>;

    /// Discards the checkpoint entirely.
    fn clear(&self) -> Result<(), Error>;
}

impl<T> StateStore for &T
where
    T: StateStore,
{
    fn load(&self) -> Result<Option<DeploymentRecord>, Error> { (**self).load() }

    fn save(&self, record: &DeploymentRecord) -> Result<(), Error> { (**self).save(record) }

    fn clear(&self) -> Result<(), Error> { (**self).clear() }
}

/// File-backed state store keeping the record as a single JSON document.
#[derive(Clone, Debug)]
pub struct JsonStateFile {
    path: PathBuf,
}

impl JsonStateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

    /// Default location, relative to the working directory.
    #[must_use]
    pub fn default_path() -> PathBuf {
        [Path::new(skiff_base::PROJECT_STATE_DIR), Path::new(skiff_base::STATE_FILE_NAME)]
            .iter()
            .collect()
    }
}

impl StateStore for JsonStateFile {
    fn load(&self) -> Result<Option<DeploymentRecord>, Error> {
        let data = match std::fs::read(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).context(error::ReadStateSnafu { filename: self.path.clone() });
            }
        };
        let record = serde_json::from_slice(&data)
            .context(error::ParseStateSnafu { filename: self.path.clone() })?;
        Ok(Some(record))
    }

    fn save(&self, record: &DeploymentRecord) -> Result<(), Error> {
        if let Some(directory) = self.path.parent()
            && !directory.as_os_str().is_empty()
        {
            std::fs::create_dir_all(directory)
                .context(error::CreateStateDirectorySnafu { directory: directory.to_path_buf() })?;
        }
        let data = serde_json::to_vec_pretty(record).context(error::SerializeStateSnafu)?;
        std::fs::write(&self.path, data).context(error::WriteStateSnafu { filename: self.path.clone() })
    }

    fn clear(&self) -> Result<(), Error> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).context(error::RemoveStateSnafu { filename: self.path.clone() }),
        }
    }
}
