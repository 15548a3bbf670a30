use std::path::PathBuf;

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Failed to create state directory {}, error: {source}", directory.display()))]
    CreateStateDirectory { directory: PathBuf, source: std::io::Error },

    #[snafu(display("Failed to read state from {}, error: {source}", filename.display()))]
    ReadState { filename: PathBuf, source: std::io::Error },

    #[snafu(display("Failed to parse state from {}, error: {source}", filename.display()))]
    ParseState { filename: PathBuf, source: serde_json::Error },

    #[snafu(display("Failed to serialize deployment state, error: {source}"))]
    SerializeState { source: serde_json::Error },

    #[snafu(display("Failed to write state to {}, error: {source}", filename.display()))]
    WriteState { filename: PathBuf, source: std::io::Error },

    #[snafu(display("Failed to remove state file {}, error: {source}", filename.display()))]
    RemoveState { filename: PathBuf, source: std::io::Error },
}
