use std::path::PathBuf;

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display(
        "Source payload {} is neither a directory nor a gzipped tarball", path.display()
    ))]
    UnsupportedSourcePayload { path: PathBuf },

    #[snafu(display("Failed to pack {} into {}, error: {source}", source_dir.display(), archive.display()))]
    PackDirectory { source_dir: PathBuf, archive: PathBuf, source: std::io::Error },

    #[snafu(display("Failed to wrap {} into {}, error: {source}", inner.display(), archive.display()))]
    WrapArchive { inner: PathBuf, archive: PathBuf, source: std::io::Error },

    #[snafu(display(
        "Failed to unpack {} into {}, error: {source}", archive.display(), destination.display()
    ))]
    UnpackArchive { archive: PathBuf, destination: PathBuf, source: std::io::Error },

    #[snafu(display("Archive task was aborted, error: {source}"))]
    JoinArchiveTask { source: tokio::task::JoinError },
}
