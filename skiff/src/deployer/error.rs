use std::path::PathBuf;

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("{source}"))]
    Cluster { source: crate::cluster::Error },

    #[snafu(display("{source}"))]
    Archive { source: crate::archive::Error },

    #[snafu(display("{source}"))]
    State { source: crate::state::Error },

    #[snafu(display("No namespace is recorded for this deployment"))]
    MissingNamespace,

    #[snafu(display("No image has been built for this deployment"))]
    MissingImage,

    #[snafu(display(
        "Existence check for pod {pod_name} in namespace {namespace} failed transiently: {message}"
    ))]
    StagingPodCheck { namespace: String, pod_name: String, message: String },

    #[snafu(display("Failed to prepare scratch directory {}, error: {source}", path.display()))]
    ScratchDirectory { path: PathBuf, source: std::io::Error },
}

impl From<crate::cluster::Error> for Error {
    fn from(source: crate::cluster::Error) -> Self { Self::Cluster { source } }
}

impl From<crate::archive::Error> for Error {
    fn from(source: crate::archive::Error) -> Self { Self::Archive { source } }
}

impl From<crate::state::Error> for Error {
    fn from(source: crate::state::Error) -> Self { Self::State { source } }
}
