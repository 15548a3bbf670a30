use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("{source}"))]
    Configuration { source: crate::config::Error },

    #[snafu(display("{source}"))]
    Deployer { source: crate::deployer::Error },

    #[snafu(display("Failed to initialize Kubernetes client configuration, error: {source}"))]
    KubeConfig { source: kube::Error },

    #[snafu(display("Failed to create tokio runtime, error: {source}"))]
    InitializeTokioRuntime { source: std::io::Error },

    #[snafu(display("Failed to render deployment record, error: {source}"))]
    RenderRecord { source: serde_json::Error },

    #[snafu(display("Invalid extra field '{input}': expected KEY=VALUE"))]
    InvalidExtraField { input: String },
}

impl From<crate::config::Error> for Error {
    fn from(source: crate::config::Error) -> Self { Self::Configuration { source } }
}

impl From<crate::deployer::Error> for Error {
    fn from(source: crate::deployer::Error) -> Self { Self::Deployer { source } }
}
