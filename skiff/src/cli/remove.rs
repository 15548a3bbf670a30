use std::path::PathBuf;

use clap::Args;
use snafu::ResultExt;

use crate::{
    cli::{Error, error},
    cluster::KubeCluster,
    config::Config,
    deployer::{Deployer, RegistrySettings, WaitSettings},
    state::JsonStateFile,
};

#[derive(Args, Clone)]
pub struct RemoveCommand {
    #[arg(
        long = "state-file",
        help = "Where the deployment record was checkpointed. Defaults to .skiff/state.json or \
                the configured path."
    )]
    pub state_file: Option<PathBuf>,
}

impl RemoveCommand {
    pub async fn run(self, kube_client: kube::Client, config: Config) -> Result<(), Error> {
        let Self { state_file } = self;

        let state = JsonStateFile::new(
            state_file
                .or_else(|| config.state_file_path.clone())
                .unwrap_or_else(JsonStateFile::default_path),
        );
        let registry = RegistrySettings {
            username: config.registry.username.clone(),
            auth_token: config.registry.auth_token.clone(),
        };

        let deployer =
            Deployer::new(KubeCluster::new(kube_client), state, registry, WaitSettings::default());
        let record = deployer.remove().await?;

        let rendered = serde_json::to_string_pretty(&record).context(error::RenderRecordSnafu)?;
        println!("{rendered}");
        Ok(())
    }
}
