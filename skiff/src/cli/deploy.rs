use std::{collections::BTreeMap, path::PathBuf, time::Duration};

use clap::{ArgAction, Args};
use snafu::ResultExt;

use crate::{
    cli::{Error, error},
    cluster::KubeCluster,
    config::Config,
    deployer::{DeployInputs, Deployer, RegistrySettings, WaitSettings},
    state::JsonStateFile,
};

#[derive(Args, Clone)]
pub struct DeployCommand {
    #[arg(
        short = 'a',
        long = "app-name",
        help = "Name of the application; prefixes every provisioned resource and names the \
                runtime service."
    )]
    pub app_name: String,

    #[arg(
        short = 's',
        long = "src",
        help = "Application source: a directory or a gzipped tarball containing the build context."
    )]
    pub source: PathBuf,

    #[arg(
        short = 'n',
        long = "namespace",
        help = "Deploy into an existing namespace instead of provisioning one named after the \
                generated prefix."
    )]
    pub namespace: Option<String>,

    #[arg(
        long = "state-file",
        help = "Where the deployment record is checkpointed between invocations. Defaults to \
                .skiff/state.json or the configured path."
    )]
    pub state_file: Option<PathBuf>,

    #[arg(
        long = "registry-username",
        env = "SKIFF_REGISTRY_USERNAME",
        help = "Registry account owning the pushed repository. Overrides the configuration file."
    )]
    pub registry_username: Option<String>,

    #[arg(
        long = "registry-auth-token",
        env = "SKIFF_REGISTRY_AUTH_TOKEN",
        hide_env_values = true,
        help = "Pre-encoded docker auth string for the registry. Overrides the configuration file."
    )]
    pub registry_auth_token: Option<String>,

    #[arg(
        long = "set",
        value_name = "KEY=VALUE",
        action = ArgAction::Append,
        help = "Extra fields carried verbatim in the deployment record. Can be specified multiple times."
    )]
    pub set: Vec<String>,

    #[arg(
        short = 't',
        long = "timeout-seconds",
        default_value = "90",
        help = "The maximum time in seconds to wait for the staging pod to be running."
    )]
    pub timeout_secs: u64,

    #[arg(
        long = "build-timeout-seconds",
        default_value = "600",
        help = "The maximum time in seconds to wait for the builder pod to be running."
    )]
    pub build_timeout_secs: u64,

    #[arg(
        long = "service-timeout-seconds",
        default_value = "120",
        help = "The maximum time in seconds to wait for the runtime service to publish its URL."
    )]
    pub service_timeout_secs: u64,
}

impl DeployCommand {
    pub async fn run(self, kube_client: kube::Client, config: Config) -> Result<(), Error> {
        let Self {
            app_name,
            source,
            namespace,
            state_file,
            registry_username,
            registry_auth_token,
            set,
            timeout_secs,
            build_timeout_secs,
            service_timeout_secs,
        } = self;

        let registry = RegistrySettings {
            username: registry_username.unwrap_or_else(|| config.registry.username.clone()),
            auth_token: registry_auth_token.unwrap_or_else(|| config.registry.auth_token.clone()),
        };
        let waits = WaitSettings {
            staging_pod: Duration::from_secs(timeout_secs),
            build_pod: Duration::from_secs(build_timeout_secs),
            service_url: Duration::from_secs(service_timeout_secs),
        };
        let state = JsonStateFile::new(
            state_file
                .or_else(|| config.state_file_path.clone())
                .unwrap_or_else(JsonStateFile::default_path),
        );

        let deployer = Deployer::new(KubeCluster::new(kube_client), state, registry, waits);
        let inputs = DeployInputs { app_name, source, namespace, extra: parse_extra_fields(&set)? };

        let record = deployer.deploy(inputs).await?;

        let rendered = serde_json::to_string_pretty(&record).context(error::RenderRecordSnafu)?;
        println!("{rendered}");
        Ok(())
    }
}

fn parse_extra_fields(pairs: &[String]) -> Result<BTreeMap<String, serde_json::Value>, Error> {
    let mut extra = BTreeMap::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            return error::InvalidExtraFieldSnafu { input: pair.clone() }.fail();
        };
        let _previous =
            extra.insert(key.to_string(), serde_json::Value::String(value.to_string()));
    }
    Ok(extra)
}

#[cfg(test)]
mod tests {
    use super::parse_extra_fields;
    use crate::cli::Error;

    #[test]
    fn test_parse_extra_fields() {
        let extra = parse_extra_fields(&["stage=prod".to_string(), "team=web".to_string()])
            .expect("parse");
        assert_eq!(
            extra.get("stage"),
            Some(&serde_json::Value::String("prod".to_string()))
        );
        assert_eq!(extra.len(), 2);
    }

    #[test]
    fn test_parse_extra_fields_rejects_bare_keys() {
        let result = parse_extra_fields(&["stage".to_string()]);
        assert!(matches!(result, Err(Error::InvalidExtraField { .. })));
    }
}
