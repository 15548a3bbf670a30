//! The `skiff` command line interface.
//!
//! # Examples
//!
//! ```bash
//! # Build and deploy an application from a local source tree
//! skiff deploy --app-name guestbook --src ./guestbook
//!
//! # Re-deploy: reuses the provisioned namespace and staging pod, pushes a
//! # fresh image tag and rolls the runtime service
//! skiff deploy --app-name guestbook --src ./guestbook
//!
//! # Tear everything down
//! skiff remove
//! ```

mod deploy;
pub mod error;
mod remove;

use std::{io::Write, path::PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use futures::FutureExt;
use snafu::ResultExt;
use tokio::runtime::Runtime;

pub use self::error::Error;
use self::{deploy::DeployCommand, remove::RemoveCommand};
use crate::{config::Config, shadow};

/// `Cli` is the entry point of the Skiff command line interface.
#[derive(Parser)]
#[command(
    name = skiff_base::CLI_PROGRAM_NAME,
    author,
    version,
    long_version = shadow::CLAP_LONG_VERSION,
    about = "Skiff CLI: build and deploy serverless applications onto Kubernetes.",
    long_about = "Skiff provisions a build-and-run pipeline on a Kubernetes cluster: it \
                  creates a namespace, stages application source onto a persistent volume, \
                  builds a container image inside the cluster with an unprivileged builder, \
                  pushes it to a registry and deploys a Knative service fronting it.",
    color = clap::ColorChoice::Always
)]
pub struct Cli {
    #[clap(subcommand)]
    commands: Option<Commands>,

    /// Path to the configuration file.
    #[clap(
        long = "config",
        short = 'c',
        env = "SKIFF_CONFIG_FILE_PATH",
        help = "Specify a configuration file. Defaults to ~/.config/skiff/config.yaml or \
                SKIFF_CONFIG_FILE_PATH env var."
    )]
    config_file: Option<PathBuf>,

    /// Logging level for the application.
    #[clap(
        long = "log-level",
        env = "SKIFF_LOG_LEVEL",
        help = "Set the logging level (e.g., info, debug, trace)."
    )]
    log_level: Option<tracing::Level>,
}

#[derive(Clone, Subcommand)]
pub enum Commands {
    /// Displays client and server version information.
    #[command(about = "Display client and server version information")]
    Version {
        #[clap(long = "client", help = "If true, shows client version only (no server required).")]
        client: bool,
    },

    /// Generates a shell completion script for the specified shell.
    #[command(about = "Generate shell completion script for the specified shell (bash, zsh, fish)")]
    Completions { shell: clap_complete::Shell },

    /// Outputs the default configuration in YAML format to standard output.
    #[command(about = "Output the default configuration in YAML format")]
    DefaultConfig,

    /// Builds the application image in-cluster and deploys it as a Knative
    /// service.
    #[command(
        alias = "d",
        about = "Provision the pipeline, build the application image in-cluster and deploy it \
                 as a Knative service"
    )]
    Deploy(DeployCommand),

    /// Tears the deployment down by deleting its namespace.
    #[command(
        alias = "r",
        about = "Delete the deployment's namespace and clear the checkpointed record"
    )]
    Remove(RemoveCommand),
}

impl Default for Cli {
    fn default() -> Self { Self::parse() }
}

impl Cli {
    /// Loads the configuration, applying CLI overrides.
    ///
    /// When no configuration file exists and none was requested explicitly,
    /// the built-in defaults are used.
    fn load_config(&self) -> Result<Config, Error> {
        let mut config = if let Some(path) = self.config_file.clone() {
            Config::load(path)?
        } else {
            let path = Config::search_config_file_path();
            if path.try_exists().unwrap_or(false) { Config::load(path)? } else { Config::default() }
        };

        if let Some(log_level) = self.log_level {
            config.log.level = log_level;
        }

        Ok(config)
    }

    /// Dispatches the parsed subcommand.
    ///
    /// # Errors
    ///
    /// Returns an `Error` when configuration loading, Kubernetes client
    /// initialization or the subcommand itself fails.
    ///
    /// # Panics
    ///
    /// Writing to stdout/stderr is `expect`ed to succeed.
    pub fn run(self) -> Result<i32, Error> {
        let client_version = Self::command().get_version().unwrap_or_default().to_string();
        match self.commands {
            Some(Commands::Version { client }) if client => {
                std::io::stdout()
                    .write_all(Self::command().render_long_version().as_bytes())
                    .expect("Failed to write to stdout");
                std::io::stdout()
                    .write_all(format!("Client Version: {client_version}\n").as_bytes())
                    .expect("Failed to write to stdout");

                return Ok(0);
            }
            Some(Commands::Completions { shell }) => {
                let mut app = Self::command();
                let bin_name = app.get_name().to_string();
                clap_complete::generate(shell, &mut app, bin_name, &mut std::io::stdout());
                return Ok(0);
            }
            Some(Commands::DefaultConfig) => {
                std::io::stdout()
                    .write_all(Config::template_basic().as_bytes())
                    .expect("Failed to write to stdout");
                return Ok(0);
            }
            _ => {}
        }

        let config = self.load_config()?;
        config.log.registry();

        let fut = async move {
            let kube_client = kube::Client::try_default().await.context(error::KubeConfigSnafu)?;
            match self.commands {
                Some(Commands::Version { .. }) => {
                    let server_version = kube_client.apiserver_version().await.map_or_else(
                        |_| "unknown".to_string(),
                        |info| format!("{}.{}", info.major, info.minor),
                    );
                    let info = format!(
                        "Client Version: {client_version}\nServer Version: {server_version}\n",
                    );
                    std::io::stdout()
                        .write_all(Self::command().render_long_version().as_bytes())
                        .expect("Failed to write to stdout");
                    std::io::stdout()
                        .write_all(info.as_bytes())
                        .expect("Failed to write to stdout");

                    return Ok(0);
                }
                Some(Commands::Deploy(cmd)) => cmd.run(kube_client, config).boxed().await?,
                Some(Commands::Remove(cmd)) => cmd.run(kube_client, config).await?,
                _ => {
                    let help = Self::command().render_long_help().ansi().to_string();
                    std::io::stderr()
                        .write_all(help.as_bytes())
                        .expect("Failed to write to stderr");
                    return Ok(-1);
                }
            }

            Ok(0)
        };

        Runtime::new().context(error::InitializeTokioRuntimeSnafu)?.block_on(fut)
    }
}
