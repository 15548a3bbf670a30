//! The provisioning workflow: a finite sequence of idempotent steps with
//! compensating cleanup.
//!
//! `deploy` drives the steps strictly in order, each one taking the
//! accumulated record and returning an updated record, and checkpoints the
//! full record after every step so a later invocation resumes with the
//! resource names it already established. `remove` deletes the recorded
//! namespace and relies on the cluster to cascade-delete everything inside
//! it.

mod compensation;
mod context;
pub mod error;
pub mod manifests;
mod steps;

use std::time::Duration;

use snafu::OptionExt;

pub use self::{
    compensation::CompensationList,
    context::{DeployInputs, DeploymentRecord},
    error::Error,
};
use crate::{cluster::ClusterOps, state::StateStore};

/// Bounds for the blocking waits within a deployment.
#[derive(Clone, Copy, Debug)]
pub struct WaitSettings {
    pub staging_pod: Duration,
    pub build_pod: Duration,
    pub service_url: Duration,
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            staging_pod: Duration::from_secs(90),
            build_pod: Duration::from_secs(600),
            service_url: Duration::from_secs(120),
        }
    }
}

/// Registry account owning the pushed repositories, with its pre-encoded
/// docker auth string.
#[derive(Clone, Debug)]
pub struct RegistrySettings {
    pub username: String,
    pub auth_token: String,
}

/// Drives the provisioning sequence against a cluster.
pub struct Deployer<C, S> {
    cluster: C,
    state: S,
    registry: RegistrySettings,
    waits: WaitSettings,
}

impl<C, S> Deployer<C, S>
where
    C: ClusterOps,
    S: StateStore,
{
    pub const fn new(cluster: C, state: S, registry: RegistrySettings, waits: WaitSettings) -> Self {
        Self { cluster, state, registry, waits }
    }

    /// Provisions (or re-provisions) the deployment described by `inputs`.
    ///
    /// A failed step leaves the last checkpoint in place; re-running resumes
    /// with the established resource names.
    pub async fn deploy(&self, inputs: DeployInputs) -> Result<DeploymentRecord, Error> {
        let prior = self.state.load()?;
        let record = context::resolve(&inputs, prior);

        let record = steps::namespace::ensure(&self.cluster, record).await?;
        self.state.save(&record)?;
        let namespace = record.namespace.clone().context(error::MissingNamespaceSnafu)?;

        let record =
            steps::registry::apply(&self.cluster, &namespace, &self.registry, record).await?;
        self.state.save(&record)?;

        let record = steps::volume::apply(&self.cluster, &namespace, record).await?;
        self.state.save(&record)?;

        let record =
            steps::staging::ensure(&self.cluster, &namespace, self.waits.staging_pod, record)
                .await?;
        self.state.save(&record)?;

        let record =
            steps::transfer::upload(&self.cluster, &namespace, &inputs.source, record).await?;
        self.state.save(&record)?;

        let record = steps::build::run(
            &self.cluster,
            &namespace,
            &self.registry,
            self.waits.build_pod,
            record,
        )
        .await?;
        self.state.save(&record)?;

        let record =
            steps::service::deploy(&self.cluster, &namespace, self.waits.service_url, record)
                .await?;
        self.state.save(&record)?;

        Ok(record)
    }

    /// Tears the deployment down by deleting its namespace.
    ///
    /// Exactly one deletion call is issued with whatever namespace the record
    /// carries, and persisted state is cleared unconditionally, even when the
    /// deletion call fails.
    pub async fn remove(&self) -> Result<DeploymentRecord, Error> {
        let record = self.state.load()?.unwrap_or_default();
        let namespace = record.namespace.unwrap_or_default();

        let deletion = self.cluster.delete_namespace(&namespace).await;
        self.state.clear()?;
        deletion?;
        tracing::info!("namespace/{namespace} deletion requested");

        Ok(DeploymentRecord::default())
    }
}
