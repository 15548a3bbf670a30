use std::time::Duration;

use skiff_base::consts;

use crate::{
    cluster::ClusterOps,
    deployer::{
        CompensationList, DeploymentRecord, Error, RegistrySettings, context, manifests,
    },
};

/// Runs the in-cluster image build.
///
/// A fresh tag is minted on every run; pushing under a new tag is what later
/// forces the runtime service to roll out. Only the builder pod reaching a
/// `Running` phase is awaited; the build's own exit status is not observed.
/// The transient pod is reclaimed best-effort afterwards.
pub async fn run<C: ClusterOps>(
    cluster: &C,
    namespace: &str,
    registry: &RegistrySettings,
    wait: Duration,
    mut record: DeploymentRecord,
) -> Result<DeploymentRecord, Error> {
    let tag = context::generate_build_tag();
    let destination = format!(
        "{}/{}/{}:{tag}",
        consts::DOCKER_REGISTRY_HOST,
        registry.username,
        record.app_name
    );
    let pod_name = record.builder_pod_name(&tag);
    let pod = manifests::builder_pod(
        namespace,
        &pod_name,
        &record.staging_claim_name(),
        &record.registry_auth_name(),
        &destination,
    );

    cluster.create_pod(namespace, &pod).await?;
    tracing::info!("pod/{pod_name} building {destination}");
    cluster.await_pod_running(namespace, &pod_name, wait).await?;

    let mut compensations = CompensationList::default();
    compensations.register(namespace, &pod_name);
    compensations.reclaim(cluster).await;

    record.image = Some(destination);
    Ok(record)
}
