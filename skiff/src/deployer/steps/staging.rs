use std::time::Duration;

use crate::{
    cluster::{ClusterOps, PodPresence},
    deployer::{DeploymentRecord, Error, error, manifests},
};

/// Ensures the long-running staging pod exists and is running.
///
/// The existence check is classified: a definite absence creates the pod, a
/// definite presence skips the step, and a transient control-plane failure
/// aborts the workflow rather than being mistaken for either.
pub async fn ensure<C: ClusterOps>(
    cluster: &C,
    namespace: &str,
    wait: Duration,
    record: DeploymentRecord,
) -> Result<DeploymentRecord, Error> {
    let pod_name = record.staging_pod_name();
    match cluster.find_pod(namespace, &pod_name).await {
        PodPresence::Found => {
            tracing::debug!("pod/{pod_name} already present in namespace {namespace}");
        }
        PodPresence::NotFound => {
            let pod = manifests::staging_pod(namespace, &pod_name, &record.staging_claim_name());
            cluster.create_pod(namespace, &pod).await?;
            tracing::info!("pod/{pod_name} created in namespace {namespace}");
            cluster.await_pod_running(namespace, &pod_name, wait).await?;
        }
        PodPresence::Transient { message } => {
            return error::StagingPodCheckSnafu {
                namespace: namespace.to_string(),
                pod_name,
                message,
            }
            .fail();
        }
    }
    Ok(record)
}
