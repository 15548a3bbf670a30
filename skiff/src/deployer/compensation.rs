//! Best-effort cleanup of transient workflow resources.

use crate::cluster::ClusterOps;

/// A pod whose removal is best-effort: it lives inside the deployment
/// namespace, so teardown reclaims it even when cleanup here fails.
#[derive(Clone, Debug)]
pub struct TransientPod {
    pub namespace: String,
    pub pod_name: String,
}

/// Compensating cleanup actions registered while a deployment runs.
///
/// Outcomes surface as structured log events, never as workflow errors.
#[derive(Debug, Default)]
pub struct CompensationList {
    pods: Vec<TransientPod>,
}

impl CompensationList {
    pub fn register(&mut self, namespace: &str, pod_name: &str) {
        self.pods.push(TransientPod {
            namespace: namespace.to_string(),
            pod_name: pod_name.to_string(),
        });
    }

    pub async fn reclaim<C: ClusterOps>(self, cluster: &C) {
        for TransientPod { namespace, pod_name } in self.pods {
            match cluster.delete_pod(&namespace, &pod_name).await {
                Ok(()) => {
                    tracing::debug!(%namespace, %pod_name, "transient pod reclaimed");
                }
                Err(err) => {
                    tracing::warn!(
                        %namespace,
                        %pod_name,
                        error = %err,
                        "failed to reclaim transient pod; namespace teardown will collect it"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CompensationList;
    use crate::cluster::testing::RecordingCluster;

    #[tokio::test]
    async fn test_reclaim_deletes_registered_pods() {
        let cluster = RecordingCluster::default();
        let mut compensations = CompensationList::default();
        compensations.register("ns", "app-x-builder-t1");

        compensations.reclaim(&cluster).await;

        assert_eq!(cluster.calls_matching("delete-pod/ns/app-x-builder-t1").len(), 1);
    }

    #[tokio::test]
    async fn test_reclaim_swallows_deletion_failures() {
        let cluster = RecordingCluster::default();
        cluster.fail_pod_delete.store(true, std::sync::atomic::Ordering::SeqCst);
        let mut compensations = CompensationList::default();
        compensations.register("ns", "app-x-builder-t1");

        // Must not propagate the injected failure.
        compensations.reclaim(&cluster).await;
        assert_eq!(cluster.calls_matching("delete-pod/").len(), 1);
    }
}
