use crate::{
    cluster::ClusterOps,
    deployer::{DeploymentRecord, Error},
};

/// Ensures the deployment namespace exists.
///
/// Skipped entirely when the record already carries a namespace, whether from
/// persisted state or a caller override.
pub async fn ensure<C: ClusterOps>(
    cluster: &C,
    mut record: DeploymentRecord,
) -> Result<DeploymentRecord, Error> {
    if record.namespace.is_some() {
        return Ok(record);
    }

    let namespace = record.prefix.clone();
    cluster.ensure_namespace(&namespace).await?;
    tracing::info!("namespace/{namespace} ready");
    record.namespace = Some(namespace);
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::ensure;
    use crate::{cluster::testing::RecordingCluster, deployer::DeploymentRecord};

    #[tokio::test]
    async fn test_creates_namespace_named_after_prefix() {
        let cluster = RecordingCluster::default();
        let record = DeploymentRecord {
            prefix: "guestbook-ab12cd".to_string(),
            ..DeploymentRecord::default()
        };

        let record = ensure(&cluster, record).await.expect("ensure namespace");

        assert_eq!(record.namespace.as_deref(), Some("guestbook-ab12cd"));
        assert_eq!(cluster.calls_matching("ensure-namespace/guestbook-ab12cd").len(), 1);
    }

    #[tokio::test]
    async fn test_skipped_when_namespace_already_recorded() {
        let cluster = RecordingCluster::default();
        let record = DeploymentRecord {
            prefix: "guestbook-ab12cd".to_string(),
            namespace: Some("guestbook-ab12cd".to_string()),
            ..DeploymentRecord::default()
        };

        let record = ensure(&cluster, record).await.expect("ensure namespace");

        assert_eq!(record.namespace.as_deref(), Some("guestbook-ab12cd"));
        assert!(cluster.calls_matching("ensure-namespace/").is_empty());
    }
}
