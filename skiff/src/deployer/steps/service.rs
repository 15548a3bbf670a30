use std::time::Duration;

use snafu::OptionExt;

use crate::{
    cluster::ClusterOps,
    deployer::{DeploymentRecord, Error, error, manifests},
};

/// Deploys the managed runtime service fronting the freshly built image and
/// records the URL the cluster publishes for it.
pub async fn deploy<C: ClusterOps>(
    cluster: &C,
    namespace: &str,
    wait: Duration,
    mut record: DeploymentRecord,
) -> Result<DeploymentRecord, Error> {
    let image = record.image.clone().context(error::MissingImageSnafu)?;
    let service = manifests::runtime_service(namespace, &record.app_name, &image);
    let url = cluster.apply_runtime_service(namespace, &service, wait).await?;
    tracing::info!("service/{} available at {url}", record.app_name);
    record.service_url = Some(url);
    Ok(record)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::deploy;
    use crate::{
        cluster::testing::RecordingCluster,
        deployer::{DeploymentRecord, Error},
    };

    const WAIT: Duration = Duration::from_secs(120);

    #[tokio::test]
    async fn test_records_published_url() {
        let cluster = RecordingCluster::default();
        let record = DeploymentRecord {
            app_name: "guestbook".to_string(),
            prefix: "guestbook-ab12cd".to_string(),
            image: Some("docker.io/user/guestbook:t1".to_string()),
            ..DeploymentRecord::default()
        };

        let record = deploy(&cluster, "ns", WAIT, record).await.expect("deploy service");

        assert_eq!(record.service_url.as_deref(), Some("http://guestbook.ns.example.com"));
        assert_eq!(cluster.calls_matching("apply-runtime-service/ns/guestbook").len(), 1);
    }

    #[tokio::test]
    async fn test_requires_a_built_image() {
        let cluster = RecordingCluster::default();
        let record = DeploymentRecord {
            app_name: "guestbook".to_string(),
            prefix: "guestbook-ab12cd".to_string(),
            ..DeploymentRecord::default()
        };

        let result = deploy(&cluster, "ns", WAIT, record).await;
        assert!(matches!(result, Err(Error::MissingImage)));
    }
}
