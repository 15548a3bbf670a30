use crate::{
    cluster::ClusterOps,
    deployer::{DeploymentRecord, Error, RegistrySettings, manifests},
};

/// (Re)applies the registry-auth config map.
///
/// Runs on every deployment so that rotated credentials propagate to the next
/// build.
pub async fn apply<C: ClusterOps>(
    cluster: &C,
    namespace: &str,
    registry: &RegistrySettings,
    record: DeploymentRecord,
) -> Result<DeploymentRecord, Error> {
    let name = record.registry_auth_name();
    let data = manifests::registry_auth_data(&registry.auth_token);
    cluster.apply_config_map(namespace, &name, data).await?;
    tracing::info!("configmap/{name} applied in namespace {namespace}");
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::apply;
    use crate::{
        cluster::testing::RecordingCluster,
        deployer::{DeploymentRecord, RegistrySettings},
    };

    #[tokio::test]
    async fn test_applies_credentials_on_every_run() {
        let cluster = RecordingCluster::default();
        let registry = RegistrySettings {
            username: "user".to_string(),
            auth_token: "dXNlcjpwYXNz".to_string(),
        };
        let record = DeploymentRecord {
            prefix: "guestbook-ab12cd".to_string(),
            ..DeploymentRecord::default()
        };

        let record = apply(&cluster, "ns", &registry, record).await.expect("apply");
        let _record = apply(&cluster, "ns", &registry, record).await.expect("apply again");

        assert_eq!(
            cluster.calls_matching("apply-config-map/ns/guestbook-ab12cd-registry-auth").len(),
            2
        );
        let payloads = cluster.config_map_data.lock().expect("config map lock");
        assert_eq!(
            payloads[0].get("config.json").map(String::as_str),
            Some(r#"{"auths":{"https://index.docker.io/v1/":{"auth":"dXNlcjpwYXNz"}}}"#),
        );
    }
}
