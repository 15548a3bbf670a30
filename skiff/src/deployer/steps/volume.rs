use crate::{
    cluster::ClusterOps,
    deployer::{DeploymentRecord, Error, manifests},
};

/// (Re)applies the staging volume claim.
pub async fn apply<C: ClusterOps>(
    cluster: &C,
    namespace: &str,
    record: DeploymentRecord,
) -> Result<DeploymentRecord, Error> {
    let name = record.staging_claim_name();
    let claim = manifests::staging_volume_claim(namespace, &name);
    cluster.apply_volume_claim(namespace, &claim).await?;
    tracing::info!("persistentvolumeclaim/{name} applied in namespace {namespace}");
    Ok(record)
}
