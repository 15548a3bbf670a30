use std::path::{Path, PathBuf};

use skiff_base::consts;
use snafu::ResultExt;

use crate::{
    archive,
    cluster::ClusterOps,
    deployer::{DeploymentRecord, Error, context, error},
};

/// Packages the source tree and streams it onto the staging volume.
///
/// The gzipped source tarball is wrapped in a plain tar archive and streamed
/// through an exec session; un-tarring the wrapper inside the pod leaves the
/// inner tarball at the staged location for the builder to consume.
pub async fn upload<C: ClusterOps>(
    cluster: &C,
    namespace: &str,
    source: &Path,
    record: DeploymentRecord,
) -> Result<DeploymentRecord, Error> {
    let scratch = ScratchDir::create()?;
    let source_dir = archive::resolve_source(source, scratch.path()).await?;

    let staged = scratch.path().join(consts::STAGED_ARCHIVE_NAME);
    archive::pack_directory(&source_dir, &staged).await?;
    let wrapper = scratch.path().join("transfer.tar");
    archive::wrap_single_file(&staged, &wrapper).await?;

    let pod_name = record.staging_pod_name();
    let command = vec![
        "tar".to_string(),
        "-xf".to_string(),
        "-".to_string(),
        "-C".to_string(),
        consts::STAGING_MOUNT_PATH.to_string(),
    ];
    cluster.exec_with_stdin(namespace, &pod_name, &command, &wrapper).await?;
    tracing::info!(
        "source archive staged into {pod_name}:{}",
        consts::STAGING_MOUNT_PATH
    );
    Ok(record)
}

/// Working directory for packaging artifacts, removed best-effort on drop.
struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    fn create() -> Result<Self, Error> {
        let path = std::env::temp_dir()
            .join(format!("{}-{}", skiff_base::PROJECT_NAME, context::generate_id(8)));
        std::fs::create_dir_all(&path)
            .context(error::ScratchDirectorySnafu { path: path.clone() })?;
        Ok(Self { path })
    }

    fn path(&self) -> &Path { &self.path }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if let Err(err) = std::fs::remove_dir_all(&self.path) {
            tracing::debug!(
                path = %self.path.display(),
                error = %err,
                "failed to remove scratch directory"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::upload;
    use crate::{cluster::testing::RecordingCluster, deployer::DeploymentRecord};

    #[tokio::test]
    async fn test_streams_wrapper_through_untar_exec() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("app");
        std::fs::create_dir_all(&source).expect("create source");
        std::fs::write(source.join("Dockerfile"), "FROM scratch\n").expect("write Dockerfile");

        let cluster = RecordingCluster::default();
        let record = DeploymentRecord {
            prefix: "guestbook-ab12cd".to_string(),
            ..DeploymentRecord::default()
        };

        let _record = upload(&cluster, "ns", &source, record).await.expect("upload");

        let execs = cluster.calls_matching("exec/ns/guestbook-ab12cd-fs");
        assert_eq!(execs.len(), 1);
        assert!(execs[0].ends_with("tar -xf - -C /data"));
    }
}
