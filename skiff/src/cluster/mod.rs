//! Facade over the cluster control plane.
//!
//! The provisioning workflow consumes cluster operations exclusively through
//! [`ClusterOps`], which keeps each step testable against an in-memory
//! implementation and confines kube plumbing to [`KubeCluster`].

mod api_pod;
mod client;
pub mod error;
#[cfg(test)]
pub mod testing;

use std::{collections::BTreeMap, path::Path, time::Duration};

use k8s_openapi::api::core::v1::{PersistentVolumeClaim, Pod};
use kube::api::DynamicObject;

pub use self::{client::KubeCluster, error::Error};

/// Outcome of a pod existence check.
///
/// Transient control-plane failures are kept apart from a definite absence so
/// that callers never mistake an unhealthy API server for an existing pod.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PodPresence {
    Found,
    NotFound,
    Transient { message: String },
}

/// Cluster control-plane operations consumed by the deployment workflow.
pub trait ClusterOps {
    /// Creates a namespace, succeeding when it already exists.
    async fn ensure_namespace(&self, namespace: &str) -> Result<(), Error>;

    /// Deletes a namespace; the cluster cascade-deletes its contents.
    async fn delete_namespace(&self, namespace: &str) -> Result<(), Error>;

    /// Creates or updates a config map's data.
    async fn apply_config_map(
        &self,
        namespace: &str,
        name: &str,
        data: BTreeMap<String, String>,
    ) -> Result<(), Error>;

    /// Creates a volume claim, succeeding when it already exists (the claim
    /// spec is immutable once bound).
    async fn apply_volume_claim(
        &self,
        namespace: &str,
        claim: &PersistentVolumeClaim,
    ) -> Result<(), Error>;

    /// Checks whether a pod exists, classifying the outcome.
    async fn find_pod(&self, namespace: &str, pod_name: &str) -> PodPresence;

    async fn create_pod(&self, namespace: &str, pod: &Pod) -> Result<(), Error>;

    /// Blocks until the pod reports a `Running` phase, bounded by `timeout`.
    async fn await_pod_running(
        &self,
        namespace: &str,
        pod_name: &str,
        timeout: Duration,
    ) -> Result<(), Error>;

    /// Executes `command` inside a running pod, streaming the file at
    /// `payload` through its standard input. No output is captured.
    async fn exec_with_stdin(
        &self,
        namespace: &str,
        pod_name: &str,
        command: &[String],
        payload: &Path,
    ) -> Result<(), Error>;

    async fn delete_pod(&self, namespace: &str, pod_name: &str) -> Result<(), Error>;

    /// Creates or updates the managed runtime service and waits until the
    /// cluster publishes its URL, bounded by `timeout`.
    async fn apply_runtime_service(
        &self,
        namespace: &str,
        service: &DynamicObject,
        timeout: Duration,
    ) -> Result<String, Error>;
}

impl<T> ClusterOps for &T
where
    T: ClusterOps + Sync,
{
    async fn ensure_namespace(&self, namespace: &str) -> Result<(), Error> {
        (**self).ensure_namespace(namespace).await
    }

    async fn delete_namespace(&self, namespace: &str) -> Result<(), Error> {
        (**self).delete_namespace(namespace).await
    }

    async fn apply_config_map(
        &self,
        namespace: &str,
        name: &str,
        data: BTreeMap<String, String>,
    ) -> Result<(), Error> {
        (**self).apply_config_map(namespace, name, data).await
    }

    async fn apply_volume_claim(
        &self,
        namespace: &str,
        claim: &PersistentVolumeClaim,
    ) -> Result<(), Error> {
        (**self).apply_volume_claim(namespace, claim).await
    }

    async fn find_pod(&self, namespace: &str, pod_name: &str) -> PodPresence {
        (**self).find_pod(namespace, pod_name).await
    }

    async fn create_pod(&self, namespace: &str, pod: &Pod) -> Result<(), Error> {
        (**self).create_pod(namespace, pod).await
    }

    async fn await_pod_running(
        &self,
        namespace: &str,
        pod_name: &str,
        timeout: Duration,
    ) -> Result<(), Error> {
        (**self).await_pod_running(namespace, pod_name, timeout).await
    }

    async fn exec_with_stdin(
        &self,
        namespace: &str,
        pod_name: &str,
        command: &[String],
        payload: &Path,
    ) -> Result<(), Error> {
        (**self).exec_with_stdin(namespace, pod_name, command, payload).await
    }

    async fn delete_pod(&self, namespace: &str, pod_name: &str) -> Result<(), Error> {
        (**self).delete_pod(namespace, pod_name).await
    }

    async fn apply_runtime_service(
        &self,
        namespace: &str,
        service: &DynamicObject,
        timeout: Duration,
    ) -> Result<String, Error> {
        (**self).apply_runtime_service(namespace, service, timeout).await
    }
}
