//! In-memory recording cluster used by workflow tests.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::Path,
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use k8s_openapi::api::core::v1::{PersistentVolumeClaim, Pod};
use kube::api::DynamicObject;
use snafu::ResultExt;

use super::{ClusterOps, Error, PodPresence, error};

fn injected_failure() -> kube::Error {
    kube::Error::Api(Box::new(kube::core::Status {
        status: Some(kube::core::response::StatusSummary::Failure),
        message: "injected failure".to_string(),
        reason: "InternalError".to_string(),
        code: 500,
        ..Default::default()
    }))
}

/// Records every control-plane call and keeps just enough state (created pods
/// and namespaces) to answer existence checks consistently across calls.
#[derive(Debug, Default)]
pub struct RecordingCluster {
    pub calls: Mutex<Vec<String>>,
    pub namespaces: Mutex<BTreeSet<String>>,
    pub pods: Mutex<BTreeSet<String>>,
    pub config_map_data: Mutex<Vec<BTreeMap<String, String>>>,
    pub transient_pod_check: AtomicBool,
    pub fail_namespace_delete: AtomicBool,
    pub fail_pod_delete: AtomicBool,
}

impl RecordingCluster {
    fn record(&self, entry: impl Into<String>) {
        self.calls.lock().expect("call log lock").push(entry.into());
    }

    pub fn calls_matching(&self, prefix: &str) -> Vec<String> {
        self.calls
            .lock()
            .expect("call log lock")
            .iter()
            .filter(|entry| entry.starts_with(prefix))
            .cloned()
            .collect()
    }
}

impl ClusterOps for RecordingCluster {
    async fn ensure_namespace(&self, namespace: &str) -> Result<(), Error> {
        self.record(format!("ensure-namespace/{namespace}"));
        let _inserted = self.namespaces.lock().expect("namespace lock").insert(namespace.to_string());
        Ok(())
    }

    async fn delete_namespace(&self, namespace: &str) -> Result<(), Error> {
        self.record(format!("delete-namespace/{namespace}"));
        if self.fail_namespace_delete.load(Ordering::SeqCst) {
            return Err(injected_failure())
                .context(error::DeleteNamespaceSnafu { namespace: namespace.to_string() });
        }
        let _removed = self.namespaces.lock().expect("namespace lock").remove(namespace);
        Ok(())
    }

    async fn apply_config_map(
        &self,
        namespace: &str,
        name: &str,
        data: BTreeMap<String, String>,
    ) -> Result<(), Error> {
        self.record(format!("apply-config-map/{namespace}/{name}"));
        self.config_map_data.lock().expect("config map lock").push(data);
        Ok(())
    }

    async fn apply_volume_claim(
        &self,
        namespace: &str,
        claim: &PersistentVolumeClaim,
    ) -> Result<(), Error> {
        let name = claim.metadata.name.clone().unwrap_or_default();
        self.record(format!("apply-volume-claim/{namespace}/{name}"));
        Ok(())
    }

    async fn find_pod(&self, namespace: &str, pod_name: &str) -> PodPresence {
        self.record(format!("find-pod/{namespace}/{pod_name}"));
        if self.transient_pod_check.load(Ordering::SeqCst) {
            return PodPresence::Transient { message: "etcdserver: leader changed".to_string() };
        }
        if self.pods.lock().expect("pod lock").contains(pod_name) {
            PodPresence::Found
        } else {
            PodPresence::NotFound
        }
    }

    async fn create_pod(&self, namespace: &str, pod: &Pod) -> Result<(), Error> {
        let pod_name = pod.metadata.name.clone().unwrap_or_default();
        self.record(format!("create-pod/{namespace}/{pod_name}"));
        let _inserted = self.pods.lock().expect("pod lock").insert(pod_name);
        Ok(())
    }

    async fn await_pod_running(
        &self,
        namespace: &str,
        pod_name: &str,
        _timeout: Duration,
    ) -> Result<(), Error> {
        self.record(format!("await-pod-running/{namespace}/{pod_name}"));
        Ok(())
    }

    async fn exec_with_stdin(
        &self,
        namespace: &str,
        pod_name: &str,
        command: &[String],
        payload: &Path,
    ) -> Result<(), Error> {
        assert!(payload.is_file(), "exec payload must exist on disk");
        self.record(format!("exec/{namespace}/{pod_name}: {}", command.join(" ")));
        Ok(())
    }

    async fn delete_pod(&self, namespace: &str, pod_name: &str) -> Result<(), Error> {
        self.record(format!("delete-pod/{namespace}/{pod_name}"));
        if self.fail_pod_delete.load(Ordering::SeqCst) {
            return Err(injected_failure()).context(error::DeletePodSnafu {
                namespace: namespace.to_string(),
                pod_name: pod_name.to_string(),
            });
        }
        let _removed = self.pods.lock().expect("pod lock").remove(pod_name);
        Ok(())
    }

    async fn apply_runtime_service(
        &self,
        namespace: &str,
        service: &DynamicObject,
        _timeout: Duration,
    ) -> Result<String, Error> {
        let name = service.metadata.name.clone().unwrap_or_default();
        self.record(format!("apply-runtime-service/{namespace}/{name}"));
        Ok(format!("http://{name}.{namespace}.example.com"))
    }
}
