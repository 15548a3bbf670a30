use std::{collections::BTreeMap, path::Path, time::Duration};

use k8s_openapi::api::core::v1::{ConfigMap, Namespace, PersistentVolumeClaim, Pod};
use kube::{
    Api,
    api::{AttachParams, DeleteParams, DynamicObject, ObjectMeta, Patch, PatchParams, PostParams},
};
use snafu::{OptionExt, ResultExt};
use tokio::io::AsyncWriteExt;

use crate::{
    cluster::{ClusterOps, Error, PodPresence, api_pod::ApiPodExt, error},
    deployer::manifests,
};

/// How often the runtime service is re-read while waiting for its URL.
const SERVICE_URL_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// [`ClusterOps`] implementation backed by a kube client.
#[derive(Clone)]
pub struct KubeCluster {
    client: kube::Client,
}

impl KubeCluster {
    #[must_use]
    pub const fn new(client: kube::Client) -> Self { Self { client } }
}

impl ClusterOps for KubeCluster {
    async fn ensure_namespace(&self, namespace: &str) -> Result<(), Error> {
        let api = Api::<Namespace>::all(self.client.clone());
        let manifest = Namespace {
            metadata: ObjectMeta {
                name: Some(namespace.to_string()),
                labels: Some(manifests::managed_by_labels()),
                ..ObjectMeta::default()
            },
            ..Namespace::default()
        };
        match api.create(&PostParams::default(), &manifest).await {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(response)) if response.code == 409 => {
                tracing::debug!("namespace/{namespace} already exists");
                Ok(())
            }
            Err(source) => Err(source)
                .context(error::CreateNamespaceSnafu { namespace: namespace.to_string() }),
        }
    }

    async fn delete_namespace(&self, namespace: &str) -> Result<(), Error> {
        let api = Api::<Namespace>::all(self.client.clone());
        let _status = api
            .delete(namespace, &DeleteParams::default())
            .await
            .context(error::DeleteNamespaceSnafu { namespace: namespace.to_string() })?;
        Ok(())
    }

    async fn apply_config_map(
        &self,
        namespace: &str,
        name: &str,
        data: BTreeMap<String, String>,
    ) -> Result<(), Error> {
        let api = Api::<ConfigMap>::namespaced(self.client.clone(), namespace);
        let patch = serde_json::json!({ "data": data });
        match api.patch(name, &PatchParams::default(), &Patch::Merge(&patch)).await {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(response)) if response.code == 404 => {
                let manifest = ConfigMap {
                    metadata: ObjectMeta {
                        name: Some(name.to_string()),
                        namespace: Some(namespace.to_string()),
                        labels: Some(manifests::managed_by_labels()),
                        ..ObjectMeta::default()
                    },
                    data: Some(data),
                    ..ConfigMap::default()
                };
                let _created = api.create(&PostParams::default(), &manifest).await.context(
                    error::ApplyConfigMapSnafu {
                        namespace: namespace.to_string(),
                        name: name.to_string(),
                    },
                )?;
                Ok(())
            }
            Err(source) => Err(source).context(error::ApplyConfigMapSnafu {
                namespace: namespace.to_string(),
                name: name.to_string(),
            }),
        }
    }

    async fn apply_volume_claim(
        &self,
        namespace: &str,
        claim: &PersistentVolumeClaim,
    ) -> Result<(), Error> {
        let name = claim.metadata.name.clone().unwrap_or_default();
        let api = Api::<PersistentVolumeClaim>::namespaced(self.client.clone(), namespace);
        match api.create(&PostParams::default(), claim).await {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(response)) if response.code == 409 => {
                tracing::debug!("persistentvolumeclaim/{name} already exists in {namespace}");
                Ok(())
            }
            Err(source) => Err(source)
                .context(error::ApplyVolumeClaimSnafu { namespace: namespace.to_string(), name }),
        }
    }

    async fn find_pod(&self, namespace: &str, pod_name: &str) -> PodPresence {
        let api = Api::<Pod>::namespaced(self.client.clone(), namespace);
        match api.get(pod_name).await {
            Ok(_) => PodPresence::Found,
            Err(kube::Error::Api(response)) if response.code == 404 => PodPresence::NotFound,
            Err(err) => PodPresence::Transient { message: err.to_string() },
        }
    }

    async fn create_pod(&self, namespace: &str, pod: &Pod) -> Result<(), Error> {
        let pod_name = pod.metadata.name.clone().unwrap_or_default();
        let api = Api::<Pod>::namespaced(self.client.clone(), namespace);
        let _created =
            api.create(&PostParams::default(), pod).await.context(error::CreatePodSnafu {
                namespace: namespace.to_string(),
                pod_name,
            })?;
        Ok(())
    }

    async fn await_pod_running(
        &self,
        namespace: &str,
        pod_name: &str,
        timeout: Duration,
    ) -> Result<(), Error> {
        let api = Api::<Pod>::namespaced(self.client.clone(), namespace);
        let _pod = api.await_running_status(pod_name, namespace, timeout).await?;
        Ok(())
    }

    async fn exec_with_stdin(
        &self,
        namespace: &str,
        pod_name: &str,
        command: &[String],
        payload: &Path,
    ) -> Result<(), Error> {
        let api = Api::<Pod>::namespaced(self.client.clone(), namespace);
        let params = AttachParams {
            stdin: true,
            stdout: false,
            stderr: false,
            tty: false,
            ..AttachParams::default()
        };
        let mut attached =
            api.exec(pod_name, command.to_vec(), &params).await.context(error::AttachPodSnafu {
                namespace: namespace.to_string(),
                pod_name: pod_name.to_string(),
            })?;

        let mut stdin = attached.stdin().context(error::GetPodStreamSnafu { stream: "stdin" })?;
        let mut payload_file = tokio::fs::File::open(payload)
            .await
            .context(error::OpenTransferPayloadSnafu { path: payload.to_path_buf() })?;
        let _bytes = tokio::io::copy(&mut payload_file, &mut stdin).await.context(
            error::StreamTransferPayloadSnafu {
                namespace: namespace.to_string(),
                pod_name: pod_name.to_string(),
            },
        )?;
        stdin.shutdown().await.context(error::StreamTransferPayloadSnafu {
            namespace: namespace.to_string(),
            pod_name: pod_name.to_string(),
        })?;
        drop(stdin);

        attached
            .join()
            .await
            .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> { Box::new(e) })
            .context(error::JoinExecSessionSnafu {
                namespace: namespace.to_string(),
                pod_name: pod_name.to_string(),
            })
    }

    async fn delete_pod(&self, namespace: &str, pod_name: &str) -> Result<(), Error> {
        let api = Api::<Pod>::namespaced(self.client.clone(), namespace);
        let _status =
            api.delete(pod_name, &DeleteParams::default()).await.context(error::DeletePodSnafu {
                namespace: namespace.to_string(),
                pod_name: pod_name.to_string(),
            })?;
        Ok(())
    }

    async fn apply_runtime_service(
        &self,
        namespace: &str,
        service: &DynamicObject,
        timeout: Duration,
    ) -> Result<String, Error> {
        let name = service.metadata.name.clone().unwrap_or_default();
        let resource = manifests::knative_service_resource();
        let api =
            Api::<DynamicObject>::namespaced_with(self.client.clone(), namespace, &resource);

        let patch = serde_json::json!({ "spec": service.data.get("spec") });
        match api.patch(&name, &PatchParams::default(), &Patch::Merge(&patch)).await {
            Ok(_) => {}
            Err(kube::Error::Api(response)) if response.code == 404 => {
                let _created = api.create(&PostParams::default(), service).await.context(
                    error::ApplyServiceSnafu {
                        namespace: namespace.to_string(),
                        name: name.clone(),
                    },
                )?;
            }
            Err(source) => {
                return Err(source).context(error::ApplyServiceSnafu {
                    namespace: namespace.to_string(),
                    name,
                });
            }
        }

        // The serving controller fills in status.url once the revision is
        // ready; poll until it shows up.
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let fetched = api.get(&name).await.context(error::GetServiceSnafu {
                namespace: namespace.to_string(),
                name: name.clone(),
            })?;
            if let Some(url) =
                fetched.data.pointer("/status/url").and_then(serde_json::Value::as_str)
            {
                return Ok(url.to_string());
            }
            if tokio::time::Instant::now() >= deadline {
                return error::AwaitServiceUrlSnafu {
                    namespace: namespace.to_string(),
                    name,
                }
                .fail();
            }
            tokio::time::sleep(SERVICE_URL_POLL_INTERVAL).await;
        }
    }
}
