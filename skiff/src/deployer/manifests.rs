//! Manifest builders for every resource the workflow provisions.
//!
//! Pure functions from names and configuration to API objects, so each shape
//! is testable without a cluster.

use std::collections::BTreeMap;

use k8s_openapi::{
    api::core::v1::{
        ConfigMapVolumeSource, Container, PersistentVolumeClaim, PersistentVolumeClaimSpec,
        PersistentVolumeClaimVolumeSource, Pod, PodSpec, Volume, VolumeMount,
        VolumeResourceRequirements,
    },
    apimachinery::pkg::api::resource::Quantity,
};
use kube::{
    api::{ApiResource, DynamicObject, ObjectMeta},
    core::GroupVersionKind,
};
use skiff_base::consts::{self, k8s::knative, k8s::labels};

/// Volume name sharing the staging claim between the staging and builder pods.
const DATA_VOLUME: &str = "staging-data";

/// Volume name projecting the registry credentials into the builder pod.
const DOCKER_CONFIG_VOLUME: &str = "docker-config";

/// Config map key holding the docker auth document.
const DOCKER_CONFIG_KEY: &str = "config.json";

#[must_use]
pub fn managed_by_labels() -> BTreeMap<String, String> {
    BTreeMap::from_iter([(
        labels::MANAGED_BY.to_string(),
        skiff_base::PROJECT_NAME.to_string(),
    )])
}

/// Renders the docker auth document stored in the registry config map.
///
/// The auth token is inserted verbatim; callers supply the already-encoded
/// auth string for the registry endpoint.
#[must_use]
pub fn registry_auth_document(auth_token: &str) -> String {
    serde_json::json!({
        "auths": {
            "https://index.docker.io/v1/": { "auth": auth_token }
        }
    })
    .to_string()
}

/// Data of the registry-auth config map mounted by the builder pod.
#[must_use]
pub fn registry_auth_data(auth_token: &str) -> BTreeMap<String, String> {
    BTreeMap::from_iter([(DOCKER_CONFIG_KEY.to_string(), registry_auth_document(auth_token))])
}

/// The staging volume claim backing the shared build context.
#[must_use]
pub fn staging_volume_claim(namespace: &str, name: &str) -> PersistentVolumeClaim {
    PersistentVolumeClaim {
        metadata: metadata(namespace, name),
        spec: Some(PersistentVolumeClaimSpec {
            access_modes: Some(vec!["ReadWriteOnce".to_string()]),
            resources: Some(VolumeResourceRequirements {
                requests: Some(BTreeMap::from_iter([(
                    "storage".to_string(),
                    Quantity(consts::STAGING_CLAIM_CAPACITY.to_string()),
                )])),
                ..VolumeResourceRequirements::default()
            }),
            ..PersistentVolumeClaimSpec::default()
        }),
        ..PersistentVolumeClaim::default()
    }
}

/// The long-running staging pod holding the staged source archive.
///
/// The container runs a keep-alive loop that never exits; the pod's only job
/// is to mount the staging volume and accept exec sessions.
#[must_use]
pub fn staging_pod(namespace: &str, name: &str, claim_name: &str) -> Pod {
    Pod {
        metadata: metadata(namespace, name),
        spec: Some(PodSpec {
            containers: vec![Container {
                name: "staging".to_string(),
                image: Some(consts::STAGING_IMAGE.to_string()),
                command: Some(vec![
                    "sh".to_string(),
                    "-c".to_string(),
                    "while true; do sleep 1; done".to_string(),
                ]),
                volume_mounts: Some(vec![VolumeMount {
                    name: DATA_VOLUME.to_string(),
                    mount_path: consts::STAGING_MOUNT_PATH.to_string(),
                    ..VolumeMount::default()
                }]),
                ..Container::default()
            }],
            volumes: Some(vec![claim_volume(claim_name)]),
            ..PodSpec::default()
        }),
        ..Pod::default()
    }
}

/// The transient builder pod pushing `destination` from the staged archive.
#[must_use]
pub fn builder_pod(
    namespace: &str,
    name: &str,
    claim_name: &str,
    auth_config_map: &str,
    destination: &str,
) -> Pod {
    Pod {
        metadata: metadata(namespace, name),
        spec: Some(PodSpec {
            restart_policy: Some("Never".to_string()),
            containers: vec![Container {
                name: "builder".to_string(),
                image: Some(consts::BUILDER_IMAGE.to_string()),
                args: Some(vec![
                    format!(
                        "--context=tar://{}/{}",
                        consts::STAGING_MOUNT_PATH,
                        consts::STAGED_ARCHIVE_NAME
                    ),
                    format!("--destination={destination}"),
                ]),
                volume_mounts: Some(vec![
                    VolumeMount {
                        name: DATA_VOLUME.to_string(),
                        mount_path: consts::STAGING_MOUNT_PATH.to_string(),
                        ..VolumeMount::default()
                    },
                    VolumeMount {
                        name: DOCKER_CONFIG_VOLUME.to_string(),
                        mount_path: consts::BUILDER_DOCKER_CONFIG_PATH.to_string(),
                        ..VolumeMount::default()
                    },
                ]),
                ..Container::default()
            }],
            volumes: Some(vec![
                claim_volume(claim_name),
                Volume {
                    name: DOCKER_CONFIG_VOLUME.to_string(),
                    config_map: Some(ConfigMapVolumeSource {
                        name: auth_config_map.to_string().into(),
                        ..ConfigMapVolumeSource::default()
                    }),
                    ..Volume::default()
                },
            ]),
            ..PodSpec::default()
        }),
        ..Pod::default()
    }
}

/// The managed runtime service fronting the built image.
#[must_use]
pub fn runtime_service(namespace: &str, name: &str, image: &str) -> DynamicObject {
    let resource = knative_service_resource();
    let mut service = DynamicObject::new(name, &resource).within(namespace);
    service.metadata.labels = Some(managed_by_labels());
    service.data = serde_json::json!({
        "spec": {
            "template": {
                "spec": {
                    "containers": [ { "image": image } ]
                }
            }
        }
    });
    service
}

/// Coordinates of the Knative Serving `Service` resource.
#[must_use]
pub fn knative_service_resource() -> ApiResource {
    ApiResource::from_gvk(&GroupVersionKind::gvk(
        knative::GROUP,
        knative::VERSION,
        knative::KIND,
    ))
}

fn metadata(namespace: &str, name: &str) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some(namespace.to_string()),
        labels: Some(managed_by_labels()),
        ..ObjectMeta::default()
    }
}

fn claim_volume(claim_name: &str) -> Volume {
    Volume {
        name: DATA_VOLUME.to_string(),
        persistent_volume_claim: Some(PersistentVolumeClaimVolumeSource {
            claim_name: claim_name.to_string(),
            ..PersistentVolumeClaimVolumeSource::default()
        }),
        ..Volume::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_auth_document_is_exact() {
        assert_eq!(
            registry_auth_document("dXNlcjpwYXNz"),
            r#"{"auths":{"https://index.docker.io/v1/":{"auth":"dXNlcjpwYXNz"}}}"#,
        );
    }

    #[test]
    fn test_registry_auth_data_keys_config_json() {
        let data = registry_auth_data("token");
        assert_eq!(data.len(), 1);
        assert!(
            data.get("config.json").expect("config.json key").contains(consts::DOCKER_REGISTRY_URL)
        );
    }

    #[test]
    fn test_staging_claim_requests_fixed_capacity() {
        let claim = staging_volume_claim("ns", "app-x-fs-pvc");
        let spec = claim.spec.expect("claim spec");
        assert_eq!(spec.access_modes, Some(vec!["ReadWriteOnce".to_string()]));
        let requests = spec.resources.expect("resources").requests.expect("requests");
        assert_eq!(requests.get("storage"), Some(&Quantity("10Gi".to_string())));
    }

    #[test]
    fn test_staging_pod_never_exits_and_mounts_claim() {
        let pod = staging_pod("ns", "app-x-fs", "app-x-fs-pvc");
        let spec = pod.spec.expect("pod spec");
        let container = &spec.containers[0];
        assert_eq!(
            container.command,
            Some(vec![
                "sh".to_string(),
                "-c".to_string(),
                "while true; do sleep 1; done".to_string()
            ])
        );
        let mounts = container.volume_mounts.as_ref().expect("mounts");
        assert_eq!(mounts[0].mount_path, "/data");

        let volumes = spec.volumes.expect("volumes");
        let claim = volumes[0].persistent_volume_claim.as_ref().expect("claim source");
        assert_eq!(claim.claim_name, "app-x-fs-pvc");
    }

    #[test]
    fn test_builder_pod_does_not_restart() {
        let pod = builder_pod("ns", "app-x-builder-t1", "app-x-fs-pvc", "app-x-registry-auth", "docker.io/user/app:t1");
        let spec = pod.spec.expect("pod spec");
        assert_eq!(spec.restart_policy.as_deref(), Some("Never"));

        let args = spec.containers[0].args.as_ref().expect("args");
        assert_eq!(args[0], "--context=tar:///data/source.tar.gz");
        assert_eq!(args[1], "--destination=docker.io/user/app:t1");
    }

    #[test]
    fn test_builder_pod_mounts_registry_credentials() {
        let pod = builder_pod("ns", "app-x-builder-t1", "app-x-fs-pvc", "app-x-registry-auth", "docker.io/user/app:t1");
        let spec = pod.spec.expect("pod spec");
        let mounts = spec.containers[0].volume_mounts.as_ref().expect("mounts");
        assert!(mounts.iter().any(|mount| mount.mount_path == "/kaniko/.docker"));
    }

    #[test]
    fn test_runtime_service_shape() {
        let service = runtime_service("ns", "guestbook", "docker.io/user/guestbook:t1");
        assert_eq!(service.metadata.name.as_deref(), Some("guestbook"));
        assert_eq!(service.metadata.namespace.as_deref(), Some("ns"));
        assert_eq!(
            service.types.as_ref().expect("type meta").api_version,
            "serving.knative.dev/v1"
        );
        assert_eq!(
            service.data.pointer("/spec/template/spec/containers/0/image"),
            Some(&serde_json::Value::String("docker.io/user/guestbook:t1".to_string()))
        );
    }
}
