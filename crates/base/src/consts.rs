pub mod k8s {
    pub mod labels {
        pub const NAME: &str = "app.kubernetes.io/name";
        pub const VERSION: &str = "app.kubernetes.io/version";
        pub const MANAGED_BY: &str = "app.kubernetes.io/managed-by";
    }

    pub mod knative {
        //! Coordinates of the Knative Serving API consumed for the runtime
        //! service.

        pub const GROUP: &str = "serving.knative.dev";
        pub const VERSION: &str = "v1";
        pub const KIND: &str = "Service";
        pub const API_VERSION: &str = "serving.knative.dev/v1";
    }
}

/// Suffix appended to the deployment prefix to name the staging pod.
pub const STAGING_POD_SUFFIX: &str = "-fs";

/// Suffix appended to the deployment prefix to name the staging volume claim.
pub const STAGING_CLAIM_SUFFIX: &str = "-fs-pvc";

/// Suffix appended to the deployment prefix to name the registry-auth config
/// map.
pub const REGISTRY_AUTH_SUFFIX: &str = "-registry-auth";

/// Storage requested for the staging volume claim.
pub const STAGING_CLAIM_CAPACITY: &str = "10Gi";

/// Mount path of the staging volume inside the staging and builder pods.
pub const STAGING_MOUNT_PATH: &str = "/data";

/// File name of the staged application source archive on the shared volume.
pub const STAGED_ARCHIVE_NAME: &str = "source.tar.gz";

/// Image used for the long-running staging pod.
pub const STAGING_IMAGE: &str = "docker.io/alpine:3.23";

/// Unprivileged in-cluster image builder.
pub const BUILDER_IMAGE: &str = "gcr.io/kaniko-project/executor:v1.23.2";

/// Mount path where the builder expects its registry credentials.
pub const BUILDER_DOCKER_CONFIG_PATH: &str = "/kaniko/.docker";

/// Registry endpoint keyed in the generated docker auth document.
pub const DOCKER_REGISTRY_URL: &str = "https://index.docker.io/v1/";

/// Registry host prefixed to pushed image references.
pub const DOCKER_REGISTRY_HOST: &str = "docker.io";
