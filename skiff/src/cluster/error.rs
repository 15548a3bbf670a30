use std::path::PathBuf;

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Failed to create namespace {namespace}, error: {source}"))]
    CreateNamespace {
        namespace: String,
        #[snafu(source(from(kube::Error, Box::new)))]
        source: Box<kube::Error>,
    },

    #[snafu(display("Failed to delete namespace {namespace}, error: {source}"))]
    DeleteNamespace {
        namespace: String,
        #[snafu(source(from(kube::Error, Box::new)))]
        source: Box<kube::Error>,
    },

    #[snafu(display("Failed to apply config map {name} in namespace {namespace}, error: {source}"))]
    ApplyConfigMap {
        namespace: String,
        name: String,
        #[snafu(source(from(kube::Error, Box::new)))]
        source: Box<kube::Error>,
    },

    #[snafu(display(
        "Failed to apply volume claim {name} in namespace {namespace}, error: {source}"
    ))]
    ApplyVolumeClaim {
        namespace: String,
        name: String,
        #[snafu(source(from(kube::Error, Box::new)))]
        source: Box<kube::Error>,
    },

    #[snafu(display("Failed to create pod {pod_name} in namespace {namespace}, error: {source}"))]
    CreatePod {
        namespace: String,
        pod_name: String,
        #[snafu(source(from(kube::Error, Box::new)))]
        source: Box<kube::Error>,
    },

    #[snafu(display("Failed to delete pod {pod_name} in namespace {namespace}, error: {source}"))]
    DeletePod {
        namespace: String,
        pod_name: String,
        #[snafu(source(from(kube::Error, Box::new)))]
        source: Box<kube::Error>,
    },

    #[snafu(display(
        "Failed to get pod {pod_name} status in namespace {namespace}, error: {source}"
    ))]
    GetPod {
        namespace: String,
        pod_name: String,
        #[snafu(source(from(kube::Error, Box::new)))]
        source: Box<kube::Error>,
    },

    #[snafu(display(
        "Timed out waiting for pod {pod_name} to reach running status in namespace {namespace}"
    ))]
    WaitForPodStatus { namespace: String, pod_name: String },

    #[snafu(display(
        "Failed to wait for pod {pod_name} status in namespace {namespace}, error: {source}"
    ))]
    GetPodStatus {
        namespace: String,
        pod_name: String,
        #[snafu(source(from(kube::runtime::wait::Error, Box::new)))]
        source: Box<kube::runtime::wait::Error>,
    },

    #[snafu(display("Failed to attach to pod {pod_name} in namespace {namespace}, error: {source}"))]
    AttachPod {
        namespace: String,
        pod_name: String,
        #[snafu(source(from(kube::Error, Box::new)))]
        source: Box<kube::Error>,
    },

    #[snafu(display("{stream} requested but missing"))]
    GetPodStream { stream: &'static str },

    #[snafu(display("Failed to open transfer payload {}, error: {source}", path.display()))]
    OpenTransferPayload { path: PathBuf, source: std::io::Error },

    #[snafu(display(
        "Failed to stream payload into pod {pod_name} in namespace {namespace}, error: {source}"
    ))]
    StreamTransferPayload { namespace: String, pod_name: String, source: std::io::Error },

    #[snafu(display(
        "Exec session in pod {pod_name} in namespace {namespace} ended abnormally, error: {source}"
    ))]
    JoinExecSession {
        namespace: String,
        pod_name: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[snafu(display(
        "Failed to apply runtime service {name} in namespace {namespace}, error: {source}"
    ))]
    ApplyService {
        namespace: String,
        name: String,
        #[snafu(source(from(kube::Error, Box::new)))]
        source: Box<kube::Error>,
    },

    #[snafu(display("Failed to get runtime service {name} in namespace {namespace}, error: {source}"))]
    GetService {
        namespace: String,
        name: String,
        #[snafu(source(from(kube::Error, Box::new)))]
        source: Box<kube::Error>,
    },

    #[snafu(display(
        "Timed out waiting for runtime service {name} in namespace {namespace} to publish a URL"
    ))]
    AwaitServiceUrl { namespace: String, name: String },
}
