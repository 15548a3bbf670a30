use std::{collections::BTreeMap, path::PathBuf};

use rand::Rng;
use serde::{Deserialize, Serialize};
use skiff_base::consts;

const ID_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Length of the random segment in a generated prefix.
const PREFIX_ID_LEN: usize = 6;

/// Length of a freshly minted build tag.
const BUILD_TAG_LEN: usize = 8;

/// The unit of recoverable deployment state.
///
/// Accumulates fields as provisioning steps complete and round-trips through
/// the state store between invocations. Once set, `namespace` and `prefix`
/// stay stable for the lifetime of a deployment; later steps never rename an
/// earlier resource.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeploymentRecord {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub app_name: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub prefix: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,

    /// Destination of the most recent image build.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Arbitrary caller-supplied fields, carried along untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl DeploymentRecord {
    #[must_use]
    pub fn staging_pod_name(&self) -> String {
        format!("{}{}", self.prefix, consts::STAGING_POD_SUFFIX)
    }

    #[must_use]
    pub fn staging_claim_name(&self) -> String {
        format!("{}{}", self.prefix, consts::STAGING_CLAIM_SUFFIX)
    }

    #[must_use]
    pub fn registry_auth_name(&self) -> String {
        format!("{}{}", self.prefix, consts::REGISTRY_AUTH_SUFFIX)
    }

    #[must_use]
    pub fn builder_pod_name(&self, tag: &str) -> String {
        format!("{}-builder-{tag}", self.prefix)
    }
}

/// Caller-supplied inputs to a deployment.
#[derive(Clone, Debug)]
pub struct DeployInputs {
    pub app_name: String,

    /// Source payload: a directory or a gzipped tarball.
    pub source: PathBuf,

    /// Deploy into this namespace instead of provisioning one.
    pub namespace: Option<String>,

    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Layers defaults, caller inputs and previously persisted state, in that
/// order of increasing priority, into one record.
///
/// Persisted state wins so that re-running a deployment reuses the resource
/// names it already established instead of minting new ones and orphaning the
/// old resources.
#[must_use]
pub fn resolve(inputs: &DeployInputs, prior: Option<DeploymentRecord>) -> DeploymentRecord {
    let mut record = DeploymentRecord {
        app_name: inputs.app_name.clone(),
        prefix: format!("{}-{}", inputs.app_name, generate_id(PREFIX_ID_LEN)),
        namespace: inputs.namespace.clone(),
        extra: inputs.extra.clone(),
        ..DeploymentRecord::default()
    };

    if let Some(prior) = prior {
        if !prior.app_name.is_empty() {
            record.app_name = prior.app_name;
        }
        if !prior.prefix.is_empty() {
            record.prefix = prior.prefix;
        }
        if prior.namespace.is_some() {
            record.namespace = prior.namespace;
        }
        if prior.service_url.is_some() {
            record.service_url = prior.service_url;
        }
        if prior.image.is_some() {
            record.image = prior.image;
        }
        record.extra.extend(prior.extra);
    }

    record
}

/// Mints the identifier naming the next image build.
///
/// A fresh tag on every deployment is what forces the runtime service to roll
/// out a new revision, since the service references the image by tag.
#[must_use]
pub fn generate_build_tag() -> String { generate_id(BUILD_TAG_LEN) }

pub(crate) fn generate_id(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| {
            let index = rng.gen_range(0..ID_CHARSET.len());
            char::from(ID_CHARSET[index])
        })
        .collect()
}
