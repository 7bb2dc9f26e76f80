//! `ServiceBinding.servicebinding.io/v1alpha3` (Service Binding specification API)

use kube::CustomResource;
use serde::{Deserialize, Serialize};

use super::BindingCondition;

pub const GROUP: &str = "servicebinding.io";
pub const VERSION: &str = "v1alpha3";
pub const KIND: &str = "ServiceBinding";
pub const PLURAL: &str = "servicebindings";
pub const API_VERSION: &str = "servicebinding.io/v1alpha3";

#[derive(CustomResource, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[kube(
    group = "servicebinding.io",
    version = "v1alpha3",
    kind = "ServiceBinding",
    plural = "servicebindings",
    status = "ServiceBindingStatus",
    namespaced,
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct ServiceBindingSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    pub workload: WorkloadReference,
    pub service: ServiceReference,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvMapping>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadReference {
    pub api_version: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceReference {
    pub api_version: String,
    pub kind: String,
    pub name: String,
}

/// Projects a secret entry as an environment variable
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct EnvMapping {
    pub name: String,
    pub key: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ServiceBindingStatus {
    #[serde(default)]
    pub conditions: Vec<BindingCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<SecretReference>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SecretReference {
    pub name: String,
}
